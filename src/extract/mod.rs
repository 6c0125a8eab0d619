//! Price and outcome-label extraction from market pages.
//!
//! This module handles:
//! - The [`PriceSource`] seam the scanner talks to
//! - A static-HTML HTTP implementation
//! - The fallback policy chaining interchangeable sources
//! - A mock source for testing
//!
//! The extractor boundary never raises into the scan loop: total failure
//! across every source degrades to an empty sequence and a logged warning.

pub mod http;
pub mod mock;
pub mod parse;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::ExtractionError;

pub use http::HttpSource;
pub use mock::MockSource;

/// One way of turning a market page into prices and labels.
///
/// Implementations are interchangeable: a rendered-page driver and the
/// static-HTML fetcher can sit behind the same fallback policy.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short name used in warnings.
    fn name(&self) -> &'static str;

    /// Per-outcome "yes" prices in cents.
    async fn prices(&self, url: &str, selector: &str) -> Result<Vec<Decimal>, ExtractionError>;

    /// Outcome labels parallel to the prices (best effort, may be empty).
    async fn outcome_labels(
        &self,
        url: &str,
        selector: &str,
    ) -> Result<Vec<String>, ExtractionError>;
}

/// Ordered chain of price sources with first-success semantics.
pub struct FallbackExtractor {
    sources: Vec<Box<dyn PriceSource>>,
    price_selector: String,
    outcome_selector: String,
}

impl FallbackExtractor {
    /// Create an extractor with no sources; add them with [`Self::with_source`].
    pub fn new(price_selector: impl Into<String>, outcome_selector: impl Into<String>) -> Self {
        Self {
            sources: Vec::new(),
            price_selector: price_selector.into(),
            outcome_selector: outcome_selector.into(),
        }
    }

    /// Append a source to the fallback chain.
    pub fn with_source(mut self, source: Box<dyn PriceSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Extract "yes" prices for a market, trying each source in order.
    ///
    /// Never errors: when every source fails or comes back empty, the
    /// result is an empty sequence and the failures are logged.
    pub async fn extract_prices(&self, url: &str) -> Vec<Decimal> {
        for source in &self.sources {
            match source.prices(url, &self.price_selector).await {
                Ok(prices) if !prices.is_empty() => return prices,
                Ok(_) => {
                    warn!(source = source.name(), url, "Source found no prices");
                }
                Err(e) => {
                    warn!(source = source.name(), url, error = %e, "Price extraction failed");
                }
            }
        }
        Vec::new()
    }

    /// Extract outcome labels for a market, trying each source in order.
    pub async fn extract_labels(&self, url: &str) -> Vec<String> {
        for source in &self.sources {
            match source.outcome_labels(url, &self.outcome_selector).await {
                Ok(labels) if !labels.is_empty() => return labels,
                Ok(_) => {}
                Err(e) => {
                    warn!(source = source.name(), url, error = %e, "Label extraction failed");
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn fallback_chain_tries_next_source_on_failure() {
        let failing = MockSource::new();
        failing.set_market("https://m/a", vec![dec!(40)], vec![]);
        failing.fail_market("https://m/a");

        let working = MockSource::new();
        working.set_market("https://m/a", vec![dec!(40), dec!(40)], vec!["Up"]);

        let extractor = FallbackExtractor::new("p", "o")
            .with_source(Box::new(failing))
            .with_source(Box::new(working));

        let prices = extractor.extract_prices("https://m/a").await;
        assert_eq!(prices, vec![dec!(40), dec!(40)]);
        assert_eq!(extractor.extract_labels("https://m/a").await, vec!["Up"]);
    }

    #[tokio::test]
    async fn total_failure_degrades_to_empty_sequence() {
        let failing = MockSource::new();
        failing.fail_market("https://m/a");

        let extractor = FallbackExtractor::new("p", "o").with_source(Box::new(failing));

        assert!(extractor.extract_prices("https://m/a").await.is_empty());
        assert!(extractor.extract_labels("https://m/a").await.is_empty());
    }

    #[tokio::test]
    async fn empty_result_falls_through_to_next_source() {
        let empty = MockSource::new(); // no data configured -> empty vecs
        let working = MockSource::new();
        working.set_market("https://m/a", vec![dec!(25)], vec![]);

        let extractor = FallbackExtractor::new("p", "o")
            .with_source(Box::new(empty))
            .with_source(Box::new(working));

        assert_eq!(extractor.extract_prices("https://m/a").await, vec![dec!(25)]);
    }
}
