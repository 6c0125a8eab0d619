//! Mock price source for unit and integration testing.
//!
//! This module provides a configurable source that can be used in tests
//! without making real network requests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::ExtractionError;

use super::PriceSource;

/// Mock per-market page data.
#[derive(Debug, Clone, Default)]
struct MockMarket {
    prices: Vec<Decimal>,
    outcomes: Vec<String>,
    fail: bool,
}

/// Mock price source with per-URL configured data and failure modes.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    markets: Arc<Mutex<HashMap<String, MockMarket>>>,
    price_calls: Arc<AtomicUsize>,
}

impl MockSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure prices and outcome labels for a URL.
    pub fn set_market(&self, url: &str, prices: Vec<Decimal>, outcomes: Vec<&str>) {
        let mut markets = self.markets.lock().unwrap();
        markets.insert(
            url.to_string(),
            MockMarket {
                prices,
                outcomes: outcomes.into_iter().map(str::to_string).collect(),
                fail: false,
            },
        );
    }

    /// Make extraction fail for a URL.
    pub fn fail_market(&self, url: &str) {
        let mut markets = self.markets.lock().unwrap();
        markets.entry(url.to_string()).or_default().fail = true;
    }

    /// Clear all configured data.
    pub fn clear(&self) {
        self.markets.lock().unwrap().clear();
    }

    /// Number of price-extraction calls served so far.
    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn prices(&self, url: &str, _selector: &str) -> Result<Vec<Decimal>, ExtractionError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);

        let markets = self.markets.lock().unwrap();
        match markets.get(url) {
            Some(market) if market.fail => Err(ExtractionError::NoPrices {
                market: url.to_string(),
            }),
            Some(market) => Ok(market.prices.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn outcome_labels(
        &self,
        url: &str,
        _selector: &str,
    ) -> Result<Vec<String>, ExtractionError> {
        let markets = self.markets.lock().unwrap();
        match markets.get(url) {
            Some(market) if market.fail => Err(ExtractionError::NoPrices {
                market: url.to_string(),
            }),
            Some(market) => Ok(market.outcomes.clone()),
            None => Ok(Vec::new()),
        }
    }
}
