//! Static-HTML price source backed by a plain HTTP fetch.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

use crate::error::ExtractionError;

use super::{parse, PriceSource};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Price source that fetches the raw page over HTTP and runs the static
/// parsing heuristics. Pages that only render prices client-side need a
/// different [`PriceSource`] in front of this one.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source with a browser-masquerading user agent.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<String, ExtractionError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(url, bytes = body.len(), "Fetched market page");
        Ok(body)
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn prices(&self, url: &str, selector: &str) -> Result<Vec<Decimal>, ExtractionError> {
        let body = self.fetch(url).await?;
        Ok(parse::extract_yes_prices(&body, selector))
    }

    async fn outcome_labels(
        &self,
        url: &str,
        selector: &str,
    ) -> Result<Vec<String>, ExtractionError> {
        let body = self.fetch(url).await?;
        Ok(parse::extract_outcome_labels(&body, selector))
    }
}
