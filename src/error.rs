//! Unified error types for the arbitrage monitor.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the arbitrage monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Price/label extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Arbitrage calculation error.
    #[error("calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Stake planning error.
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    /// Notification delivery error.
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Price and outcome-label extraction errors.
///
/// All of these are per-market, non-fatal conditions: the scanner logs
/// them and moves on to the next market in the cycle.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No prices could be extracted from the page.
    #[error("no prices found for {market}")]
    NoPrices {
        /// Market label or URL.
        market: String,
    },

    /// A scraped price was non-numeric or outside (0, 100].
    #[error("invalid price data for {market}: {value}")]
    InvalidPrice {
        /// Market label or URL.
        market: String,
        /// The offending text.
        value: String,
    },

    /// Page fetch failed.
    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Arbitrage calculation errors.
#[derive(Error, Debug, PartialEq)]
pub enum CalculationError {
    /// An empty price set reached the calculator.
    #[error("cannot compute arbitrage margin from an empty price set")]
    EmptyInput,

    /// A price outside (0, 100] reached the calculator.
    #[error("price {0} is outside (0, 100]")]
    InvalidPrice(Decimal),
}

/// Stake planning errors.
#[derive(Error, Debug, PartialEq)]
pub enum PlanError {
    /// Stake must be strictly positive.
    #[error("invalid stake: {0}")]
    InvalidStake(Decimal),

    /// The market has no stored prices/odds yet.
    #[error("no scan data stored for {market}")]
    NoData {
        /// Market label or URL.
        market: String,
    },
}

/// Webhook delivery errors.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Webhook endpoint returned a non-success status.
    #[error("webhook returned status {0}")]
    Status(u16),

    /// Transport-level failure (timeout, DNS, TLS).
    #[error("webhook transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, MonitorError>;
