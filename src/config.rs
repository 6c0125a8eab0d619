//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Markets ===
    /// Comma-separated list of market page URLs to monitor.
    pub market_urls: String,

    /// CSS class spec of the elements holding per-outcome prices.
    #[serde(default = "default_price_selector")]
    pub price_selector: String,

    /// CSS class spec of the elements holding outcome labels.
    #[serde(default = "default_outcome_selector")]
    pub outcome_selector: String,

    // === Notifications ===
    /// Primary Discord webhook URL for alerts and summaries.
    #[serde(default)]
    pub discord_webhook_url: Option<String>,

    /// Optional separate webhook channel mirroring every log line.
    #[serde(default)]
    pub discord_log_webhook_url: Option<String>,

    /// Username the webhook posts under.
    #[serde(default = "default_webhook_username")]
    pub webhook_username: String,

    // === Scan parameters ===
    /// Minutes between scan cycles (fractional allowed).
    #[serde(default = "default_scan_interval")]
    pub scan_interval_minutes: f64,

    /// Margin percentage above which alerts carry elevated urgency.
    #[serde(default = "default_high_margin_threshold")]
    pub high_margin_threshold: Decimal,

    // === Logging ===
    /// Path of the append-only plaintext log mirror.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_price_selector() -> String {
    String::new()
}

fn default_outcome_selector() -> String {
    String::new()
}

fn default_webhook_username() -> String {
    "Arbitrage Monitor".to_string()
}

fn default_scan_interval() -> f64 {
    5.0
}

fn default_high_margin_threshold() -> Decimal {
    Decimal::new(5, 0) // 5%
}

fn default_log_file() -> String {
    "log.txt".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Split the configured URL list into individual market URLs.
    pub fn urls(&self) -> Vec<String> {
        self.market_urls
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Scan interval as a duration.
    pub fn scan_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.scan_interval_minutes * 60.0)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.urls().is_empty() {
            return Err("MARKET_URLS must list at least one URL".to_string());
        }

        if !(self.scan_interval_minutes > 0.0) {
            return Err("SCAN_INTERVAL_MINUTES must be positive".to_string());
        }

        if self.high_margin_threshold < Decimal::ZERO {
            return Err("HIGH_MARGIN_THRESHOLD must not be negative".to_string());
        }

        if self.discord_log_webhook_url.is_some() && self.discord_webhook_url.is_none() {
            return Err(
                "DISCORD_LOG_WEBHOOK_URL requires DISCORD_WEBHOOK_URL to be set".to_string(),
            );
        }

        Ok(())
    }

    /// Check if any webhook channel is configured.
    pub fn webhooks_enabled(&self) -> bool {
        self.discord_webhook_url.is_some()
    }
}
