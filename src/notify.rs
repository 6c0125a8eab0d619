//! Discord webhook notifier for alerts, summaries and log mirroring.

use chrono::Local;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use crate::arbitrage::StakePlan;
use crate::config::Config;
use crate::error::DeliveryError;
use crate::metrics;
use crate::utils::{join_decimals, join_rounded};

/// Webhook messages above this length get truncated (Discord caps content
/// at 2000 characters; leave buffer for the marker).
const MESSAGE_LIMIT: usize = 1900;

/// Bounded timeout so a dead endpoint cannot stall a scan cycle.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Discord-style webhook notifier.
///
/// Every delivery method returns `bool` (delivered or not) and contains
/// failures at this boundary: a broken webhook degrades reporting, never
/// the scan loop.
pub struct Notifier {
    webhook_url: Option<String>,
    log_webhook_url: Option<String>,
    username: String,
    client: reqwest::Client,
}

impl Notifier {
    /// Build a notifier from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.discord_webhook_url.clone(),
            config.discord_log_webhook_url.clone(),
            config.webhook_username.clone(),
        )
    }

    /// Create a notifier with explicit webhook endpoints.
    pub fn new(
        webhook_url: Option<String>,
        log_webhook_url: Option<String>,
        username: String,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            webhook_url,
            log_webhook_url,
            username,
            client,
        }
    }

    /// A notifier with no endpoints, for tests and webhook-less runs.
    pub fn disabled() -> Self {
        Self::new(None, None, "Arbitrage Monitor".to_string())
    }

    /// Whether a primary webhook is configured.
    pub fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Whether the separate log channel is configured.
    pub fn log_channel_enabled(&self) -> bool {
        self.log_webhook_url.is_some()
    }

    async fn post(&self, webhook: &str, content: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(webhook)
            .json(&json!({
                "content": content,
                "username": self.username,
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status.as_u16()))
        }
    }

    /// Send free text to the primary channel.
    pub async fn notify(&self, text: &str) -> bool {
        let Some(webhook) = &self.webhook_url else {
            return false;
        };
        match self.post(webhook, &truncate_message(text)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Webhook delivery failed");
                metrics::inc_webhook_failures();
                false
            }
        }
    }

    /// Mirror a log line to the log channel, escaped for markdown.
    pub async fn notify_log(&self, line: &str) -> bool {
        let Some(webhook) = &self.log_webhook_url else {
            return false;
        };
        let message = truncate_message(&escape_markdown(line));
        match self.post(webhook, &message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Log-channel delivery failed");
                metrics::inc_webhook_failures();
                false
            }
        }
    }

    /// Send a formatted arbitrage opportunity alert.
    pub async fn notify_alert(
        &self,
        market_label: &str,
        margin: Decimal,
        prices: &[Decimal],
        odds: &[Decimal],
        urgent: bool,
    ) -> bool {
        let mut message = format!(
            "🎯 **ARBITRAGE OPPORTUNITY!**\n\
             📊 Market: {}\n\
             💰 Margin: {}%\n\
             🏷️ Prices: {}\n\
             📈 Odds: {}\n\
             ⏰ Time: {}",
            market_label,
            margin.round_dp(2),
            join_decimals(prices),
            join_rounded(odds),
            Local::now().format("%H:%M:%S"),
        );

        if urgent {
            message = format!("@everyone\n\n{}", message);
        }

        self.notify(&message).await
    }

    /// Send a per-cycle summary of all checked markets.
    pub async fn notify_cycle_summary(
        &self,
        market_count: usize,
        opportunities: &[(String, Decimal)],
    ) -> bool {
        let mut message = format!(
            "📋 **SCAN SUMMARY** - {}\n🔍 Checked {} markets\n",
            Local::now().format("%H:%M:%S"),
            market_count,
        );

        if opportunities.is_empty() {
            message.push_str("❌ No arbitrage opportunities found");
        } else {
            message.push_str(&format!(
                "🎯 Found {} opportunities:\n",
                opportunities.len()
            ));
            for (label, margin) in opportunities {
                message.push_str(&format!("  • {}: {}%\n", label, margin.round_dp(2)));
            }
        }

        self.notify(&message).await
    }

    /// Announce that the monitor started.
    pub async fn notify_started(&self, interval_minutes: f64, market_count: usize) -> bool {
        let message = format!(
            "🚀 **ARBITRAGE MONITOR STARTED**\n\
             ⏰ Check interval: {} minutes\n\
             🌐 Monitoring {} markets",
            interval_minutes, market_count,
        );
        self.notify(&message).await
    }

    /// Announce that the monitor stopped, with the stop reason.
    pub async fn notify_stopped(&self, reason: &str) -> bool {
        self.notify(&format!("🛑 **ARBITRAGE MONITOR STOPPED** ({})", reason))
            .await
    }

    /// Post a stake plan as a fenced table.
    pub async fn notify_stake_plan(&self, plan: &StakePlan) -> bool {
        let mut message = format!(
            "🎯 **TRADING TABLE**\n📊 Market: {}\n💰 Total Stake: {}\n\n```\n",
            plan.market_label, plan.total_stake,
        );
        message.push_str(&format!(
            "{:<12} | {:<8} | {:<8} | {:<8}\n",
            "Outcome", "Price", "Stake", "Payout"
        ));
        message.push_str(&"-".repeat(45));
        message.push('\n');

        for line in &plan.lines {
            message.push_str(&format!(
                "{:<12} | {:<8} | {:<8} | {:<8}\n",
                shorten(&line.outcome, 10),
                line.price.round_dp(2),
                line.stake.round_dp(2),
                line.payout.round_dp(2),
            ));
        }

        message.push_str(&format!(
            "```\n💵 **Total Profit: {}**",
            plan.profit.round_dp(2)
        ));
        self.notify(&message).await
    }
}

/// Escape markdown characters that would mangle mirrored log lines.
fn escape_markdown(text: &str) -> String {
    text.replace('`', "\\`")
        .replace('*', "\\*")
        .replace('_', "\\_")
}

/// Truncate near the webhook content limit.
fn truncate_message(text: &str) -> String {
    if text.chars().count() > MESSAGE_LIMIT {
        let cut: String = text.chars().take(MESSAGE_LIMIT).collect();
        format!("{}... (truncated)", cut)
    } else {
        text.to_string()
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn markdown_characters_are_escaped() {
        assert_eq!(
            escape_markdown("a `b` *c* _d_"),
            "a \\`b\\` \\*c\\* \\_d\\_"
        );
    }

    #[test]
    fn long_messages_are_truncated_with_marker() {
        let long = "x".repeat(2500);
        let out = truncate_message(&long);
        assert!(out.ends_with("... (truncated)"));
        assert!(out.chars().count() < 2000);
    }

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(truncate_message("hello"), "hello");
    }

    #[tokio::test]
    async fn disabled_notifier_reports_not_delivered() {
        let notifier = Notifier::disabled();
        assert!(!notifier.enabled());
        assert!(!notifier.notify("hello").await);
        assert!(!notifier.notify_log("hello").await);
        assert!(
            !notifier
                .notify_alert("m", dec!(5), &[dec!(40)], &[dec!(2.5)], false)
                .await
        );
        assert!(!notifier.notify_cycle_summary(3, &[]).await);
    }
}
