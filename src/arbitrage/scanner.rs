//! One scan cycle over the watchlist.

use chrono::Local;
use rust_decimal::Decimal;

use crate::arbitrage::compute_margin;
use crate::extract::FallbackExtractor;
use crate::market::{Market, Watchlist};
use crate::metrics;
use crate::notify::Notifier;
use crate::report::Reporter;
use crate::utils::{join_decimals, join_rounded};

/// Outcome of checking one market within a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketCheck {
    /// Extraction and calculation succeeded; the snapshot was replaced.
    Updated {
        /// Market label.
        label: String,
        /// Freshly computed margin.
        margin: Decimal,
    },
    /// The market failed this cycle; its previous snapshot is untouched.
    Failed {
        /// Market label.
        label: String,
        /// Human-readable failure reason.
        reason: String,
    },
}

/// Ephemeral result of one scan cycle.
#[derive(Debug, Clone)]
pub struct ScanCycle {
    /// Number of markets checked.
    pub scanned: usize,
    /// Per-market outcomes in scan order.
    pub checks: Vec<MarketCheck>,
    /// Last-known opportunities `(label, margin)` in scan order.
    pub opportunities: Vec<(String, Decimal)>,
}

/// Scans every watched market once per cycle, tolerating per-market
/// failures, and raises opportunity alerts.
pub struct MarketScanner {
    extractor: FallbackExtractor,
    high_margin_threshold: Decimal,
}

impl MarketScanner {
    /// Create a scanner over the given extractor.
    pub fn new(extractor: FallbackExtractor, high_margin_threshold: Decimal) -> Self {
        Self {
            extractor,
            high_margin_threshold,
        }
    }

    /// Run one cycle over all markets.
    ///
    /// One market's failure never aborts the cycle, and a failed market
    /// keeps whatever snapshot it had before this attempt.
    pub async fn scan(
        &self,
        watchlist: &mut Watchlist,
        reporter: &Reporter,
        notifier: &Notifier,
    ) -> ScanCycle {
        let total = watchlist.len();
        reporter
            .line(&format!(
                "\n[{}] Checking {} markets for arbitrage opportunities...",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                total,
            ))
            .await;

        let mut checks = Vec::with_capacity(total);
        for (i, market) in watchlist.iter_mut().enumerate() {
            reporter
                .line(&format!("\n--- Market {}/{} ---", i + 1, total))
                .await;
            checks.push(
                check_market(
                    &self.extractor,
                    self.high_margin_threshold,
                    market,
                    reporter,
                    notifier,
                )
                .await,
            );
        }

        let opportunities = watchlist.opportunities();
        if opportunities.is_empty() {
            reporter
                .line(&format!(
                    "\n❌ SUMMARY: No arbitrage opportunities found across {} markets.",
                    total,
                ))
                .await;
        } else {
            reporter
                .line(&format!(
                    "\n🎯 SUMMARY: Found {} arbitrage opportunities!",
                    opportunities.len(),
                ))
                .await;
            for (label, margin) in &opportunities {
                reporter
                    .line(&format!("   • {}: {}%", label, margin.round_dp(2)))
                    .await;
            }
        }

        notifier.notify_cycle_summary(total, &opportunities).await;
        metrics::inc_scan_cycles();

        ScanCycle {
            scanned: total,
            checks,
            opportunities,
        }
    }
}

async fn check_market(
    extractor: &FallbackExtractor,
    high_margin_threshold: Decimal,
    market: &mut Market,
    reporter: &Reporter,
    notifier: &Notifier,
) -> MarketCheck {
    let labels = extractor.extract_labels(&market.url).await;
    let prices = extractor.extract_prices(&market.url).await;

    if prices.is_empty() {
        reporter
            .line(&format!("❌ [{}] No prices found.", market.label))
            .await;
        metrics::inc_extraction_failures();
        return MarketCheck::Failed {
            label: market.label.clone(),
            reason: "no prices found".to_string(),
        };
    }

    let arb = match compute_margin(&prices) {
        Ok(arb) => arb,
        Err(e) => {
            // Invalid price data counts as an extraction failure for this
            // market; the stored snapshot stays as-is.
            reporter
                .line(&format!("❌ [{}] {}", market.label, e))
                .await;
            metrics::inc_extraction_failures();
            return MarketCheck::Failed {
                label: market.label.clone(),
                reason: e.to_string(),
            };
        }
    };

    reporter
        .line(&format!("🌐 Checked for: [{}]", market.label))
        .await;
    reporter
        .line(&format!("📊 Found {} outcomes", prices.len()))
        .await;
    reporter
        .line(&format!("🏷️  Prices: {}", join_decimals(&prices)))
        .await;
    reporter
        .line(&format!("📈 Odds: {}", join_rounded(&arb.odds)))
        .await;
    reporter
        .line(&format!(
            "💰 Arbitrage margin: {}%",
            arb.margin.round_dp(2)
        ))
        .await;

    if arb.is_opportunity() {
        reporter.line("🎯 Arbitrage opportunity exists!").await;
        metrics::inc_opportunities_detected();
        let urgent = arb.margin > high_margin_threshold;
        notifier
            .notify_alert(&market.label, arb.margin, &prices, &arb.odds, urgent)
            .await;
    } else {
        reporter
            .line("❌ No arbitrage opportunity (negative margin).")
            .await;
    }

    let margin = arb.margin;
    market.apply(labels, prices, &arb);

    MarketCheck::Updated {
        label: market.label.clone(),
        margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::extract::{FallbackExtractor, MockSource};

    fn scanner_with(source: MockSource) -> MarketScanner {
        let extractor = FallbackExtractor::new("p", "o").with_source(Box::new(source));
        MarketScanner::new(extractor, dec!(5))
    }

    #[tokio::test]
    async fn failed_market_keeps_previous_snapshot() {
        let urls = ["https://m/a", "https://m/b", "https://m/c"];
        let source = MockSource::new();
        source.set_market(urls[0], vec![dec!(40), dec!(40)], vec![]);
        source.set_market(urls[1], vec![dec!(30), dec!(30)], vec!["X", "Y"]);
        source.set_market(urls[2], vec![dec!(60), dec!(55)], vec![]);

        let scanner = scanner_with(source.clone());
        let mut watchlist = Watchlist::from_urls(urls);
        let reporter = Reporter::console_only();
        let notifier = Notifier::disabled();

        // First cycle populates all three snapshots.
        scanner.scan(&mut watchlist, &reporter, &notifier).await;
        assert!(watchlist.markets().iter().all(Market::has_data));
        let stored_b = watchlist.get(urls[1]).unwrap().clone();

        // Second cycle: market B fails, A and C move.
        source.fail_market(urls[1]);
        source.set_market(urls[0], vec![dec!(45), dec!(45)], vec![]);
        source.set_market(urls[2], vec![dec!(20), dec!(20)], vec![]);

        let cycle = scanner.scan(&mut watchlist, &reporter, &notifier).await;

        assert_eq!(cycle.scanned, 3);
        assert!(matches!(cycle.checks[0], MarketCheck::Updated { .. }));
        assert!(matches!(cycle.checks[1], MarketCheck::Failed { .. }));
        assert!(matches!(cycle.checks[2], MarketCheck::Updated { .. }));

        // B is exactly as the first cycle left it.
        let after_b = watchlist.get(urls[1]).unwrap();
        assert_eq!(after_b.prices, stored_b.prices);
        assert_eq!(after_b.margin, stored_b.margin);

        // A and C carry the second cycle's data.
        assert_eq!(watchlist.get(urls[0]).unwrap().prices, vec![dec!(45), dec!(45)]);
        assert_eq!(watchlist.get(urls[2]).unwrap().margin, dec!(150));
    }

    #[tokio::test]
    async fn negative_margin_still_overwrites_stored_state() {
        let url = "https://m/a";
        let source = MockSource::new();
        source.set_market(url, vec![dec!(40), dec!(40)], vec![]);

        let scanner = scanner_with(source.clone());
        let mut watchlist = Watchlist::from_urls([url]);
        let reporter = Reporter::console_only();
        let notifier = Notifier::disabled();

        scanner.scan(&mut watchlist, &reporter, &notifier).await;
        assert_eq!(watchlist.get(url).unwrap().margin, dec!(25));

        source.set_market(url, vec![dec!(60), dec!(55)], vec![]);
        scanner.scan(&mut watchlist, &reporter, &notifier).await;

        let market = watchlist.get(url).unwrap();
        assert!(market.margin < Decimal::ZERO);
        assert_eq!(market.prices, vec![dec!(60), dec!(55)]);
    }

    #[tokio::test]
    async fn invalid_price_data_is_treated_as_extraction_failure() {
        let url = "https://m/a";
        let source = MockSource::new();
        source.set_market(url, vec![dec!(40), dec!(40)], vec![]);

        let scanner = scanner_with(source.clone());
        let mut watchlist = Watchlist::from_urls([url]);
        let reporter = Reporter::console_only();
        let notifier = Notifier::disabled();

        scanner.scan(&mut watchlist, &reporter, &notifier).await;

        // A zero price aborts the whole market instead of skewing it.
        source.set_market(url, vec![dec!(40), dec!(0)], vec![]);
        let cycle = scanner.scan(&mut watchlist, &reporter, &notifier).await;

        assert!(matches!(cycle.checks[0], MarketCheck::Failed { .. }));
        assert_eq!(watchlist.get(url).unwrap().prices, vec![dec!(40), dec!(40)]);
    }

    #[tokio::test]
    async fn opportunities_follow_scan_order() {
        let urls = ["https://m/a", "https://m/b"];
        let source = MockSource::new();
        source.set_market(urls[0], vec![dec!(30), dec!(30)], vec![]);
        source.set_market(urls[1], vec![dec!(40), dec!(40)], vec![]);

        let scanner = scanner_with(source);
        let mut watchlist = Watchlist::from_urls(urls);
        let reporter = Reporter::console_only();
        let notifier = Notifier::disabled();

        let cycle = scanner.scan(&mut watchlist, &reporter, &notifier).await;

        let labels: Vec<&str> = cycle
            .opportunities
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, vec!["m/a", "m/b"]);
    }
}
