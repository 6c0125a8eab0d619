//! Metrics counters for scan activity and delivery health.

use metrics::{counter, describe_counter};
use tracing::debug;

/// Scan cycles completed counter metric name.
pub const METRIC_SCAN_CYCLES: &str = "scan_cycles_total";
/// Opportunities detected counter metric name.
pub const METRIC_OPPORTUNITIES_DETECTED: &str = "opportunities_detected_total";
/// Per-market extraction failures counter metric name.
pub const METRIC_EXTRACTION_FAILURES: &str = "extraction_failures_total";
/// Webhook delivery failures counter metric name.
pub const METRIC_WEBHOOK_FAILURES: &str = "webhook_failures_total";
/// Stake plans built counter metric name.
pub const METRIC_STAKE_PLANS: &str = "stake_plans_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_SCAN_CYCLES, "Total number of scan cycles completed");
    describe_counter!(
        METRIC_OPPORTUNITIES_DETECTED,
        "Total number of arbitrage opportunities detected"
    );
    describe_counter!(
        METRIC_EXTRACTION_FAILURES,
        "Total number of per-market extraction failures"
    );
    describe_counter!(
        METRIC_WEBHOOK_FAILURES,
        "Total number of failed webhook deliveries"
    );
    describe_counter!(METRIC_STAKE_PLANS, "Total number of stake plans built");

    debug!("Metrics initialized");
}

/// Increment scan cycles counter.
pub fn inc_scan_cycles() {
    counter!(METRIC_SCAN_CYCLES).increment(1);
}

/// Increment opportunities detected counter.
pub fn inc_opportunities_detected() {
    counter!(METRIC_OPPORTUNITIES_DETECTED).increment(1);
}

/// Increment extraction failures counter.
pub fn inc_extraction_failures() {
    counter!(METRIC_EXTRACTION_FAILURES).increment(1);
}

/// Increment webhook failures counter.
pub fn inc_webhook_failures() {
    counter!(METRIC_WEBHOOK_FAILURES).increment(1);
}

/// Increment stake plans counter.
pub fn inc_stake_plans() {
    counter!(METRIC_STAKE_PLANS).increment(1);
}
