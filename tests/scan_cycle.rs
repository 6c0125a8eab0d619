//! End-to-end scheduler behavior over a mock price source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use arb_monitor::arbitrage::MarketScanner;
use arb_monitor::error::ExtractionError;
use arb_monitor::extract::{FallbackExtractor, MockSource, PriceSource};
use arb_monitor::market::Watchlist;
use arb_monitor::notify::Notifier;
use arb_monitor::report::Reporter;
use arb_monitor::scheduler::{ScanEvent, ScanScheduler, SchedulerState};

/// Source whose every price fetch takes a fixed amount of time.
struct SlowSource {
    delay: Duration,
}

#[async_trait]
impl PriceSource for SlowSource {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn prices(&self, _url: &str, _selector: &str) -> Result<Vec<Decimal>, ExtractionError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![dec!(40), dec!(40)])
    }

    async fn outcome_labels(
        &self,
        _url: &str,
        _selector: &str,
    ) -> Result<Vec<String>, ExtractionError> {
        Ok(Vec::new())
    }
}

fn build_with_extractor(
    extractor: FallbackExtractor,
    urls: &[&str],
    interval: Duration,
) -> (ScanScheduler, mpsc::Sender<ScanEvent>) {
    let scanner = MarketScanner::new(extractor, dec!(5));
    let (tx, rx) = mpsc::channel(32);
    let scheduler = ScanScheduler::new(
        scanner,
        Watchlist::from_urls(urls.iter().copied()),
        interval,
        rx,
        Arc::new(Reporter::console_only()),
        Arc::new(Notifier::disabled()),
    );
    (scheduler, tx)
}

fn build_scheduler(
    source: MockSource,
    urls: &[&str],
    interval: Duration,
) -> (ScanScheduler, mpsc::Sender<ScanEvent>) {
    let extractor = FallbackExtractor::new("p", "o").with_source(Box::new(source));
    build_with_extractor(extractor, urls, interval)
}

#[tokio::test(start_paused = true)]
async fn quit_command_stops_after_a_single_cycle() {
    let urls = ["https://m/a", "https://m/b"];
    let source = MockSource::new();
    source.set_market(urls[0], vec![dec!(40), dec!(40)], vec![]);
    source.set_market(urls[1], vec![dec!(60), dec!(55)], vec![]);

    let (mut scheduler, tx) = build_scheduler(source.clone(), &urls, Duration::from_secs(60));
    let handle = tokio::spawn(async move {
        scheduler.run().await.unwrap();
        scheduler.state()
    });

    // Let the first cycle finish and the wait begin.
    while source.price_calls() < 2 {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    tx.send(ScanEvent::Input("quit".to_string())).await.unwrap();

    assert_eq!(handle.await.unwrap(), SchedulerState::Stopped);
    // No second cycle ran.
    assert_eq!(source.price_calls(), 2);
}

#[tokio::test]
async fn shutdown_event_stops_the_scheduler() {
    let url = "https://m/a";
    let source = MockSource::new();
    source.set_market(url, vec![dec!(40), dec!(40)], vec![]);

    let (mut scheduler, tx) = build_scheduler(source, &[url], Duration::from_secs(60));
    tx.send(ScanEvent::Shutdown).await.unwrap();

    scheduler.run().await.unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_scan_is_honored_mid_cycle() {
    let urls = ["https://m/a", "https://m/b", "https://m/c"];
    let extractor = FallbackExtractor::new("p", "o").with_source(Box::new(SlowSource {
        delay: Duration::from_secs(30),
    }));
    let (mut scheduler, tx) = build_with_extractor(extractor, &urls, Duration::from_secs(60));
    tx.send(ScanEvent::Shutdown).await.unwrap();

    let started = tokio::time::Instant::now();
    scheduler.run().await.unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    // Must not wait for even one 30s fetch, let alone the whole cycle.
    assert!(
        started.elapsed() < Duration::from_secs(30),
        "shutdown waited for the scan cycle: {:?}",
        started.elapsed()
    );
}

#[tokio::test(start_paused = true)]
async fn stop_command_interrupts_a_slow_scan() {
    let urls = ["https://m/a", "https://m/b", "https://m/c"];
    let extractor = FallbackExtractor::new("p", "o").with_source(Box::new(SlowSource {
        delay: Duration::from_secs(30),
    }));
    let (mut scheduler, tx) = build_with_extractor(extractor, &urls, Duration::from_secs(60));
    tx.send(ScanEvent::Input("quit".to_string())).await.unwrap();

    let started = tokio::time::Instant::now();
    scheduler.run().await.unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert!(
        started.elapsed() < Duration::from_secs(30),
        "quit waited for the scan cycle: {:?}",
        started.elapsed()
    );
}

#[tokio::test(start_paused = true)]
async fn failing_market_does_not_block_the_others() {
    let urls = ["https://m/ok", "https://m/broken"];
    let source = MockSource::new();
    source.set_market(urls[0], vec![dec!(30), dec!(30)], vec!["Up", "Down"]);
    source.fail_market(urls[1]);

    let (mut scheduler, tx) = build_scheduler(source.clone(), &urls, Duration::from_secs(60));
    let handle = tokio::spawn(async move {
        scheduler.run().await.unwrap();
        (scheduler.state(), scheduler.watchlist().clone())
    });

    while source.price_calls() < 2 {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    tx.send(ScanEvent::Input("quit".to_string())).await.unwrap();

    let (state, watchlist) = handle.await.unwrap();
    assert_eq!(state, SchedulerState::Stopped);

    let ok = watchlist.get(urls[0]).unwrap();
    assert!(ok.has_data());
    assert_eq!(ok.margin.round_dp(2), dec!(66.67));

    let broken = watchlist.get(urls[1]).unwrap();
    assert!(!broken.has_data());
}

#[tokio::test]
async fn trade_dialog_runs_from_queued_input() {
    let url = "https://m/a";
    let source = MockSource::new();
    source.set_market(url, vec![dec!(40), dec!(40)], vec!["Yes", "No"]);

    let (mut scheduler, tx) = build_scheduler(source.clone(), &[url], Duration::from_secs(60));
    for line in ["trade", "1", "100", "quit"] {
        tx.send(ScanEvent::Input(line.to_string())).await.unwrap();
    }

    scheduler.run().await.unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    // The dialog reads stored snapshots, never refetches.
    assert_eq!(source.price_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn unrecognized_input_does_not_stall_the_countdown() {
    let url = "https://m/a";
    let source = MockSource::new();
    source.set_market(url, vec![dec!(40), dec!(40)], vec![]);

    let (mut scheduler, tx) = build_scheduler(source.clone(), &[url], Duration::from_secs(10));
    let handle = tokio::spawn(async move {
        scheduler.run().await.unwrap();
        scheduler.state()
    });

    // Type nonsense faster than the tick for well past the interval; the
    // countdown must keep advancing regardless.
    for _ in 0..56 {
        tx.send(ScanEvent::Input("huh".to_string())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    assert!(
        source.price_calls() >= 2,
        "countdown stalled by unrecognized input"
    );

    tx.send(ScanEvent::Input("quit".to_string())).await.unwrap();
    assert_eq!(handle.await.unwrap(), SchedulerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn trade_dialog_does_not_reset_the_countdown() {
    let url = "https://m/a";
    let source = MockSource::new();
    source.set_market(url, vec![dec!(40), dec!(40)], vec![]);

    let (mut scheduler, tx) = build_scheduler(source.clone(), &[url], Duration::from_secs(60));
    let handle = tokio::spawn(async move {
        scheduler.run().await.unwrap();
        scheduler.state()
    });

    // First scan runs immediately; let ~35s of the wait elapse.
    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(source.price_calls(), 1);

    // Open the dialog, then cancel it with an invalid stake.
    for line in ["trade", "1", "not-a-number"] {
        tx.send(ScanEvent::Input(line.to_string())).await.unwrap();
    }

    // The second scan fires roughly 25s later. A reset countdown would
    // push it out to a full 60s.
    let resumed = tokio::time::Instant::now();
    while source.price_calls() < 2 {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    let elapsed = resumed.elapsed();
    assert!(
        elapsed >= Duration::from_secs(20),
        "second scan came too early: {:?}",
        elapsed
    );
    assert!(
        elapsed <= Duration::from_secs(40),
        "countdown was reset by the dialog: {:?}",
        elapsed
    );

    tx.send(ScanEvent::Input("quit".to_string())).await.unwrap();
    assert_eq!(handle.await.unwrap(), SchedulerState::Stopped);
}
