//! Arbitrage monitor entry point.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arb_monitor::arbitrage::MarketScanner;
use arb_monitor::config::Config;
use arb_monitor::extract::{FallbackExtractor, HttpSource};
use arb_monitor::market::Watchlist;
use arb_monitor::metrics;
use arb_monitor::notify::Notifier;
use arb_monitor::report::Reporter;
use arb_monitor::scheduler::{ScanEvent, ScanScheduler};
use arb_monitor::utils::shutdown_signal;

/// Multi-market prediction-market arbitrage monitor.
#[derive(Parser, Debug)]
#[command(name = "arb-monitor")]
#[command(about = "Monitors prediction-market pages for arbitrage opportunities")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitoring loop (default).
    Run,

    /// Check configuration validity.
    CheckConfig,

    /// Run a single scan cycle and exit.
    ScanOnce,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    match args.command {
        Some(Command::CheckConfig) => {
            init_logging(args.verbose, None);
            cmd_check_config().await
        }
        Some(Command::ScanOnce) => cmd_scan_once(args.verbose).await,
        Some(Command::Run) | None => cmd_run(args.verbose).await,
    }
}

/// Initialize tracing. Precedence: verbose flag (CLI or config), then
/// the RUST_LOG environment variable, then the configured default level.
fn init_logging(verbose: bool, default_level: Option<&str>) {
    let filter = if verbose {
        EnvFilter::new("arb_monitor=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level.unwrap_or("info")))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}

fn build_extractor(config: &Config) -> FallbackExtractor {
    FallbackExtractor::new(&config.price_selector, &config.outcome_selector)
        .with_source(Box::new(HttpSource::new()))
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ARBITRAGE MONITOR - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Markets: {}", config.urls().len());
    for (i, url) in config.urls().iter().enumerate() {
        println!("    {}. {}", i + 1, url);
    }
    println!("  Scan Interval: {} minutes", config.scan_interval_minutes);
    println!("  High Margin Threshold: {}%", config.high_margin_threshold);
    println!("  Log File: {}", config.log_file);
    println!(
        "  Discord Notifications: {}",
        if config.webhooks_enabled() {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!(
        "  Discord Log Channel: {}",
        if config.discord_log_webhook_url.is_some() {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run one scan cycle and exit.
async fn cmd_scan_once(verbose: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(verbose || config.verbose, Some(&config.rust_log));
    metrics::init_metrics();

    let notifier = Arc::new(Notifier::from_config(&config));
    let reporter = Arc::new(Reporter::new(
        &config.log_file,
        notifier.log_channel_enabled().then(|| notifier.clone()),
    ));
    let scanner = MarketScanner::new(build_extractor(&config), config.high_margin_threshold);
    let mut watchlist = Watchlist::from_urls(config.urls());

    let cycle = scanner.scan(&mut watchlist, &reporter, &notifier).await;
    info!(
        scanned = cycle.scanned,
        opportunities = cycle.opportunities.len(),
        "Scan cycle complete"
    );

    Ok(())
}

/// Run the monitoring loop.
async fn cmd_run(verbose: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(verbose || config.verbose, Some(&config.rust_log));
    metrics::init_metrics();

    let notifier = Arc::new(Notifier::from_config(&config));
    let reporter = Arc::new(Reporter::new(
        &config.log_file,
        notifier.log_channel_enabled().then(|| notifier.clone()),
    ));

    let urls = config.urls();
    let watchlist = Watchlist::from_urls(urls.clone());

    reporter.line("🚀 Starting multi-market arbitrage monitor...").await;
    reporter
        .line(&format!(
            "⏰ Check interval: {} minutes",
            config.scan_interval_minutes
        ))
        .await;
    reporter
        .line(&format!("🌐 Monitoring {} markets:", urls.len()))
        .await;
    for (i, market) in watchlist.markets().iter().enumerate() {
        reporter
            .line(&format!("   {}. {}", i + 1, market.label))
            .await;
    }
    match reporter.log_path() {
        Some(path) => reporter.line(&format!("📝 Log file: {}", path.display())).await,
        None => reporter.line("📝 Log file: disabled").await,
    }
    reporter
        .line(&format!(
            "📢 Discord notifications: {}",
            if notifier.enabled() { "Enabled" } else { "Disabled" }
        ))
        .await;
    if notifier.enabled() {
        reporter
            .line(&format!(
                "📢 Discord log channel: {}",
                if notifier.log_channel_enabled() {
                    "Enabled"
                } else {
                    "Disabled"
                }
            ))
            .await;
        notifier
            .notify_started(config.scan_interval_minutes, urls.len())
            .await;
    }
    reporter.line("ℹ️  Press Ctrl+C to stop monitoring").await;
    reporter
        .line("💡 Type 'trade' + Enter anytime to see all trades\n")
        .await;

    // Free-text commands and the termination signal feed one event queue;
    // the scheduler is the only consumer.
    let (tx, rx) = mpsc::channel::<ScanEvent>(32);

    let input_tx = tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if input_tx.send(ScanEvent::Input(line)).await.is_err() {
                break;
            }
        }
    });

    let signal_tx = tx;
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = signal_tx.send(ScanEvent::Shutdown).await;
    });

    let scanner = MarketScanner::new(build_extractor(&config), config.high_margin_threshold);
    let mut scheduler = ScanScheduler::new(
        scanner,
        watchlist,
        config.scan_interval(),
        rx,
        reporter,
        notifier,
    );

    if let Err(e) = scheduler.run().await {
        error!(error = %e, "Monitor loop failed");
        return Err(e.into());
    }

    Ok(())
}
