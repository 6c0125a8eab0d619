//! Scan scheduling state machine and the interactive command surface.
//!
//! The scheduler drives repeated scan cycles at a fixed interval while
//! listening on an event queue for free-text commands. The interval wait
//! is a fine-grained tick loop so a command issued mid-wait is honored
//! within half a second rather than at the next cycle boundary.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use strum::EnumString;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::info;

use crate::arbitrage::{plan, MarketScanner};
use crate::error::{PlanError, Result};
use crate::market::{Market, Watchlist};
use crate::metrics;
use crate::notify::Notifier;
use crate::report::Reporter;
use crate::utils::join_decimals;

/// Event fed into the scheduler's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A line of free-text user input.
    Input(String),
    /// Process termination signal.
    Shutdown,
}

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not yet started.
    Idle,
    /// Running a scan cycle over all markets.
    Scanning,
    /// Counting down the interval, interruptible per tick.
    Waiting,
    /// Inside the interactive trade sub-dialog.
    AwaitingTradeChoice,
    /// Terminal; no further scans occur.
    Stopped,
}

/// Recognized wait-state commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum WaitCommand {
    /// Open the trade-inspection sub-dialog.
    #[strum(serialize = "trade", serialize = "yes", serialize = "y")]
    Inspect,
    /// Stop the monitor.
    #[strum(serialize = "quit", serialize = "exit", serialize = "stop")]
    Stop,
}

/// Why the scheduler left the wait loop.
enum Phase {
    Scan,
    Stop(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Command,
    Signal,
    InputClosed,
}

impl StopReason {
    fn describe(self) -> &'static str {
        match self {
            StopReason::Command => "user command",
            StopReason::Signal => "manual interruption",
            StopReason::InputClosed => "input closed",
        }
    }
}

/// One received piece of dialog input.
enum DialogInput {
    Line(String),
    Stop(StopReason),
}

/// Outcome of the trade sub-dialog.
enum DialogOutcome {
    Done,
    Stop(StopReason),
}

/// Drives repeated scan cycles and the interactive trade inspector.
pub struct ScanScheduler {
    scanner: MarketScanner,
    watchlist: Watchlist,
    interval: Duration,
    events: mpsc::Receiver<ScanEvent>,
    // Input received during a scan, held back for the wait phase.
    pending: VecDeque<ScanEvent>,
    reporter: Arc<Reporter>,
    notifier: Arc<Notifier>,
    state: SchedulerState,
}

impl ScanScheduler {
    /// Granularity of the interruptible interval countdown.
    pub const TICK: Duration = Duration::from_millis(500);

    /// Create a scheduler in the `Idle` state.
    pub fn new(
        scanner: MarketScanner,
        watchlist: Watchlist,
        interval: Duration,
        events: mpsc::Receiver<ScanEvent>,
        reporter: Arc<Reporter>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            scanner,
            watchlist,
            interval,
            events,
            pending: VecDeque::new(),
            reporter,
            notifier,
            state: SchedulerState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Read access to the last committed snapshots.
    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Run scan cycles until a stop command, signal or closed input queue.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            if let Some(reason) = self.scan_phase().await {
                self.stop(reason).await;
                return Ok(());
            }

            let reporter = self.reporter.clone();
            reporter
                .line(&format!(
                    "⏳ Waiting {} minutes until next check.",
                    self.interval.as_secs_f64() / 60.0,
                ))
                .await;
            reporter
                .line("📝 Type 'trade' + Enter to see all available trades.")
                .await;

            match self.wait_phase().await {
                Phase::Scan => continue,
                Phase::Stop(reason) => {
                    self.stop(reason).await;
                    return Ok(());
                }
            }
        }
    }

    /// Run one scan cycle, racing it against the event queue so a stop
    /// command or termination signal interrupts a slow cycle mid-flight.
    ///
    /// Other input arriving during the scan is held back and handled in
    /// order once the wait starts.
    async fn scan_phase(&mut self) -> Option<StopReason> {
        self.state = SchedulerState::Scanning;
        let reporter = self.reporter.clone();
        let notifier = self.notifier.clone();

        let Self {
            scanner,
            watchlist,
            events,
            pending,
            ..
        } = self;
        let scan = scanner.scan(watchlist, &reporter, &notifier);
        tokio::pin!(scan);

        loop {
            tokio::select! {
                _ = &mut scan => return None,
                event = events.recv() => match event {
                    None => return Some(StopReason::InputClosed),
                    Some(ScanEvent::Shutdown) => return Some(StopReason::Signal),
                    Some(ScanEvent::Input(line)) => {
                        // A lone stop command interrupts the cycle;
                        // anything queued behind other input keeps its
                        // turn in the wait phase.
                        if pending.is_empty()
                            && matches!(WaitCommand::from_str(line.trim()), Ok(WaitCommand::Stop))
                        {
                            return Some(StopReason::Command);
                        }
                        pending.push_back(ScanEvent::Input(line));
                    }
                },
            }
        }
    }

    /// Interruptible interval countdown.
    ///
    /// Time spent inside the trade sub-dialog does not count against the
    /// interval, and returning from it resumes the countdown where it
    /// left off.
    async fn wait_phase(&mut self) -> Phase {
        self.state = SchedulerState::Waiting;
        let mut waited = Duration::ZERO;

        while waited < self.interval {
            let tick_start = Instant::now();
            let received = match self.pending.pop_front() {
                Some(event) => Some(Some(event)),
                None => tokio::select! {
                    _ = sleep(Self::TICK) => None,
                    event = self.events.recv() => Some(event),
                },
            };
            // Count elapsed time, not completed ticks, so input arriving
            // mid-tick cannot stall the countdown.
            waited += tick_start.elapsed();

            match received {
                None => {}
                Some(None) => return Phase::Stop(StopReason::InputClosed),
                Some(Some(ScanEvent::Shutdown)) => return Phase::Stop(StopReason::Signal),
                Some(Some(ScanEvent::Input(line))) => {
                    match WaitCommand::from_str(line.trim()) {
                        Ok(WaitCommand::Stop) => {
                            self.reporter.line("Stopping monitor...").await;
                            return Phase::Stop(StopReason::Command);
                        }
                        Ok(WaitCommand::Inspect) => match self.trade_dialog().await {
                            DialogOutcome::Done => self.state = SchedulerState::Waiting,
                            DialogOutcome::Stop(reason) => return Phase::Stop(reason),
                        },
                        Err(_) => {
                            self.reporter
                                .line("Type 'trade' to see all trades or 'quit' to stop.")
                                .await;
                        }
                    }
                }
            }
        }

        Phase::Scan
    }

    /// Interactive trade inspection over the last committed snapshots.
    ///
    /// Any invalid entry cancels the dialog; control returns to the wait
    /// loop either way.
    async fn trade_dialog(&mut self) -> DialogOutcome {
        self.state = SchedulerState::AwaitingTradeChoice;
        let reporter = self.reporter.clone();
        let notifier = self.notifier.clone();

        let listing: Vec<Market> = self
            .watchlist
            .with_data()
            .into_iter()
            .map(|(_, market)| market.clone())
            .collect();

        if listing.is_empty() {
            reporter
                .line("❌ No trade data available. Please wait for at least one scan cycle to complete.")
                .await;
            return DialogOutcome::Done;
        }

        reporter
            .line(&format!(
                "\n📊 Available trades (showing all {} markets):",
                listing.len(),
            ))
            .await;

        let mut message = format!(
            "📊 **ALL AVAILABLE TRADES**\n🔍 Total markets: {}\n\n",
            listing.len(),
        );
        for (i, market) in listing.iter().enumerate() {
            let profitable = market.margin > Decimal::ZERO;
            let status = if profitable {
                "🎯 PROFITABLE"
            } else {
                "❌ Not profitable"
            };
            reporter
                .line(&format!(
                    "   {}. {} - {}% margin ({})",
                    i + 1,
                    market.label,
                    market.margin.round_dp(2),
                    status,
                ))
                .await;
            message.push_str(&format!(
                "{}. {}\n   Margin: {}% {}\n\n",
                i + 1,
                market.label,
                market.margin.round_dp(2),
                if profitable { "🎯" } else { "❌" },
            ));
        }
        notifier.notify(&message).await;

        reporter
            .line("\nEnter the number of the trade you want to calculate:")
            .await;
        let choice = match self.next_input().await {
            DialogInput::Line(line) => line,
            DialogInput::Stop(reason) => return DialogOutcome::Stop(reason),
        };
        let market = match choice.trim().parse::<usize>() {
            Ok(n) if (1..=listing.len()).contains(&n) => listing[n - 1].clone(),
            Ok(_) => {
                reporter.line("Invalid choice.").await;
                return DialogOutcome::Done;
            }
            Err(_) => {
                reporter.line("Invalid input.").await;
                return DialogOutcome::Done;
            }
        };

        reporter
            .line(&format!("\n📋 Trade details for: {}", market.label))
            .await;
        reporter
            .line(&format!("   Margin: {}%", market.margin.round_dp(2)))
            .await;
        reporter
            .line(&format!("   Prices: {}", join_decimals(&market.prices)))
            .await;
        reporter
            .line(&format!("   Outcomes: {:?}", market.outcomes))
            .await;

        if market.margin <= Decimal::ZERO {
            reporter
                .line("⚠️  Warning: This trade has a negative margin - you would lose money!")
                .await;
            reporter
                .line("Do you still want to calculate stake distribution? (y/n):")
                .await;
            let confirm = match self.next_input().await {
                DialogInput::Line(line) => line,
                DialogInput::Stop(reason) => return DialogOutcome::Stop(reason),
            };
            if !matches!(confirm.trim().to_lowercase().as_str(), "y" | "yes") {
                reporter.line("Trade calculation cancelled.").await;
                return DialogOutcome::Done;
            }
        }

        reporter.line("Enter your stake:").await;
        let stake_line = match self.next_input().await {
            DialogInput::Line(line) => line,
            DialogInput::Stop(reason) => return DialogOutcome::Stop(reason),
        };
        let stake = match stake_line.trim().parse::<Decimal>() {
            Ok(s) => s,
            Err(_) => {
                reporter.line("Invalid input.").await;
                return DialogOutcome::Done;
            }
        };

        match plan(&market, stake) {
            Ok(stake_plan) => {
                metrics::inc_stake_plans();
                info!(market = %stake_plan.market_label, stake = %stake, "Stake plan built");
                reporter
                    .line(&format!("\n🎯 Trading table for: {}", stake_plan.market_label))
                    .await;
                reporter
                    .line("Distribution of the stake among the odds should be as follows:\n")
                    .await;
                for row in stake_plan.render_table().lines() {
                    reporter.line(row).await;
                }
                notifier.notify_stake_plan(&stake_plan).await;
            }
            Err(PlanError::InvalidStake(_)) => {
                reporter.line("Invalid stake amount.").await;
            }
            Err(e) => {
                reporter.line(&format!("❌ {}", e)).await;
            }
        }

        DialogOutcome::Done
    }

    async fn next_input(&mut self) -> DialogInput {
        if let Some(event) = self.pending.pop_front() {
            return match event {
                ScanEvent::Input(line) => DialogInput::Line(line),
                ScanEvent::Shutdown => DialogInput::Stop(StopReason::Signal),
            };
        }
        match self.events.recv().await {
            Some(ScanEvent::Input(line)) => DialogInput::Line(line),
            Some(ScanEvent::Shutdown) => DialogInput::Stop(StopReason::Signal),
            None => DialogInput::Stop(StopReason::InputClosed),
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        self.state = SchedulerState::Stopped;
        self.reporter
            .line(&format!("\n🛑 Monitoring stopped ({}).", reason.describe()))
            .await;
        self.notifier.notify_stopped(reason.describe()).await;
    }
}
