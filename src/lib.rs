//! Multi-market prediction-market arbitrage monitor.
//!
//! Watches a set of prediction-market event pages, extracts the per-outcome
//! "yes" prices, and reports when buying one share of every outcome costs
//! less than the guaranteed payout.
//!
//! # Strategy
//!
//! Each price `p` (in cents) implies decimal odds `100 / p`. Summing the
//! implied probabilities gives the book constant `K = Σ p / 100`; when
//! `K < 1` the market underprices certainty:
//!
//! ```text
//! Yes prices:  30¢, 30¢, 30¢
//! K:           0.90 < 1.00 ✅
//! Margin:      100/K - 100 = 11.11% guaranteed
//! ```
//!
//! Stakes split proportionally to the implied probabilities pay out the
//! same amount whichever outcome resolves yes.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Watched-market state and labeling
//! - [`extract`]: Price and label extraction from market pages
//! - [`arbitrage`]: Margin calculation, stake planning and the scanner
//! - [`scheduler`]: Scan cycle timing and the interactive command surface
//! - [`report`]: Console, log-file and webhook-mirror report stream
//! - [`notify`]: Discord webhook notifier
//! - [`utils`]: Utility functions

pub mod arbitrage;
pub mod config;
pub mod error;
pub mod extract;
pub mod market;
pub mod metrics;
pub mod notify;
pub mod report;
pub mod scheduler;
pub mod utils;

pub use config::Config;
pub use error::{MonitorError, Result};
