//! Arbitrage core: margin calculation, stake planning, cycle scanning.
//!
//! This module handles:
//! - Odds/constant/margin calculation from per-outcome prices
//! - Proportional stake allocation with guaranteed-equal payouts
//! - The per-cycle scan over the watchlist

pub mod calculator;
pub mod planner;
pub mod scanner;

pub use calculator::{compute_margin, Arbitrage};
pub use planner::{plan, StakeLine, StakePlan};
pub use scanner::{MarketCheck, MarketScanner, ScanCycle};
