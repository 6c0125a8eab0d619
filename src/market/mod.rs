//! Market module for monitored prediction-market pages.
//!
//! This module handles:
//! - Market records and last-known scan snapshots
//! - Display-label derivation from market URLs
//! - The ordered watchlist owned by the scan loop

pub mod types;

pub use types::{derive_label, Market, Watchlist};
