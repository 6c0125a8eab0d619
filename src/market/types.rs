//! Monitored-market types and the owned watchlist.

use rust_decimal::Decimal;
use url::Url;

use crate::arbitrage::Arbitrage;

/// Maximum length of a derived market label.
const LABEL_MAX: usize = 40;

/// A monitored market page and its last-known scan snapshot.
///
/// Created once at startup per configured URL and mutated in place by the
/// scanner: a successful calculation replaces the whole snapshot (labels,
/// prices, odds, margin), a failed cycle leaves the previous snapshot
/// untouched.
#[derive(Debug, Clone)]
pub struct Market {
    /// Market page URL (identity key).
    pub url: String,
    /// Short display label derived from the URL.
    pub label: String,
    /// Outcome labels from the last successful scan (may be empty).
    pub outcomes: Vec<String>,
    /// Per-outcome "yes" prices in cents, each in (0, 100].
    pub prices: Vec<Decimal>,
    /// Decimal odds parallel to `prices` (100 / price).
    pub odds: Vec<Decimal>,
    /// Arbitrage margin percentage from the last successful scan.
    pub margin: Decimal,
}

impl Market {
    /// Create a market with empty defaults for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let label = derive_label(&url);
        Self {
            url,
            label,
            outcomes: Vec::new(),
            prices: Vec::new(),
            odds: Vec::new(),
            margin: Decimal::ZERO,
        }
    }

    /// Whether at least one successful scan has stored a snapshot.
    pub fn has_data(&self) -> bool {
        !self.prices.is_empty()
    }

    /// Whether the last-known margin marks this market as an opportunity.
    pub fn is_opportunity(&self) -> bool {
        self.has_data() && self.margin > Decimal::ZERO
    }

    /// Replace the stored snapshot with a fresh calculation.
    pub fn apply(&mut self, outcomes: Vec<String>, prices: Vec<Decimal>, arb: &Arbitrage) {
        self.outcomes = outcomes;
        self.prices = prices;
        self.odds = arb.odds.clone();
        self.margin = arb.margin;
    }
}

/// Derive a short display label from a market URL.
///
/// Polymarket event URLs become the event slug with dashes replaced by
/// spaces; anything else falls back to `domain/last-path-segment`. Both
/// forms are truncated.
pub fn derive_label(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            let segments: Vec<&str> = parsed
                .path_segments()
                .map(|s| s.filter(|p| !p.is_empty()).collect())
                .unwrap_or_default();

            if host.contains("polymarket.com") {
                if let Some(pos) = segments.iter().position(|s| *s == "event") {
                    if let Some(slug) = segments.get(pos + 1) {
                        let name = slug.replace('-', " ");
                        return truncate(&name, 30);
                    }
                }
            }

            let domain = host.trim_start_matches("www.");
            let tail = segments.last().copied().unwrap_or_default();
            truncate(&format!("{}/{}", domain, tail), LABEL_MAX)
        }
        Err(_) => truncate(url, LABEL_MAX),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

/// Ordered, exclusively owned collection of monitored markets.
///
/// The scanner is the only writer; everything else reads the last
/// committed snapshots.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    markets: Vec<Market>,
}

impl Watchlist {
    /// Build a watchlist from configured URLs, preserving order.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markets: urls.into_iter().map(Market::new).collect(),
        }
    }

    /// Number of monitored markets.
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// Whether the watchlist is empty.
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Immutable view of all markets in scan order.
    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    /// Mutable iteration in scan order (scanner use only).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Market> {
        self.markets.iter_mut()
    }

    /// Look up a market by URL.
    pub fn get(&self, url: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.url == url)
    }

    /// Markets that have stored scan data, with their 1-based display index.
    pub fn with_data(&self) -> Vec<(usize, &Market)> {
        self.markets
            .iter()
            .enumerate()
            .filter(|(_, m)| m.has_data())
            .map(|(i, m)| (i + 1, m))
            .collect()
    }

    /// Last-known opportunities `(label, margin)` in scan order.
    pub fn opportunities(&self) -> Vec<(String, Decimal)> {
        self.markets
            .iter()
            .filter(|m| m.is_opportunity())
            .map(|m| (m.label.clone(), m.margin))
            .collect()
    }
}
