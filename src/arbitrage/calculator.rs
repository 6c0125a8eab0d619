//! Arbitrage margin and odds calculations.

use rust_decimal::Decimal;

use crate::error::CalculationError;

/// Result of an arbitrage calculation over one market's prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Arbitrage {
    /// Decimal odds parallel to the input prices (100 / price).
    pub odds: Vec<Decimal>,
    /// Arbitrage constant K: the sum of implied probabilities.
    pub constant: Decimal,
    /// Margin percentage: (100 / K) - 100.
    pub margin: Decimal,
}

impl Arbitrage {
    /// Whether the margin marks an exploitable gap.
    pub fn is_opportunity(&self) -> bool {
        self.margin > Decimal::ZERO
    }
}

/// Compute decimal odds, the arbitrage constant and the margin from
/// per-outcome "yes" prices (cents in (0, 100]).
///
/// Each price encodes an implied probability `p / 100`; the fair decimal
/// odd is `100 / p`. K is the sum of implied probabilities; a K below 1
/// means the prices leave a riskless gap and the margin comes out
/// positive.
///
/// A single price outside (0, 100] fails the whole computation: dropping
/// only the bad entry would silently skew the margin for the rest.
pub fn compute_margin(prices: &[Decimal]) -> Result<Arbitrage, CalculationError> {
    if prices.is_empty() {
        return Err(CalculationError::EmptyInput);
    }

    for &price in prices {
        if price <= Decimal::ZERO || price > Decimal::ONE_HUNDRED {
            return Err(CalculationError::InvalidPrice(price));
        }
    }

    let odds: Vec<Decimal> = prices.iter().map(|p| Decimal::ONE_HUNDRED / p).collect();
    let constant: Decimal = prices
        .iter()
        .map(|p| p / Decimal::ONE_HUNDRED)
        .sum();
    let margin = Decimal::ONE_HUNDRED / constant - Decimal::ONE_HUNDRED;

    Ok(Arbitrage {
        odds,
        constant,
        margin,
    })
}
