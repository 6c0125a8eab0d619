//! Stake-allocation planning over a market's last scan snapshot.

use rust_decimal::Decimal;

use crate::error::PlanError;
use crate::market::Market;

/// One outcome's row in a stake plan.
#[derive(Debug, Clone, PartialEq)]
pub struct StakeLine {
    /// Outcome label (synthesized as "Option N" when missing).
    pub outcome: String,
    /// "Yes" price in cents.
    pub price: Decimal,
    /// Decimal odd.
    pub odd: Decimal,
    /// Stake allocated to this outcome.
    pub stake: Decimal,
    /// Payout if this outcome occurs (odd * stake).
    pub payout: Decimal,
}

/// Proportional stake allocation across one market's outcomes.
///
/// Built from the market's last committed snapshot, so the plan can be
/// stale relative to the live page.
#[derive(Debug, Clone, PartialEq)]
pub struct StakePlan {
    /// Display label of the planned market.
    pub market_label: String,
    /// Margin of the underlying snapshot.
    pub margin: Decimal,
    /// Per-outcome allocation rows.
    pub lines: Vec<StakeLine>,
    /// Total stake supplied by the caller.
    pub total_stake: Decimal,
    /// Guaranteed profit: total_stake * (1/K - 1).
    pub profit: Decimal,
}

/// Build a stake plan for a market from its stored odds.
///
/// `stake_i = total * (p_i/100) / K`, which makes every `odd_i * stake_i`
/// payout equal regardless of which outcome occurs.
pub fn plan(market: &Market, stake_total: Decimal) -> Result<StakePlan, PlanError> {
    if stake_total <= Decimal::ZERO {
        return Err(PlanError::InvalidStake(stake_total));
    }
    if !market.has_data() {
        return Err(PlanError::NoData {
            market: market.label.clone(),
        });
    }

    let constant: Decimal = market
        .prices
        .iter()
        .map(|p| p / Decimal::ONE_HUNDRED)
        .sum();

    let lines: Vec<StakeLine> = market
        .prices
        .iter()
        .zip(market.odds.iter())
        .enumerate()
        .map(|(i, (&price, &odd))| {
            let stake = stake_total * (price / Decimal::ONE_HUNDRED) / constant;
            StakeLine {
                outcome: market
                    .outcomes
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("Option {}", i + 1)),
                price,
                odd,
                stake,
                payout: odd * stake,
            }
        })
        .collect();

    let profit = stake_total * (Decimal::ONE / constant - Decimal::ONE);

    Ok(StakePlan {
        market_label: market.label.clone(),
        margin: market.margin,
        lines,
        total_stake: stake_total,
        profit,
    })
}

impl StakePlan {
    /// Render the allocation as an aligned console table.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<20} | {:<10} | {:<8} | {:<10} | {:<10}\n",
            "Outcome", "Yes Price", "Odd", "Stake", "Payout"
        ));
        out.push_str(&"-".repeat(70));
        out.push('\n');

        for line in &self.lines {
            out.push_str(&format!(
                "{:<20} | {:<10} | {:<8} | {:<10} | {:<10}\n",
                line.outcome,
                line.price.round_dp(2),
                line.odd.round_dp(2),
                line.stake.round_dp(2),
                line.payout.round_dp(2),
            ));
        }

        out.push_str(&format!(
            "\nTotal profit would be: {}\n",
            self.profit.round_dp(2)
        ));
        out
    }
}
