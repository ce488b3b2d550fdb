//! Reporting.
//!
//! Pure read-only aggregation over the bet store, recomputed on demand.
//! Never persisted and never a source of truth.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ledger::bets::BetStore;
use crate::types::BetStatus;

/// Headline figures. Stake and profit cover settled bets only; the
/// total count includes pending ones.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_bets: usize,
    pub total_stake: Decimal,
    pub total_profit: Decimal,
    /// Realized profit over realized stake, as a percentage.
    pub roi: Decimal,
}

/// Per-category performance over settled bets.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub profit_loss: Decimal,
    pub wins: usize,
    pub settled: usize,
    /// Percentage of settled bets won; 0 when nothing is settled.
    pub win_rate: Decimal,
}

/// Compute the headline summary for a bet store.
pub fn summarize(bets: &BetStore) -> Summary {
    let mut total_stake = Decimal::ZERO;
    let mut total_profit = Decimal::ZERO;

    for bet in bets.iter().filter(|b| b.is_settled()) {
        total_stake += bet.stake;
        total_profit += bet.profit_loss;
    }

    let roi = if total_stake > Decimal::ZERO {
        total_profit / total_stake * dec!(100)
    } else {
        Decimal::ZERO
    };

    Summary {
        total_bets: bets.len(),
        total_stake,
        total_profit,
        roi,
    }
}

/// Per-category profit and win rate over settled bets, sorted by
/// category name.
pub fn by_category(bets: &BetStore) -> Vec<CategoryStats> {
    let mut groups: BTreeMap<&str, (Decimal, usize, usize)> = BTreeMap::new();

    for bet in bets.iter().filter(|b| b.is_settled()) {
        let entry = groups
            .entry(bet.category.as_str())
            .or_insert((Decimal::ZERO, 0, 0));
        entry.0 += bet.profit_loss;
        entry.2 += 1;
        if bet.status == BetStatus::Win {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(category, (profit_loss, wins, settled))| {
            let win_rate = if settled > 0 {
                Decimal::from(wins) / Decimal::from(settled) * dec!(100)
            } else {
                Decimal::ZERO
            };
            CategoryStats {
                category: category.to_string(),
                profit_loss,
                wins,
                settled,
                win_rate,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
