//! Bet record store.
//!
//! Owns one user's list of wagers. Append-only on creation: existing
//! records are only touched by `resolve` (status + derived profit) and
//! `delete`. Knows nothing about the bankroll beyond the stake field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Bet, BetSlip, BetStatus, LedgerError, LedgerResult, Outcome};

/// All bets for one user, with the next id to assign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetStore {
    bets: Vec<Bet>,
    next_id: u64,
}

impl BetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a new Pending bet. Never mutates existing records.
    pub fn add_bet(&mut self, slip: BetSlip) -> LedgerResult<&Bet> {
        validate_slip(&slip)?;

        let bet = Bet {
            id: self.next_id,
            placed_at: slip.placed_at,
            category: slip.category,
            description: slip.description,
            bet_kind: slip.bet_kind,
            stake: slip.stake,
            odds: slip.odds,
            status: BetStatus::Pending,
            profit_loss: Decimal::ZERO,
        };
        self.next_id += 1;

        debug!(id = bet.id, stake = %bet.stake, odds = %bet.odds, "Bet recorded");
        self.bets.push(bet);
        Ok(self.bets.last().unwrap())
    }

    /// Settle a pending bet, recomputing profit/loss from the formula.
    pub fn resolve(&mut self, id: u64, outcome: Outcome) -> LedgerResult<&Bet> {
        let bet = self
            .bets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        if !bet.is_pending() {
            return Err(LedgerError::InvalidState {
                id,
                status: bet.status,
            });
        }

        bet.profit_loss = bet.profit_for(outcome);
        bet.status = outcome.into();

        debug!(id, outcome = %outcome, pnl = %bet.profit_loss, "Bet resolved");
        Ok(bet)
    }

    /// Remove a bet in any status, returning the removed record so the
    /// caller can account for it.
    pub fn delete(&mut self, id: u64) -> LedgerResult<Bet> {
        let idx = self
            .bets
            .iter()
            .position(|b| b.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        let bet = self.bets.remove(idx);
        debug!(id, status = %bet.status, "Bet deleted");
        Ok(bet)
    }

    pub fn get(&self, id: u64) -> Option<&Bet> {
        self.bets.iter().find(|b| b.id == id)
    }

    /// Pending bets, in insertion order.
    pub fn list_pending(&self) -> impl Iterator<Item = &Bet> {
        self.bets.iter().filter(|b| b.is_pending())
    }

    /// All bets, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Bet> {
        self.bets.iter()
    }

    /// All bets, newest date first; ties keep insertion order.
    pub fn list_all(&self) -> Vec<Bet> {
        let mut sorted = self.bets.clone();
        sorted.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then(a.id.cmp(&b.id)));
        sorted
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Sum of stakes currently at risk in Pending bets.
    pub fn pending_exposure(&self) -> Decimal {
        self.list_pending().map(|b| b.stake).sum()
    }
}

fn validate_slip(slip: &BetSlip) -> LedgerResult<()> {
    if slip.stake < Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "stake must be non-negative, got {}",
            slip.stake
        )));
    }
    if slip.odds < crate::types::min_odds() {
        return Err(LedgerError::Validation(format!(
            "odds must be at least 1.01, got {}",
            slip.odds
        )));
    }
    if slip.description.trim().is_empty() {
        return Err(LedgerError::Validation("description is empty".to_string()));
    }
    if slip.bet_kind.trim().is_empty() {
        return Err(LedgerError::Validation("bet type is empty".to_string()));
    }
    // The win payout must stay representable; stake and odds are
    // immutable afterwards, so checking here covers every later
    // profit computation.
    if slip.stake.checked_mul(slip.odds - Decimal::ONE).is_none() {
        return Err(LedgerError::Validation(format!(
            "potential payout overflows for stake {} at odds {}",
            slip.stake, slip.odds
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
