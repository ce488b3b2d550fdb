//! Settlement engine.
//!
//! Couples the bet store to the bankroll and defines the only legal
//! balance mutations:
//!
//! - Place: stake must fit within available balance; nothing deducted
//!   (the stake is reserved, not taken — it stays the user's money
//!   until the bet settles).
//! - Resolve Win: balance += profit only; the principal was never
//!   removed, so crediting it back would double-count.
//! - Resolve Loss: balance -= stake.
//! - Delete: no balance effect for any status. A pending stake was
//!   never deducted and a settled outcome stays settled.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ledger::bankroll::Bankroll;
use crate::ledger::bets::BetStore;
use crate::types::{
    Bet, BetSlip, LedgerError, LedgerResult, Outcome, ParlayLeg, Transaction, PARLAY_CATEGORY,
};

/// One user's complete ledger: bets, bankroll, and the settlement rules
/// between them. This is the session object every operation runs against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLedger {
    username: String,
    bets: BetStore,
    bankroll: Bankroll,
}

impl UserLedger {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            bets: BetStore::new(),
            bankroll: Bankroll::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn bets(&self) -> &BetStore {
        &self.bets
    }

    pub fn bankroll(&self) -> &Bankroll {
        &self.bankroll
    }

    /// Bankroll balance minus stakes reserved in pending bets. Derived,
    /// never stored; gates new-bet placement.
    pub fn available_balance(&self) -> Decimal {
        self.bankroll.balance() - self.bets.pending_exposure()
    }

    // -- Cash operations --------------------------------------------------

    pub fn deposit(&mut self, amount: Decimal, note: Option<String>) -> LedgerResult<Transaction> {
        let tx = self.bankroll.deposit(amount, note)?.clone();
        info!(user = %self.username, amount = %amount, balance = %self.bankroll.balance(), "Deposit recorded");
        Ok(tx)
    }

    pub fn withdraw(&mut self, amount: Decimal, note: Option<String>) -> LedgerResult<Transaction> {
        let tx = self.bankroll.withdraw(amount, note)?.clone();
        info!(user = %self.username, amount = %amount, balance = %self.bankroll.balance(), "Withdrawal recorded");
        Ok(tx)
    }

    // -- Bet operations ---------------------------------------------------

    /// Place a single bet. The stake is reserved against available
    /// balance but not deducted.
    pub fn place_bet(&mut self, slip: BetSlip) -> LedgerResult<Bet> {
        let available = self.available_balance();
        if slip.stake > available {
            return Err(LedgerError::InsufficientFunds {
                needed: slip.stake,
                available,
            });
        }

        let bet = self.bets.add_bet(slip)?.clone();
        info!(
            user = %self.username,
            id = bet.id,
            stake = %bet.stake,
            odds = %bet.odds,
            available = %self.available_balance(),
            "Bet placed"
        );
        Ok(bet)
    }

    /// Place a parlay: one stake across all legs, combined odds = the
    /// product of leg odds. Validation is atomic — a bad leg means no
    /// record at all.
    pub fn place_parlay(
        &mut self,
        legs: &[ParlayLeg],
        stake: Decimal,
        placed_at: NaiveDate,
    ) -> LedgerResult<Bet> {
        if legs.len() < 2 {
            return Err(LedgerError::Validation(format!(
                "a parlay needs at least 2 legs, got {}",
                legs.len()
            )));
        }
        for (i, leg) in legs.iter().enumerate() {
            if leg.description.trim().is_empty() || leg.selection.trim().is_empty() {
                return Err(LedgerError::Validation(format!(
                    "parlay leg {} has an empty description or selection",
                    i + 1
                )));
            }
            if leg.odds < crate::types::min_odds() {
                return Err(LedgerError::Validation(format!(
                    "parlay leg {} odds must be at least 1.01, got {}",
                    i + 1,
                    leg.odds
                )));
            }
        }

        let mut combined_odds = Decimal::ONE;
        for leg in legs {
            combined_odds = combined_odds.checked_mul(leg.odds).ok_or_else(|| {
                LedgerError::Validation("combined parlay odds are too large".to_string())
            })?;
        }
        let description = legs
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(" | ");

        self.place_bet(BetSlip {
            placed_at,
            category: PARLAY_CATEGORY.to_string(),
            description,
            bet_kind: format!("{}-Pick Parlay", legs.len()),
            stake,
            odds: combined_odds,
        })
    }

    /// Settle a pending bet and apply its outcome to the bankroll.
    pub fn resolve_bet(&mut self, id: u64, outcome: Outcome) -> LedgerResult<Bet> {
        let bet = self.bets.resolve(id, outcome)?.clone();
        self.bankroll.adjust(bet.profit_loss);
        info!(
            user = %self.username,
            id,
            outcome = %outcome,
            pnl = %bet.profit_loss,
            balance = %self.bankroll.balance(),
            "Bet settled"
        );
        Ok(bet)
    }

    /// Remove a bet in any status. No balance effect: a pending stake
    /// was never deducted, and a settled outcome is not reversed.
    pub fn delete_bet(&mut self, id: u64) -> LedgerResult<Bet> {
        let bet = self.bets.delete(id)?;
        info!(user = %self.username, id, status = %bet.status, "Bet removed");
        Ok(bet)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
