//! Bankroll ledger.
//!
//! One user's cash balance plus a chronological log of deposits and
//! withdrawals. Independent of the bet store; bet-outcome effects come
//! in through `adjust`, which the settlement engine alone may call and
//! which appends no transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{LedgerError, LedgerResult, Transaction, TxKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bankroll {
    balance: Decimal,
    transactions: Vec<Transaction>,
}

impl Bankroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Credit the bankroll and append a Deposit transaction.
    pub fn deposit(&mut self, amount: Decimal, note: Option<String>) -> LedgerResult<&Transaction> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "deposit amount must be positive, got {amount}"
            )));
        }

        self.balance += amount;
        self.push_tx(TxKind::Deposit, amount, note);
        debug!(amount = %amount, balance = %self.balance, "Deposit");
        Ok(self.transactions.last().unwrap())
    }

    /// Debit the bankroll and append a Withdraw transaction.
    /// The balance is untouched when the amount exceeds it.
    pub fn withdraw(&mut self, amount: Decimal, note: Option<String>) -> LedgerResult<&Transaction> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "withdrawal amount must be positive, got {amount}"
            )));
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        self.push_tx(TxKind::Withdraw, amount, note);
        debug!(amount = %amount, balance = %self.balance, "Withdrawal");
        Ok(self.transactions.last().unwrap())
    }

    /// Apply a bet-outcome delta. Settlement-engine use only; not a
    /// ledger transaction.
    pub(crate) fn adjust(&mut self, delta: Decimal) {
        self.balance += delta;
        debug!(delta = %delta, balance = %self.balance, "Balance adjusted");
    }

    /// Check that replaying the transaction log from zero reproduces
    /// every recorded `balance_after` snapshot.
    ///
    /// Only holds for cash-only histories: settlement adjustments move
    /// the balance without appending a transaction, so once one lands
    /// between cash transactions the snapshots legitimately drift from
    /// the replay. Diagnostic, not a validity check.
    pub fn replays_cleanly(&self) -> bool {
        let mut running = Decimal::ZERO;
        for tx in &self.transactions {
            running += tx.signed_amount();
            if running != tx.balance_after {
                return false;
            }
        }
        true
    }

    fn push_tx(&mut self, kind: TxKind, amount: Decimal, note: Option<String>) {
        self.transactions.push(Transaction {
            timestamp: Utc::now(),
            kind,
            amount,
            balance_after: self.balance,
            note,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
