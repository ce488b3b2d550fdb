//! Shared types for the STAKEBOOK ledger.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the ledger, storage,
//! and API modules can depend on them without circular references.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum accepted decimal odds for any bet or parlay leg.
pub fn min_odds() -> Decimal {
    dec!(1.01)
}

/// Category label reserved for multi-leg bets.
pub const PARLAY_CATEGORY: &str = "Parlay";

// ---------------------------------------------------------------------------
// Bet
// ---------------------------------------------------------------------------

/// One recorded wager, single or parlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    /// Store-assigned id; monotonically increasing, insertion order key.
    pub id: u64,
    pub placed_at: NaiveDate,
    /// Sport label, or `"Parlay"` for a multi-leg bet.
    pub category: String,
    /// Match description; for a parlay, all legs joined with " | ".
    pub description: String,
    /// Free-form bet type, or `"<N>-Pick Parlay"`.
    pub bet_kind: String,
    /// Amount at risk. Immutable once set.
    pub stake: Decimal,
    /// Decimal odds (≥ 1.01); product of leg odds for a parlay.
    pub odds: Decimal,
    pub status: BetStatus,
    /// Derived from (status, stake, odds) — never set independently.
    pub profit_loss: Decimal,
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] {} ({}) stake={} odds={} {} pnl={}",
            self.id,
            self.category,
            self.description,
            self.bet_kind,
            self.stake,
            self.odds,
            self.status,
            self.profit_loss,
        )
    }
}

impl Bet {
    /// Profit this bet would realize on a Win: `stake * (odds - 1)`.
    pub fn potential_profit(&self) -> Decimal {
        self.stake * (self.odds - Decimal::ONE)
    }

    /// The profit/loss a given outcome would produce for this bet.
    pub fn profit_for(&self, outcome: Outcome) -> Decimal {
        match outcome {
            Outcome::Win => self.potential_profit(),
            Outcome::Loss => -self.stake,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }

    /// Whether the bet has reached a terminal status.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Helper to build a test bet with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: u64) -> Self {
        Bet {
            id,
            placed_at: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            category: "Football".to_string(),
            description: "Team A vs Team B".to_string(),
            bet_kind: "Home W".to_string(),
            stake: dec!(40),
            odds: dec!(2.00),
            status: BetStatus::Pending,
            profit_loss: Decimal::ZERO,
        }
    }
}

/// Input fields for a new single bet, supplied by the interface layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetSlip {
    pub placed_at: NaiveDate,
    pub category: String,
    pub description: String,
    pub bet_kind: String,
    pub stake: Decimal,
    pub odds: Decimal,
}

/// One leg of a parlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayLeg {
    pub category: String,
    pub description: String,
    /// The pick within the match (e.g. "Home W", "o2.5").
    pub selection: String,
    pub odds: Decimal,
}

impl fmt::Display for ParlayLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.category, self.description, self.selection
        )
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Bet lifecycle status. Pending is initial; Win and Loss are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetStatus {
    Pending,
    Win,
    Loss,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Pending => write!(f, "Pending"),
            BetStatus::Win => write!(f, "Win"),
            BetStatus::Loss => write!(f, "Loss"),
        }
    }
}

/// Resolution outcome for a pending bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl From<Outcome> for BetStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => BetStatus::Win,
            Outcome::Loss => BetStatus::Loss,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Loss => write!(f, "Loss"),
        }
    }
}

/// Attempt to parse a string into an Outcome (case-insensitive).
impl std::str::FromStr for Outcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win" | "won" => Ok(Outcome::Win),
            "loss" | "lost" | "lose" => Ok(Outcome::Loss),
            _ => Err(anyhow::anyhow!("Unknown outcome: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger transactions
// ---------------------------------------------------------------------------

/// Direction of a cash movement on the bankroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    Deposit,
    Withdraw,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Deposit => write!(f, "Deposit"),
            TxKind::Withdraw => write!(f, "Withdraw"),
        }
    }
}

/// One balance-affecting event. Append-only; never edited after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TxKind,
    /// Always positive; the direction comes from `kind`.
    pub amount: Decimal,
    /// Balance snapshot immediately after this transaction applied.
    pub balance_after: Decimal,
    pub note: Option<String>,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} → balance {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.amount,
            self.balance_after,
        )?;
        if let Some(note) = &self.note {
            write!(f, " ({note})")?;
        }
        Ok(())
    }
}

impl Transaction {
    /// Signed effect of this transaction on the balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TxKind::Deposit => self.amount,
            TxKind::Withdraw => -self.amount,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for STAKEBOOK.
///
/// All variants are recoverable conditions surfaced verbatim to the
/// interface layer; none is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Bet not found: #{0}")]
    NotFound(u64),

    #[error("Bet #{id} is not pending (currently {status})")]
    InvalidState { id: u64, status: BetStatus },

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        needed: Decimal,
        available: Decimal,
    },

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Invalid username or password")]
    AuthFailed,

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
