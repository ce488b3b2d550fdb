//! Core ledger — bet records, bankroll, settlement rules, reporting.

pub mod bankroll;
pub mod bets;
pub mod reporting;
pub mod settlement;

pub use bankroll::Bankroll;
pub use bets::BetStore;
pub use settlement::UserLedger;
