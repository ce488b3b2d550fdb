//! Persistence layer.
//!
//! One JSON file per user holding credentials and the full ledger,
//! replaced wholesale on every save. A failed save leaves the caller's
//! in-memory state intact so the save can be retried. Also exports the
//! bet history as CSV in the original spreadsheet column layout.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ledger::UserLedger;

/// Everything persisted for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub ledger: UserLedger,
}

fn user_path(data_dir: &Path, username: &str) -> PathBuf {
    data_dir.join(format!("{username}.json"))
}

/// Ensure the data directory exists.
pub fn init(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))
}

/// Whether a record exists on disk for this user.
pub fn user_exists(data_dir: &Path, username: &str) -> bool {
    user_path(data_dir, username).exists()
}

/// Save one user's record, replacing the whole file.
pub fn save_user(data_dir: &Path, record: &UserRecord) -> Result<()> {
    let path = user_path(data_dir, &record.username);
    let json = serde_json::to_string_pretty(record)
        .context("Failed to serialise user record")?;

    std::fs::write(&path, &json)
        .with_context(|| format!("Failed to write user record to {}", path.display()))?;

    debug!(
        user = %record.username,
        balance = %record.ledger.bankroll().balance(),
        bets = record.ledger.bets().len(),
        "User record saved"
    );
    Ok(())
}

/// Load one user's record.
/// Returns None if no file exists (unregistered user).
pub fn load_user(data_dir: &Path, username: &str) -> Result<Option<UserRecord>> {
    let path = user_path(data_dir, username);

    if !path.exists() {
        debug!(user = username, "No record on disk");
        return Ok(None);
    }

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read user record from {}", path.display()))?;

    let record: UserRecord = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse user record from {}", path.display()))?;

    info!(
        user = username,
        balance = %record.ledger.bankroll().balance(),
        bets = record.ledger.bets().len(),
        "User record loaded from disk"
    );

    Ok(Some(record))
}

/// Delete a user's record file (for testing or reset).
pub fn delete_user(data_dir: &Path, username: &str) -> Result<()> {
    let path = user_path(data_dir, username);
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to delete {}", path.display()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write the bet history to `<data_dir>/<username>_history.csv`, newest
/// date first, and return the path.
pub fn export_csv(data_dir: &Path, ledger: &UserLedger) -> Result<PathBuf> {
    let path = data_dir.join(format!("{}_history.csv", ledger.username()));
    let mut out = String::from("Date,Sport,Match,Bet Type,Stake,Odds,Result,Profit/Loss\n");

    for bet in ledger.bets().list_all() {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            bet.placed_at,
            csv_field(&bet.category),
            csv_field(&bet.description),
            csv_field(&bet.bet_kind),
            bet.stake,
            bet.odds,
            bet.status,
            bet.profit_loss,
        ));
    }

    std::fs::write(&path, &out)
        .with_context(|| format!("Failed to write CSV export to {}", path.display()))?;

    info!(user = %ledger.username(), path = %path.display(), "Bet history exported");
    Ok(path)
}

/// Quote a field when it contains a comma, quote, or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
