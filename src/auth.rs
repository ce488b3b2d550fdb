//! Credential handling.
//!
//! One-way hash equality only — registration stores a SHA-256 digest
//! and login recomputes and compares it. Not intended as real
//! authentication security; the ledger is single-user-per-file.

use sha2::{Digest, Sha256};

use crate::types::{LedgerError, LedgerResult};

/// Hex-encoded SHA-256 of `"{username}:{password}"`. Binding the
/// username in keeps equal passwords from hashing identically.
pub fn hash_password(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute the hash and compare against the stored one.
pub fn verify_password(stored_hash: &str, username: &str, password: &str) -> bool {
    hash_password(username, password) == stored_hash
}

/// Usernames key persistence files, so restrict them to a filename-safe
/// alphabet.
pub fn validate_username(username: &str) -> LedgerResult<()> {
    if username.is_empty() {
        return Err(LedgerError::Validation("username is empty".to_string()));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(LedgerError::Validation(format!(
            "username may only contain letters, digits, '_' and '-': {username}"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> LedgerResult<()> {
    if password.is_empty() {
        return Err(LedgerError::Validation("password is empty".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
