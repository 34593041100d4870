//! Password hashing with bcrypt.
//!
//! These calls are CPU-bound (~200ms at cost 12). Async callers run them on
//! the blocking pool via `tokio::task::spawn_blocking`.

use thiserror::Error;

/// Minimum accepted bcrypt cost.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default bcrypt cost.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Well-formed cost-12 hash that no real password produces. Verifying against
/// it keeps the unknown-user login path as slow as the wrong-password path.
const DUMMY_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid bcrypt cost: {0} (must be {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST})")]
    InvalidCost(u32),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Hash `plaintext` with a fresh salt.
///
/// # Errors
///
/// Returns `PasswordError::InvalidCost` if `cost` is outside 10-14, or
/// `PasswordError::Hash` if bcrypt fails.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(PasswordError::InvalidCost(cost));
    }

    bcrypt::hash(plaintext, cost).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check `plaintext` against a stored hash.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if the stored hash is not valid bcrypt.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(plaintext, hash).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Spend the same work as a real verification and discard the outcome.
pub fn verify_against_dummy(plaintext: &str) {
    let _ = bcrypt::verify(plaintext, DUMMY_HASH);
}
