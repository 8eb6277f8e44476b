// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password derivation with salted Argon2id.
//!
//! Stored hashes are PHC strings (`$argon2id$v=19$...`) that embed their own
//! salt and parameters, so verification re-runs the derivation from the
//! stored hash rather than comparing against a freshly salted one.

use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Password derivation failure.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("stored password hash is invalid: {0}")]
    InvalidHash(String),
}

/// Derive a salted Argon2id hash for `password`.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Check `password` against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the stored hash
/// itself cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash of a throwaway password, derived on first use.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("decoy-password-never-assigned").ok());

/// Run a full verification against the decoy hash and report failure.
///
/// Callers with no stored hash to check use this so a miss costs the same
/// derivation as a wrong password.
pub fn verify_decoy(password: &str) -> bool {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
