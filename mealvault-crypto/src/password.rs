//! Credential hashing.
//!
//! Argon2id with a per-hash random salt, stored as a PHC string. This
//! intentionally replaces the unsalted digest scheme the data model grew up
//! with; stored credentials are verified with [`verify_password`], not by
//! comparing digests for equality.

use crate::error::{CryptoError, CryptoResult};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hashes a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> CryptoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch; errors only when the stored hash itself
/// is malformed.
pub fn verify_password(password: &str, stored: &str) -> CryptoResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| CryptoError::PasswordHash(format!("invalid stored hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
