//! Store error types.

use mealvault_crypto::CryptoError;
use mealvault_types::UnknownRole;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Role(#[from] UnknownRole),

    /// Pre-check failure: duplicate username, second super-admin, corrupt
    /// required column. Detected by scan, not by a storage constraint; the
    /// operation is aborted with no partial write.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("not found: {0}")]
    NotFound(String),
}
