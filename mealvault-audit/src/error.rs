//! Audit log error types.

use mealvault_crypto::CryptoError;
use thiserror::Error;

/// Result type for audit log operations.
pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The sealed blob as a whole failed to open (wrong key, corruption).
    /// Unlike a single bad row, this aborts the read.
    #[error("sealed audit log unreadable: {0}")]
    SealedBlob(String),
}
