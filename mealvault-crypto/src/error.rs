//! Crypto error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from the encryption layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The key file is absent. Fatal at startup: no cipher can be built.
    #[error("key file not found at {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("key file {} unusable: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Malformed token, wrong key, or tampered ciphertext. Recoverable
    /// per-record in bulk scans; fatal for a required single-record read.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}
