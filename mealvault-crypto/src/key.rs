//! Master key material and the file-backed key store.

use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key size in bytes (ChaCha20-Poly1305).
pub const KEY_SIZE: usize = 32;

/// The process-wide symmetric master key.
///
/// Zeroized on drop. One key must be used for the entire lifetime of the
/// stored data: rotating the key without re-encrypting existing ciphertext
/// permanently orphans it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MasterKey").field(&"[REDACTED]").finish()
    }
}

impl MasterKey {
    /// Generates a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Handle on the fixed-path key file.
///
/// The key is stored base64-encoded. `ensure` must run once before any cipher
/// is constructed; a missing key at `load` time is a fatal startup error.
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generates and persists a key if the file is absent; no-op otherwise.
    /// Returns whether a new key was written.
    pub fn ensure(&self) -> CryptoResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| CryptoError::KeyFile {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let key = MasterKey::generate();
        fs::write(&self.path, STANDARD.encode(key.as_bytes())).map_err(|source| {
            CryptoError::KeyFile {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(true)
    }

    /// Reads and decodes the persisted key.
    pub fn load(&self) -> CryptoResult<MasterKey> {
        if !self.path.exists() {
            return Err(CryptoError::KeyNotFound(self.path.clone()));
        }
        let encoded = fs::read_to_string(&self.path).map_err(|source| CryptoError::KeyFile {
            path: self.path.clone(),
            source,
        })?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Decryption(format!("key file is not valid base64: {e}")))?;
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&bytes);
        Ok(MasterKey::from_bytes(key))
    }
}
