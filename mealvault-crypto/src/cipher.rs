//! The per-field symmetric cipher context.

use crate::error::{CryptoError, CryptoResult};
use crate::key::MasterKey;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

/// ChaCha20-Poly1305 nonce size in bytes.
pub const NONCE_SIZE: usize = 12;
/// Poly1305 authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Cipher context built once at startup from the loaded master key and shared
/// by handle with every component that stores or reads encrypted fields.
///
/// Tokens are non-deterministic: each call draws a fresh nonce, so encrypting
/// the same plaintext twice yields different tokens that both decrypt back.
pub struct FieldCipher {
    cipher: ChaCha20Poly1305,
}

impl FieldCipher {
    pub fn new(key: &MasterKey) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key.as_bytes())),
        }
    }

    /// Encrypts one field value into a base64 token (nonce ‖ ciphertext+tag).
    pub fn encrypt_field(&self, plaintext: &str) -> CryptoResult<String> {
        let blob = self.seal_bytes(plaintext.as_bytes())?;
        Ok(STANDARD.encode(blob))
    }

    /// Decrypts a token produced by [`encrypt_field`](Self::encrypt_field).
    ///
    /// Fails with [`CryptoError::Decryption`] on malformed base64, a token
    /// produced under a different key, or any tampering. Never silently
    /// returns wrong plaintext.
    pub fn decrypt_field(&self, token: &str) -> CryptoResult<String> {
        let blob = STANDARD
            .decode(token)
            .map_err(|e| CryptoError::Decryption(format!("malformed token: {e}")))?;
        let plaintext = self.open_bytes(&blob)?;
        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::Decryption("decrypted field is not valid UTF-8".into()))
    }

    /// Encrypts an opaque byte blob (nonce ‖ ciphertext+tag, no encoding).
    /// Used for sealing whole files rather than individual fields.
    pub fn seal_bytes(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, data)
            .map_err(|e| CryptoError::Encryption(format!("seal failed: {e}")))?;
        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypts a blob produced by [`seal_bytes`](Self::seal_bytes).
    pub fn open_bytes(&self, blob: &[u8]) -> CryptoResult<Vec<u8>> {
        if blob.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("ciphertext too short".into()));
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decryption("wrong key or tampered data".into()))
    }
}
