//! Encryption layer for MealVault.
//!
//! Provides per-field encryption using:
//! - ChaCha20-Poly1305 for authenticated encryption
//! - Argon2id for credential hashing
//! - A file-backed master key with zeroization
//!
//! # Architecture
//!
//! A single symmetric master key protects every stored attribute. The key is
//! generated once, persisted to a fixed-path key file, and loaded into a
//! [`FieldCipher`] at startup. The cipher context is passed by handle to every
//! component that needs it; there is no process-global key state, and the key
//! file is read exactly once per process.
//!
//! Each encrypted field is an independent token: a fresh random nonce plus the
//! Poly1305-authenticated ciphertext, base64-encoded for storage in ordinary
//! text columns. Identical plaintexts therefore produce different tokens on
//! every call, which is why stored ciphertext can never be indexed or compared
//! for equality. Lookups decrypt and compare instead.

mod cipher;
mod error;
mod key;
mod password;

pub use cipher::{FieldCipher, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{KeyFile, MasterKey, KEY_SIZE};
pub use password::{hash_password, verify_password};
