//! DuckDB storage layer for MealVault.
//!
//! Persists staff accounts and member records with every personally
//! identifiable column stored as an independent ciphertext token.
//!
//! # Architecture
//!
//! - One [`Database`] handle wraps the connection; [`UserStore`] and
//!   [`MemberStore`] share it together with the field cipher.
//! - Ciphertext is non-deterministic, so unique columns (username, membership
//!   ID) cannot be indexed or compared in SQL. Every identity operation
//!   fetches the candidate rows, decrypts the designated column in Rust, and
//!   compares plaintext: O(n) decrypts per lookup, first match wins.
//! - A row that fails to decrypt during a scan is logged and skipped, never a
//!   lookup failure.
//! - Schema is created idempotently on open; row IDs come from sequences.

mod db;
mod error;
mod member_store;
mod user_store;

pub use db::{open_duckdb_with_wal_recovery, Database};
pub use error::{StoreError, StoreResult};
pub use member_store::MemberStore;
pub use user_store::UserStore;
