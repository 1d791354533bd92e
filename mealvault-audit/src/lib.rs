//! Append-then-seal audit log.
//!
//! Every security-relevant event (logins, failures, account and member CRUD)
//! becomes one row in a raw comma-separated store whose sensitive columns are
//! individually encrypted. After each append the entire raw store is
//! re-encrypted into a single sealed blob. That sealed artifact, not the raw
//! staging file, is the authoritative source for audit review.
//!
//! Each append runs NEW → APPENDED → SEALED as one mutex-guarded critical
//! section, with sequence numbers reserved from a counter seeded once at open.
//! Readers tolerate the legacy six-column row shape (no sequence column) and
//! skip malformed or undecryptable rows; only a sealed blob that fails to open
//! as a whole is a hard error.

mod entry;
mod error;
mod log;

pub use entry::{AuditEntry, NORMAL_MARKER, SUSPICIOUS_MARKER};
pub use error::{AuditError, AuditResult};
pub use log::AuditLog;
