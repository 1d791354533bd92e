//! Audit entry shape and the suspicious-flag sentinels.

use serde::{Deserialize, Serialize};

/// Decrypted marker value flagging an entry as suspicious. Compared by exact
/// value after decryption.
pub const SUSPICIOUS_MARKER: &str = "Yes";
/// Decrypted marker value for ordinary activity.
pub const NORMAL_MARKER: &str = "No";

/// One decrypted audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 1-based sequence number. Rows from legacy files without a sequence
    /// column get one assigned from their file position.
    pub sequence: u64,
    /// `DD-MM-YYYY`, stored in plaintext.
    pub date: String,
    /// `HH:MM:SS`, stored in plaintext.
    pub time: String,
    pub username: String,
    pub description: String,
    pub additional_info: String,
    pub suspicious: bool,
}
