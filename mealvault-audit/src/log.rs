//! The audit log itself: raw append store plus sealed blob.

use crate::entry::{AuditEntry, NORMAL_MARKER, SUSPICIOUS_MARKER};
use crate::error::{AuditError, AuditResult};
use mealvault_crypto::FieldCipher;
use mealvault_types::timestamp;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

struct Inner {
    raw_path: PathBuf,
    sealed_path: PathBuf,
    next_sequence: u64,
}

/// Append-only audit log with whole-file sealing.
///
/// Raw row shape: `seq,date,time,enc_user,enc_desc,enc_info,enc_suspicious`.
/// The base64 field tokens contain no commas, so the row splits naively.
pub struct AuditLog {
    cipher: Arc<FieldCipher>,
    inner: Mutex<Inner>,
}

impl AuditLog {
    /// Opens (or starts) an audit log. Counts existing raw rows once to seed
    /// the sequence counter.
    pub fn open(
        raw_path: impl Into<PathBuf>,
        sealed_path: impl Into<PathBuf>,
        cipher: Arc<FieldCipher>,
    ) -> AuditResult<Self> {
        let raw_path = raw_path.into();
        let existing = if raw_path.exists() {
            fs::read_to_string(&raw_path)?
                .lines()
                .filter(|line| !line.trim().is_empty())
                .count() as u64
        } else {
            0
        };
        Ok(Self {
            cipher,
            inner: Mutex::new(Inner {
                raw_path,
                sealed_path: sealed_path.into(),
                next_sequence: existing + 1,
            }),
        })
    }

    /// Records one event: encrypts the text columns, appends the row to the
    /// raw store, then reseals the entire raw store into the sealed blob.
    /// Returns the sequence number the entry was assigned.
    pub fn append(
        &self,
        username: &str,
        description: &str,
        additional_info: &str,
        suspicious: bool,
    ) -> AuditResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let sequence = inner.next_sequence;
        let marker = if suspicious { SUSPICIOUS_MARKER } else { NORMAL_MARKER };

        let row = [
            sequence.to_string(),
            timestamp::log_date_now(),
            timestamp::log_time_now(),
            self.cipher.encrypt_field(username)?,
            self.cipher.encrypt_field(description)?,
            self.cipher.encrypt_field(additional_info)?,
            self.cipher.encrypt_field(marker)?,
        ]
        .join(",");

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&inner.raw_path)?;
        writeln!(file, "{row}")?;
        inner.next_sequence += 1;

        let raw = fs::read(&inner.raw_path)?;
        let sealed = self.cipher.seal_bytes(&raw)?;
        fs::write(&inner.sealed_path, sealed)?;

        Ok(sequence)
    }

    /// Records a suspicious event.
    pub fn log_suspicious(
        &self,
        username: &str,
        description: &str,
        additional_info: &str,
    ) -> AuditResult<u64> {
        self.append(username, description, additional_info, true)
    }

    /// Decrypts the sealed blob and returns every readable entry in insertion
    /// order, newest last.
    ///
    /// Rows with an unexpected column count or an undecryptable field are
    /// skipped with a diagnostic. A sealed blob that fails to open as a whole
    /// surfaces as [`AuditError::SealedBlob`].
    pub fn read_all(&self) -> AuditResult<Vec<AuditEntry>> {
        let inner = self.inner.lock().unwrap();
        if !inner.sealed_path.exists() {
            return Ok(Vec::new());
        }
        let blob = fs::read(&inner.sealed_path)?;
        let raw = self
            .cipher
            .open_bytes(&blob)
            .map_err(|e| AuditError::SealedBlob(e.to_string()))?;
        let text = String::from_utf8(raw)
            .map_err(|_| AuditError::SealedBlob("sealed log is not valid UTF-8".into()))?;

        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split(',').collect();
            let (sequence, fields) = match cols.len() {
                7 => match cols[0].parse::<u64>() {
                    Ok(seq) => (seq, &cols[1..]),
                    Err(_) => {
                        warn!(row = idx + 1, "audit row has a non-numeric sequence, skipping");
                        continue;
                    }
                },
                // Legacy shape without a sequence column: assign from position.
                6 => ((idx + 1) as u64, &cols[..]),
                n => {
                    warn!(row = idx + 1, columns = n, "unexpected audit row length, skipping");
                    continue;
                }
            };
            match self.decrypt_row(sequence, fields) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(row = idx + 1, error = %e, "undecryptable audit row, skipping"),
            }
        }
        Ok(entries)
    }

    /// Entries whose decrypted marker equals the suspicious sentinel exactly.
    pub fn suspicious_entries(&self) -> AuditResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|entry| entry.suspicious)
            .collect())
    }

    /// Number of entries recorded so far (the last sequence handed out).
    pub fn count(&self) -> u64 {
        self.inner.lock().unwrap().next_sequence - 1
    }

    /// Key rotation: re-encrypts every field token from `old` to this log's
    /// cipher and reseals. Rows the old cipher cannot decrypt are left
    /// untouched with a diagnostic. Returns the number of rotated rows.
    pub fn re_encrypt_from(&self, old: &FieldCipher) -> AuditResult<usize> {
        let inner = self.inner.lock().unwrap();
        if !inner.raw_path.exists() {
            return Ok(0);
        }
        let text = fs::read_to_string(&inner.raw_path)?;

        let mut rows = Vec::new();
        let mut rotated = 0usize;
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split(',').collect();
            let token_range = match cols.len() {
                7 => 3..7,
                6 => 2..6,
                n => {
                    warn!(row = idx + 1, columns = n, "unexpected audit row length, left as-is");
                    rows.push(line.to_string());
                    continue;
                }
            };

            let mut out: Vec<String> = cols.iter().map(|c| (*c).to_string()).collect();
            let mut ok = true;
            for i in token_range {
                match old
                    .decrypt_field(cols[i])
                    .and_then(|plain| self.cipher.encrypt_field(&plain))
                {
                    Ok(token) => out[i] = token,
                    Err(e) => {
                        warn!(row = idx + 1, error = %e, "audit row not rotatable, left as-is");
                        ok = false;
                        break;
                    }
                }
            }
            if ok {
                rotated += 1;
                rows.push(out.join(","));
            } else {
                rows.push(line.to_string());
            }
        }

        let mut contents = rows.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(&inner.raw_path, &contents)?;
        fs::write(&inner.sealed_path, self.cipher.seal_bytes(contents.as_bytes())?)?;
        Ok(rotated)
    }

    fn decrypt_row(&self, sequence: u64, fields: &[&str]) -> AuditResult<AuditEntry> {
        let marker = self.cipher.decrypt_field(fields[5])?;
        Ok(AuditEntry {
            sequence,
            date: fields[0].to_string(),
            time: fields[1].to_string(),
            username: self.cipher.decrypt_field(fields[2])?,
            description: self.cipher.decrypt_field(fields[3])?,
            additional_info: self.cipher.decrypt_field(fields[4])?,
            suspicious: marker == SUSPICIOUS_MARKER,
        })
    }
}
