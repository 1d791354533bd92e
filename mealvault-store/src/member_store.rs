//! Member record store with encrypted-field lookup and search.

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use duckdb::params;
use mealvault_crypto::{CryptoResult, FieldCipher};
use mealvault_types::{timestamp, MemberProfile, MemberRecord};
use std::sync::Arc;
use tracing::warn;

struct MemberRow {
    id: i64,
    first_name: String,
    last_name: String,
    age: String,
    gender: String,
    weight: String,
    address: String,
    email: String,
    phone: String,
    registration_date: String,
    membership_id: String,
}

/// Store for member records. Every PII column is an independent ciphertext
/// token; lookups by membership ID and name search decrypt row by row.
#[derive(Clone)]
pub struct MemberStore {
    db: Database,
    cipher: Arc<FieldCipher>,
}

impl MemberStore {
    pub fn new(db: Database, cipher: Arc<FieldCipher>) -> Self {
        Self { db, cipher }
    }

    /// Inserts a member, encrypting every profile field. Age and weight are
    /// stringified before encryption, matching how they round-trip on read.
    pub fn insert(&self, profile: &MemberProfile, membership_id: &str) -> StoreResult<i64> {
        let enc = self.encrypt_profile(profile)?;
        let enc_membership = self.cipher.encrypt_field(membership_id)?;

        let conn = self.db.conn();
        let id: i64 = conn.query_row("SELECT nextval('members_id_seq')", [], |row| row.get(0))?;
        conn.execute(
            "INSERT INTO members (id, first_name, last_name, age, gender, weight, address, email, phone, registration_date, membership_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                enc[0], enc[1], enc[2], enc[3], enc[4], enc[5], enc[6], enc[7],
                timestamp::registration_now(),
                enc_membership,
            ],
        )?;
        Ok(id)
    }

    /// Locates the member whose decrypted membership ID equals the target.
    /// First match wins; undecryptable rows are skipped.
    pub fn find_by_membership_id(&self, membership_id: &str) -> StoreResult<Option<MemberRecord>> {
        for raw in self.fetch_all()? {
            match self.cipher.decrypt_field(&raw.membership_id) {
                Ok(id) if id == membership_id => {
                    // Required single-record read: failures are errors here.
                    return Ok(Some(self.decrypt_row(raw)?));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(member_id = raw.id, error = %e, "undecryptable membership id, skipping row");
                }
            }
        }
        Ok(None)
    }

    /// Resolves a membership ID to its row ID via the linear scan.
    pub fn resolve_id(&self, membership_id: &str) -> StoreResult<Option<i64>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT id, membership_id FROM members ORDER BY id")?;
        let rows: Vec<(i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);
        drop(conn);

        for (id, token) in rows {
            match self.cipher.decrypt_field(&token) {
                Ok(candidate) if candidate == membership_id => return Ok(Some(id)),
                Ok(_) => {}
                Err(e) => {
                    warn!(member_id = id, error = %e, "undecryptable membership id, skipping row");
                }
            }
        }
        Ok(None)
    }

    /// Decrypts every member and returns those matching the term:
    /// case-insensitive substring on first or last name, or exact membership
    /// ID. Rows failing any field decryption are skipped with a diagnostic.
    pub fn search(&self, term: &str) -> StoreResult<Vec<MemberRecord>> {
        let needle = term.to_lowercase();
        let mut found = Vec::new();
        for raw in self.fetch_all()? {
            let id = raw.id;
            let record = match self.decrypt_row(raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(member_id = id, error = %e, "undecryptable member row, skipping");
                    continue;
                }
            };
            if record.first_name.to_lowercase().contains(&needle)
                || record.last_name.to_lowercase().contains(&needle)
                || record.membership_id == term
            {
                found.push(record);
            }
        }
        Ok(found)
    }

    /// Replaces the mutable profile fields, re-encrypting each. Membership ID
    /// and registration date are immutable.
    pub fn update(&self, id: i64, profile: &MemberProfile) -> StoreResult<()> {
        let enc = self.encrypt_profile(profile)?;
        let conn = self.db.conn();
        let changed = conn.execute(
            "UPDATE members SET first_name = ?, last_name = ?, age = ?, gender = ?, weight = ?, address = ?, email = ?, phone = ? \
             WHERE id = ?",
            params![enc[0], enc[1], enc[2], enc[3], enc[4], enc[5], enc[6], enc[7], id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("member id {id}")));
        }
        Ok(())
    }

    /// Resolves the membership ID by scan, then deletes the matching row.
    pub fn delete_by_membership_id(&self, membership_id: &str) -> StoreResult<bool> {
        match self.resolve_id(membership_id)? {
            Some(id) => {
                let conn = self.db.conn();
                let removed = conn.execute("DELETE FROM members WHERE id = ?", params![id])?;
                Ok(removed > 0)
            }
            None => Ok(false),
        }
    }

    pub fn count(&self) -> StoreResult<usize> {
        let conn = self.db.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Key rotation: decrypts every encrypted column with `old` and rewrites
    /// it under this store's cipher. Rows `old` cannot decrypt are left
    /// untouched with a diagnostic. Returns the number of rotated rows.
    pub fn re_encrypt_from(&self, old: &FieldCipher) -> StoreResult<usize> {
        let rows = self.fetch_all()?;
        let mut rotated = 0usize;
        for raw in rows {
            let tokens = [
                &raw.first_name,
                &raw.last_name,
                &raw.age,
                &raw.gender,
                &raw.weight,
                &raw.address,
                &raw.email,
                &raw.phone,
                &raw.membership_id,
            ];
            let reencrypted: CryptoResult<Vec<String>> = tokens
                .iter()
                .map(|token| {
                    let plain = old.decrypt_field(token)?;
                    self.cipher.encrypt_field(&plain)
                })
                .collect();
            let enc = match reencrypted {
                Ok(enc) => enc,
                Err(e) => {
                    warn!(member_id = raw.id, error = %e, "row not rotatable, left as-is");
                    continue;
                }
            };

            let conn = self.db.conn();
            conn.execute(
                "UPDATE members SET first_name = ?, last_name = ?, age = ?, gender = ?, weight = ?, address = ?, email = ?, phone = ?, membership_id = ? \
                 WHERE id = ?",
                params![enc[0], enc[1], enc[2], enc[3], enc[4], enc[5], enc[6], enc[7], enc[8], raw.id],
            )?;
            rotated += 1;
        }
        Ok(rotated)
    }

    fn encrypt_profile(&self, profile: &MemberProfile) -> CryptoResult<[String; 8]> {
        Ok([
            self.cipher.encrypt_field(&profile.first_name)?,
            self.cipher.encrypt_field(&profile.last_name)?,
            self.cipher.encrypt_field(&profile.age.to_string())?,
            self.cipher.encrypt_field(&profile.gender)?,
            self.cipher.encrypt_field(&profile.weight.to_string())?,
            self.cipher.encrypt_field(&profile.address)?,
            self.cipher.encrypt_field(&profile.email)?,
            self.cipher.encrypt_field(&profile.phone)?,
        ])
    }

    fn decrypt_row(&self, raw: MemberRow) -> StoreResult<MemberRecord> {
        let age_str = self.cipher.decrypt_field(&raw.age)?;
        let age = age_str.parse::<u32>().map_err(|_| {
            StoreError::Integrity(format!("member row {} has a non-numeric age", raw.id))
        })?;
        let weight_str = self.cipher.decrypt_field(&raw.weight)?;
        let weight = weight_str.parse::<f64>().map_err(|_| {
            StoreError::Integrity(format!("member row {} has a non-numeric weight", raw.id))
        })?;
        Ok(MemberRecord {
            id: raw.id,
            first_name: self.cipher.decrypt_field(&raw.first_name)?,
            last_name: self.cipher.decrypt_field(&raw.last_name)?,
            age,
            gender: self.cipher.decrypt_field(&raw.gender)?,
            weight,
            address: self.cipher.decrypt_field(&raw.address)?,
            email: self.cipher.decrypt_field(&raw.email)?,
            phone: self.cipher.decrypt_field(&raw.phone)?,
            registration_date: raw.registration_date,
            membership_id: self.cipher.decrypt_field(&raw.membership_id)?,
        })
    }

    fn fetch_all(&self) -> StoreResult<Vec<MemberRow>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, age, gender, weight, address, email, phone, registration_date, membership_id \
             FROM members ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MemberRow {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    age: row.get(3)?,
                    gender: row.get(4)?,
                    weight: row.get(5)?,
                    address: row.get(6)?,
                    email: row.get(7)?,
                    phone: row.get(8)?,
                    registration_date: row.get(9)?,
                    membership_id: row.get(10)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}
