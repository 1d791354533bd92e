//! Staff account store with encrypted-field lookup.

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use duckdb::params;
use mealvault_crypto::FieldCipher;
use mealvault_types::{timestamp, Role, UserRecord};
use std::sync::Arc;
use tracing::warn;

struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    first_name: String,
    last_name: String,
    registration_date: String,
}

/// Store for staff accounts (`super_admin` / `system_admin` / `consultant`).
///
/// The username column holds non-deterministic ciphertext, so every lookup by
/// username is a linear decrypt-and-compare scan over all rows.
#[derive(Clone)]
pub struct UserStore {
    db: Database,
    cipher: Arc<FieldCipher>,
}

impl UserStore {
    pub fn new(db: Database, cipher: Arc<FieldCipher>) -> Self {
        Self { db, cipher }
    }

    /// Inserts a new account after the two integrity pre-checks: the username
    /// must not already decrypt from any stored row, and only one super-admin
    /// may ever exist. Nothing is written when a pre-check fails.
    pub fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<i64> {
        if self.username_exists(username)? {
            return Err(StoreError::Integrity(format!(
                "username {username} is already in use"
            )));
        }
        if role == Role::SuperAdmin && self.count_role(Role::SuperAdmin)? > 0 {
            return Err(StoreError::Integrity(
                "a super_admin account already exists".into(),
            ));
        }
        self.insert_unchecked(username, password_hash, role, first_name, last_name)
    }

    /// Seeds the single super-admin account if no row with that role exists.
    /// Returns whether seeding happened.
    pub fn ensure_super_admin(&self, password_hash: &str) -> StoreResult<bool> {
        if self.count_role(Role::SuperAdmin)? > 0 {
            return Ok(false);
        }
        self.insert_unchecked("super_admin", password_hash, Role::SuperAdmin, "Super", "Admin")?;
        Ok(true)
    }

    fn insert_unchecked(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<i64> {
        let enc_username = self.cipher.encrypt_field(username)?;
        let enc_first = self.cipher.encrypt_field(first_name)?;
        let enc_last = self.cipher.encrypt_field(last_name)?;

        let conn = self.db.conn();
        let id: i64 = conn.query_row("SELECT nextval('users_id_seq')", [], |row| row.get(0))?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, role, first_name, last_name, registration_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                enc_username,
                password_hash,
                role.as_str(),
                enc_first,
                enc_last,
                timestamp::registration_now(),
            ],
        )?;
        Ok(id)
    }

    /// Locates the account whose decrypted username equals `username`.
    /// First match wins; rows that fail to decrypt are skipped.
    pub fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .find_by_username_with_hash(username)?
            .map(|(record, _)| record))
    }

    /// Login-path variant that also returns the stored credential hash.
    pub fn find_by_username_with_hash(
        &self,
        username: &str,
    ) -> StoreResult<Option<(UserRecord, String)>> {
        for raw in self.fetch_all()? {
            match self.cipher.decrypt_field(&raw.username) {
                Ok(name) if name == username => {
                    // The matched row is a required read: a decrypt failure
                    // here is an error, not a skip.
                    let record = UserRecord {
                        id: raw.id,
                        username: name,
                        role: raw.role.parse()?,
                        first_name: self.cipher.decrypt_field(&raw.first_name)?,
                        last_name: self.cipher.decrypt_field(&raw.last_name)?,
                        registration_date: raw.registration_date,
                    };
                    return Ok(Some((record, raw.password_hash)));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(user_id = raw.id, error = %e, "undecryptable username, skipping row");
                }
            }
        }
        Ok(None)
    }

    pub fn username_exists(&self, username: &str) -> StoreResult<bool> {
        Ok(self.resolve_id(username)?.is_some())
    }

    /// Resolves a plaintext username to its row ID via the linear scan.
    pub fn resolve_id(&self, username: &str) -> StoreResult<Option<i64>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT id, username FROM users ORDER BY id")?;
        let rows: Vec<(i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);
        drop(conn);

        for (id, token) in rows {
            match self.cipher.decrypt_field(&token) {
                Ok(name) if name == username => return Ok(Some(id)),
                Ok(_) => {}
                Err(e) => warn!(user_id = id, error = %e, "undecryptable username, skipping row"),
            }
        }
        Ok(None)
    }

    pub fn get_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        let conn = self.db.conn();
        let result = conn.query_row(
            "SELECT id, username, password_hash, role, first_name, last_name, registration_date \
             FROM users WHERE id = ?",
            params![id],
            row_to_user,
        );
        match result {
            Ok(raw) => {
                drop(conn);
                Ok(Some(UserRecord {
                    id: raw.id,
                    username: self.cipher.decrypt_field(&raw.username)?,
                    role: raw.role.parse()?,
                    first_name: self.cipher.decrypt_field(&raw.first_name)?,
                    last_name: self.cipher.decrypt_field(&raw.last_name)?,
                    registration_date: raw.registration_date,
                }))
            }
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All accounts as `(username, role)` pairs, in storage order. Rows whose
    /// username cannot be decrypted or whose role string is unknown are
    /// skipped with a diagnostic.
    pub fn list(&self) -> StoreResult<Vec<(String, Role)>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT id, username, role FROM users ORDER BY id")?;
        let rows: Vec<(i64, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);
        drop(conn);

        let mut listed = Vec::with_capacity(rows.len());
        for (id, token, role_str) in rows {
            let name = match self.cipher.decrypt_field(&token) {
                Ok(name) => name,
                Err(e) => {
                    warn!(user_id = id, error = %e, "undecryptable username, skipping row");
                    continue;
                }
            };
            match role_str.parse::<Role>() {
                Ok(role) => listed.push((name, role)),
                Err(e) => warn!(user_id = id, error = %e, "unknown role, skipping row"),
            }
        }
        Ok(listed)
    }

    pub fn count_role(&self, role: Role) -> StoreResult<usize> {
        let conn = self.db.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?",
            params![role.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Replaces username and name fields, re-encrypting all three.
    pub fn update_profile(
        &self,
        id: i64,
        new_username: &str,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<()> {
        let enc_username = self.cipher.encrypt_field(new_username)?;
        let enc_first = self.cipher.encrypt_field(first_name)?;
        let enc_last = self.cipher.encrypt_field(last_name)?;

        let conn = self.db.conn();
        let changed = conn.execute(
            "UPDATE users SET username = ?, first_name = ?, last_name = ? WHERE id = ?",
            params![enc_username, enc_first, enc_last, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("user id {id}")));
        }
        Ok(())
    }

    pub fn update_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<()> {
        let conn = self.db.conn();
        let changed = conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            params![password_hash, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("user id {id}")));
        }
        Ok(())
    }

    /// Deletes by row ID. Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> StoreResult<bool> {
        let conn = self.db.conn();
        let removed = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        Ok(removed > 0)
    }

    /// Resolves the username by scan, then deletes the matching row.
    pub fn delete_by_username(&self, username: &str) -> StoreResult<bool> {
        match self.resolve_id(username)? {
            Some(id) => self.delete(id),
            None => Ok(false),
        }
    }

    /// Key rotation: decrypts every encrypted column with `old` and rewrites
    /// it under this store's cipher. Rows `old` cannot decrypt are left
    /// untouched with a diagnostic. Returns the number of rotated rows.
    pub fn re_encrypt_from(&self, old: &FieldCipher) -> StoreResult<usize> {
        let rows = self.fetch_all()?;
        let mut rotated = 0usize;
        for raw in rows {
            let decrypted = old.decrypt_field(&raw.username).and_then(|username| {
                let first = old.decrypt_field(&raw.first_name)?;
                let last = old.decrypt_field(&raw.last_name)?;
                Ok((username, first, last))
            });
            let (username, first, last) = match decrypted {
                Ok(fields) => fields,
                Err(e) => {
                    warn!(user_id = raw.id, error = %e, "row not rotatable, left as-is");
                    continue;
                }
            };
            let enc_username = self.cipher.encrypt_field(&username)?;
            let enc_first = self.cipher.encrypt_field(&first)?;
            let enc_last = self.cipher.encrypt_field(&last)?;

            let conn = self.db.conn();
            conn.execute(
                "UPDATE users SET username = ?, first_name = ?, last_name = ? WHERE id = ?",
                params![enc_username, enc_first, enc_last, raw.id],
            )?;
            rotated += 1;
        }
        Ok(rotated)
    }

    fn fetch_all(&self) -> StoreResult<Vec<UserRow>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, role, first_name, last_name, registration_date \
             FROM users ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], row_to_user)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}

fn row_to_user(row: &duckdb::Row<'_>) -> duckdb::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        registration_date: row.get(6)?,
    })
}
