//! Staff account operations with audit trail.

use crate::error::{ServiceError, ServiceResult};
use mealvault_audit::{AuditEntry, AuditLog};
use mealvault_crypto::{hash_password, verify_password};
use mealvault_store::UserStore;
use mealvault_types::{validation, NewUser, Role};
use std::sync::Arc;

/// Login, account CRUD, and password management. Every call leaves an audit
/// entry; failed or rejected attempts leave a suspicious one.
pub struct AccountService {
    users: UserStore,
    audit: Arc<AuditLog>,
}

impl AccountService {
    pub fn new(users: UserStore, audit: Arc<AuditLog>) -> Self {
        Self { users, audit }
    }

    /// Seeds the single super-admin account with the given password if no
    /// super-admin exists yet.
    pub fn ensure_super_admin(&self, password: &str) -> ServiceResult<bool> {
        let hash = hash_password(password)?;
        Ok(self.users.ensure_super_admin(&hash)?)
    }

    /// Validates credentials. Returns the account id and role on success, and
    /// `None` for a wrong password or unknown username; both are recorded as
    /// suspicious activity, not surfaced as errors.
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<Option<(i64, Role)>> {
        match self.users.find_by_username_with_hash(username)? {
            Some((record, stored_hash)) => {
                if verify_password(password, &stored_hash)? {
                    self.audit.append(username, "Logged in", "", false)?;
                    Ok(Some((record.id, record.role)))
                } else {
                    self.audit
                        .log_suspicious(username, "Failed login attempt", "wrong password")?;
                    Ok(None)
                }
            }
            None => {
                self.audit
                    .log_suspicious(username, "Failed login attempt", "unknown username")?;
                Ok(None)
            }
        }
    }

    /// Creates an account: validates the username and password rules, hashes
    /// the password, and delegates the duplicate-username and single-super-
    /// admin checks to the store.
    pub fn add_user(&self, new_user: &NewUser) -> ServiceResult<i64> {
        if !validation::is_valid_username(&new_user.username) {
            return Err(ServiceError::Validation(
                "username does not meet the account rules".into(),
            ));
        }
        if !validation::is_valid_password(&new_user.password) {
            return Err(ServiceError::Validation(
                "password does not meet the complexity rules".into(),
            ));
        }

        let info = format!(
            "Role: {}, Name: {} {}",
            new_user.role, new_user.first_name, new_user.last_name
        );
        let hash = hash_password(&new_user.password)?;
        match self.users.insert(
            &new_user.username,
            &hash,
            new_user.role,
            &new_user.first_name,
            &new_user.last_name,
        ) {
            Ok(id) => {
                self.audit.append(&new_user.username, "User added", &info, false)?;
                Ok(id)
            }
            Err(e) => {
                self.audit
                    .log_suspicious(&new_user.username, "Failed to add user", &info)?;
                Err(e.into())
            }
        }
    }

    /// Renames an account and replaces its name fields.
    pub fn update_user(
        &self,
        current_username: &str,
        new_username: &str,
        first_name: &str,
        last_name: &str,
    ) -> ServiceResult<()> {
        if !validation::is_valid_username(new_username) {
            return Err(ServiceError::Validation(
                "new username does not meet the account rules".into(),
            ));
        }
        let Some(id) = self.users.resolve_id(current_username)? else {
            self.audit.log_suspicious(
                current_username,
                "Failed to update user",
                &format!("Attempted to update non-existent user {current_username}"),
            )?;
            return Err(ServiceError::NotFound(format!("user {current_username}")));
        };
        if new_username != current_username && self.users.username_exists(new_username)? {
            return Err(ServiceError::Validation(format!(
                "username {new_username} is already in use"
            )));
        }

        self.users.update_profile(id, new_username, first_name, last_name)?;
        self.audit.append(
            current_username,
            "User updated",
            &format!("Username changed to {new_username}, Name updated to {first_name} {last_name}"),
            false,
        )?;
        Ok(())
    }

    /// Deletes an account by username. Returns whether a row was removed; a
    /// miss is recorded as suspicious.
    pub fn delete_user(&self, username: &str) -> ServiceResult<bool> {
        if self.users.delete_by_username(username)? {
            self.audit.append(
                username,
                "User deleted",
                &format!("User {username} was deleted"),
                false,
            )?;
            Ok(true)
        } else {
            self.audit.log_suspicious(
                username,
                "Failed to delete user",
                &format!("Attempted to delete {username}"),
            )?;
            Ok(false)
        }
    }

    /// Administrative password reset for another account.
    pub fn reset_password(&self, username: &str, new_password: &str) -> ServiceResult<()> {
        if !validation::is_valid_password(new_password) {
            return Err(ServiceError::Validation(
                "password does not meet the complexity rules".into(),
            ));
        }
        let Some(id) = self.users.resolve_id(username)? else {
            self.audit.log_suspicious(
                username,
                "Failed to reset password",
                &format!("Attempted to reset password for non-existent user {username}"),
            )?;
            return Err(ServiceError::NotFound(format!("user {username}")));
        };
        let hash = hash_password(new_password)?;
        self.users.update_password_hash(id, &hash)?;
        self.audit.append(
            username,
            "Password reset",
            &format!("Password for {username} was reset"),
            false,
        )?;
        Ok(())
    }

    /// Password change by the logged-in account itself.
    pub fn update_own_password(&self, user_id: i64, new_password: &str) -> ServiceResult<()> {
        if !validation::is_valid_password(new_password) {
            return Err(ServiceError::Validation(
                "password does not meet the complexity rules".into(),
            ));
        }
        let Some(record) = self.users.get_by_id(user_id)? else {
            return Err(ServiceError::NotFound(format!("user id {user_id}")));
        };
        let hash = hash_password(new_password)?;
        self.users.update_password_hash(user_id, &hash)?;
        self.audit.append(
            &record.username,
            "Password updated",
            "User updated their password",
            false,
        )?;
        Ok(())
    }

    pub fn list_users(&self) -> ServiceResult<Vec<(String, Role)>> {
        Ok(self.users.list()?)
    }

    /// The unread-suspicious feed shown to admins at login.
    pub fn suspicious_activity(&self) -> ServiceResult<Vec<AuditEntry>> {
        Ok(self.audit.suspicious_entries()?)
    }
}
