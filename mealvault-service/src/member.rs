//! Member registration and management with audit trail.

use crate::error::{ServiceError, ServiceResult};
use mealvault_audit::AuditLog;
use mealvault_store::MemberStore;
use mealvault_types::{validation, MemberProfile, MemberRecord, MembershipId};
use std::sync::Arc;

/// Member CRUD. Audit entries are keyed by membership ID, the way the rest of
/// the system refers to members.
pub struct MemberService {
    members: MemberStore,
    audit: Arc<AuditLog>,
}

impl MemberService {
    pub fn new(members: MemberStore, audit: Arc<AuditLog>) -> Self {
        Self { members, audit }
    }

    /// Registers a member: validates contact fields, generates a checksummed
    /// membership ID, and stores the encrypted record. Returns the row id and
    /// the generated membership ID.
    pub fn register(&self, profile: &MemberProfile) -> ServiceResult<(i64, String)> {
        validate_contact(profile)?;

        let membership = MembershipId::generate_now().into_string();
        let info = format!("Name: {} {}", profile.first_name, profile.last_name);
        match self.members.insert(profile, &membership) {
            Ok(id) => {
                self.audit.append(&membership, "Member added", &info, false)?;
                Ok((id, membership))
            }
            Err(e) => {
                self.audit
                    .log_suspicious(&membership, "Failed to add member", &info)?;
                Err(e.into())
            }
        }
    }

    /// Case-insensitive name search, or exact membership-ID match.
    pub fn search(&self, term: &str) -> ServiceResult<Vec<MemberRecord>> {
        Ok(self.members.search(term)?)
    }

    pub fn find(&self, membership_id: &str) -> ServiceResult<Option<MemberRecord>> {
        Ok(self.members.find_by_membership_id(membership_id)?)
    }

    /// Replaces a member's profile, resolved by membership ID.
    pub fn update(&self, membership_id: &str, profile: &MemberProfile) -> ServiceResult<()> {
        validate_contact(profile)?;

        let Some(id) = self.members.resolve_id(membership_id)? else {
            self.audit.log_suspicious(
                membership_id,
                "Failed to update member",
                &format!("Attempted to update non-existent member {membership_id}"),
            )?;
            return Err(ServiceError::NotFound(format!("member {membership_id}")));
        };
        self.members.update(id, profile)?;
        self.audit.append(
            membership_id,
            "Member updated",
            &format!("Name: {} {}", profile.first_name, profile.last_name),
            false,
        )?;
        Ok(())
    }

    /// Removes a member by membership ID. Returns whether a row was removed;
    /// a miss is recorded as suspicious.
    pub fn remove(&self, membership_id: &str) -> ServiceResult<bool> {
        if self.members.delete_by_membership_id(membership_id)? {
            self.audit.append(
                membership_id,
                "Member deleted",
                &format!("Member {membership_id} was deleted"),
                false,
            )?;
            Ok(true)
        } else {
            self.audit.log_suspicious(
                membership_id,
                "Failed to delete member",
                &format!("Attempted to delete {membership_id}"),
            )?;
            Ok(false)
        }
    }
}

fn validate_contact(profile: &MemberProfile) -> ServiceResult<()> {
    if !validation::is_valid_email(&profile.email) {
        return Err(ServiceError::Validation(format!(
            "invalid email address: {}",
            profile.email
        )));
    }
    if !validation::is_valid_phone(&profile.phone) {
        return Err(ServiceError::Validation(format!(
            "invalid phone number: {}",
            profile.phone
        )));
    }
    Ok(())
}
