//! Plaintext record shapes.

use crate::role::Role;
use serde::{Deserialize, Serialize};

/// Input shape for creating a staff account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

/// A stored staff account, decrypted. The credential hash is deliberately not
/// part of this shape; the store exposes it only on the login path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub registration_date: String,
}

/// The mutable portion of a member record: what registration collects and
/// what an update replaces wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    pub weight: f64,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// A stored member, decrypted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    pub weight: f64,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub registration_date: String,
    pub membership_id: String,
}
