//! User identity records: credentials (secret side) and profiles (public side).

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopgate_core::{Entity, Owned, SubjectId};

use crate::Role;

/// Credential as held by the credential store.
///
/// `password_hash` is a PHC string and never leaves the auth boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub subject_id: SubjectId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl core::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("subject_id", &self.subject_id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Input for creating a credential together with its profile.
#[derive(Clone)]
pub struct NewCredential {
    pub email: String,
    pub fullname: String,
    pub password_hash: String,
    pub role: Role,
}

impl core::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewCredential")
            .field("email", &self.email)
            .field("fullname", &self.fullname)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Public view of a user. Carries no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: SubjectId,
    pub fullname: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for UserProfile {
    type Id = SubjectId;

    fn id(&self) -> SubjectId {
        self.id
    }
}

/// A profile is owned by the subject it describes.
impl Owned for UserProfile {
    fn owner(&self) -> SubjectId {
        self.id
    }
}

/// Canonical form of an email used as the credential lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
