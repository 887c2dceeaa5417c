use chrono::{DateTime, Utc};
use serde::Serialize;

use shopgate_core::SubjectId;

use crate::{Role, TokenClaims};

/// Verified identity of the caller for the duration of one request.
///
/// Only [`crate::TokenVerifier`] implementations produce this. It is never
/// persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub subject_id: SubjectId,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this identity is the given subject.
    pub fn is(&self, subject_id: SubjectId) -> bool {
        self.subject_id == subject_id
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject_id: claims.sub,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
