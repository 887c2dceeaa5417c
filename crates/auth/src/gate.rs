//! Protected Operation Gate.
//!
//! Composes token verification with an access policy and runs the wrapped
//! operation only after an `Allow` decision:
//!
//! ```text
//! no token        -> TokenMissing
//! verify fails    -> TokenInvalidOrExpired
//! policy denies   -> Forbidden
//! policy allows   -> operation runs once, its output is returned as-is
//! ```

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Decision, Identity, Policy, TokenError, TokenVerifier, decide};

/// Rejection outcome of the gate. The wrapped operation never ran.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("access token not found")]
    TokenMissing,

    #[error("access token is invalid or expired")]
    TokenInvalidOrExpired,

    #[error("you are not authorized to perform this action")]
    Forbidden,
}

#[derive(Clone)]
pub struct Gate {
    verifier: Arc<dyn TokenVerifier>,
}

impl Gate {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    pub fn authenticate(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, AccessError> {
        self.verifier
            .verify_presented(token, now)
            .map_err(|e| match e {
                TokenError::Missing => AccessError::TokenMissing,
                TokenError::Invalid(reason) => {
                    tracing::debug!(%reason, "access token rejected");
                    AccessError::TokenInvalidOrExpired
                }
            })
    }

    pub fn authorize(&self, identity: &Identity, policy: &Policy) -> Result<(), AccessError> {
        match decide(identity, policy) {
            Decision::Allow => Ok(()),
            Decision::Deny(kind) => {
                tracing::debug!(
                    subject_id = %identity.subject_id,
                    %policy,
                    reason = ?kind,
                    "access denied"
                );
                Err(AccessError::Forbidden)
            }
        }
    }

    /// Authenticate and authorize without running anything.
    pub fn check(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
        policy: &Policy,
    ) -> Result<Identity, AccessError> {
        let identity = self.authenticate(token, now)?;
        self.authorize(&identity, policy)?;
        Ok(identity)
    }

    /// Run `op` with the verified identity iff `policy` allows it.
    pub async fn run<F, Fut>(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
        policy: Policy,
        op: F,
    ) -> Result<Fut::Output, AccessError>
    where
        F: FnOnce(Identity) -> Fut,
        Fut: Future,
    {
        let identity = self.check(token, now, &policy)?;
        Ok(op(identity).await)
    }
}

impl core::fmt::Debug for Gate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gate").finish_non_exhaustive()
    }
}
