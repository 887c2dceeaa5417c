use thiserror::Error;

use shopgate_core::StoreError;

use crate::{PasswordHashError, TokenIssueError};

/// Which half of a login failed. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    CredentialNotFound,
    CredentialMismatch,
}

/// Errors raised by [`crate::Authenticator`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("incorrect email or password")]
    InvalidLogin,

    #[error("email is already registered")]
    EmailTaken,

    /// The current password presented with a password change did not match.
    #[error("current password does not match")]
    PasswordMismatch,

    #[error("no credential for this subject")]
    UnknownSubject,

    #[error(transparent)]
    Hashing(#[from] PasswordHashError),

    #[error(transparent)]
    Token(#[from] TokenIssueError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
