use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use shopgate_auth::{AccessError, AuthError};
use shopgate_core::{DomainError, StoreError};
use shopgate_infra::RecordError;

const OPAQUE_FAILURE: &str = "something went wrong, please try again later";

/// Every failure a handler can surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("incorrect email or password")]
    InvalidLogin,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("user update failed: current password does not match")]
    PasswordMismatch,

    /// Collaborator fault. The detail is logged, never returned.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(detail: impl std::fmt::Display) -> Self {
        Self::Unexpected(detail.to_string())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidLogin => (StatusCode::UNAUTHORIZED, "invalid_login"),
            Self::Access(AccessError::TokenMissing) => (StatusCode::UNAUTHORIZED, "token_missing"),
            Self::Access(AccessError::TokenInvalidOrExpired) => {
                (StatusCode::UNAUTHORIZED, "token_invalid")
            }
            Self::Access(AccessError::Forbidden) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::PasswordMismatch => (StatusCode::UNAUTHORIZED, "password_mismatch"),
            Self::Unexpected(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            Self::Unexpected(detail) => {
                tracing::error!(%detail, "request failed");
                OPAQUE_FAILURE.to_string()
            }
            other => other.to_string(),
        };
        json_error(status, code, message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidLogin => Self::InvalidLogin,
            AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::PasswordMismatch => Self::PasswordMismatch,
            AuthError::UnknownSubject => Self::NotFound("user"),
            AuthError::Store(e) => e.into(),
            AuthError::Hashing(_) | AuthError::Token(_) => Self::unexpected(err),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("resource"),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Unavailable(_) => Self::unexpected(err),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Store(e) => e.into(),
            RecordError::Domain(e) => e.into(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::unexpected(err)
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "status": "error",
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_errors_map_to_distinct_codes() {
        assert_eq!(
            ApiError::from(AccessError::TokenMissing).status_and_code(),
            (StatusCode::UNAUTHORIZED, "token_missing")
        );
        assert_eq!(
            ApiError::from(AccessError::TokenInvalidOrExpired).status_and_code(),
            (StatusCode::UNAUTHORIZED, "token_invalid")
        );
        assert_eq!(
            ApiError::from(AccessError::Forbidden).status_and_code(),
            (StatusCode::FORBIDDEN, "forbidden")
        );
    }

    #[test]
    fn store_faults_become_opaque_500() {
        let err = ApiError::from(StoreError::unavailable("lock poisoned at users.rs:42"));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_keep_their_meaning() {
        assert!(matches!(ApiError::from(AuthError::InvalidLogin), ApiError::InvalidLogin));
        assert!(matches!(ApiError::from(AuthError::EmailTaken), ApiError::Conflict(_)));
        assert!(matches!(
            ApiError::from(AuthError::Store(StoreError::NotFound)),
            ApiError::NotFound(_)
        ));
    }
}
