use std::str::FromStr;

use axum::{extract::rejection::JsonRejection, Json};
use chrono::{DateTime, Utc};

use shopgate_core::DomainError;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::middleware::PresentedToken;

/// Parse an id from a protected path.
///
/// A malformed id is only reported once the caller has a valid token, so an
/// anonymous caller still gets the token outcome first.
pub fn parse_protected_id<T>(
    services: &AppServices,
    token: &PresentedToken,
    now: DateTime<Utc>,
    raw: &str,
) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    match raw.parse::<T>() {
        Ok(id) => Ok(id),
        Err(e) => {
            services.gate.authenticate(token.as_deref(), now)?;
            Err(e.into())
        }
    }
}

pub fn parse_public_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(ApiError::from)
}

/// Unwrap a request body taken as `Result<Json<T>, JsonRejection>`.
///
/// Protected handlers call this inside the gated operation, after the access
/// decision.
pub fn accept_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}
