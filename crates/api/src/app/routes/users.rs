use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shopgate_auth::{CredentialStore, Identity, Policy};
use shopgate_core::{StoreError, SubjectId};

use crate::app::dto::{self, UpdateUserRequest};
use crate::app::errors::ApiError;
use crate::app::routes::common::{accept_body, parse_protected_id};
use crate::app::services::AppServices;
use crate::middleware::PresentedToken;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(me))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
) -> Result<Response, ApiError> {
    let svc: &AppServices = &services;
    svc.gate
        .run(token.as_deref(), Utc::now(), Policy::AdminOnly, move |_| async move {
            all_profiles(svc)
        })
        .await?
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
) -> Result<Response, ApiError> {
    let svc: &AppServices = &services;
    svc.gate
        .run(token.as_deref(), Utc::now(), Policy::Authenticated, move |identity| async move {
            profile_of(svc, identity.subject_id)
        })
        .await?
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    let user_id: SubjectId = parse_protected_id(svc, &token, now, &id)?;

    svc.gate
        .run(token.as_deref(), now, Policy::OwnerOrAdmin(user_id), move |_| async move {
            profile_of(svc, user_id)
        })
        .await?
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let user_id: SubjectId = parse_protected_id(&services, &token, now, &id)?;

    let svc = services.clone();
    services
        .gate
        .run(token.as_deref(), now, Policy::OwnerOrAdmin(user_id), move |identity| {
            apply_user_update(svc, identity, user_id, body)
        })
        .await?
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    let user_id: SubjectId = parse_protected_id(svc, &token, now, &id)?;

    svc.gate
        .run(token.as_deref(), now, Policy::OwnerOrAdmin(user_id), move |identity| async move {
            delete_account(svc, &identity, user_id)
        })
        .await?
}

fn all_profiles(services: &AppServices) -> Result<Response, ApiError> {
    Ok(dto::data(services.users.profiles()?))
}

/// Removes the credential and the profile.
fn delete_account(
    services: &AppServices,
    identity: &Identity,
    user_id: SubjectId,
) -> Result<Response, ApiError> {
    services.users.delete(user_id).map_err(|err| match err {
        StoreError::NotFound => ApiError::NotFound("user"),
        other => other.into(),
    })?;
    tracing::info!(%user_id, by = %identity.subject_id, "user deleted");
    Ok(dto::message(StatusCode::OK, "User deleted"))
}

fn profile_of(services: &AppServices, user_id: SubjectId) -> Result<Response, ApiError> {
    let profile = services
        .users
        .profile(user_id)?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(dto::data(profile))
}

/// Every field is checked before anything is written, so a rejected update
/// leaves both the password and the profile untouched.
async fn apply_user_update(
    services: Arc<AppServices>,
    identity: Identity,
    user_id: SubjectId,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = accept_body(body)?;
    if body.fullname.is_none() && body.new_password.is_none() {
        return Err(ApiError::validation("nothing to update"));
    }
    if body
        .fullname
        .as_deref()
        .is_some_and(|fullname| fullname.trim().is_empty())
    {
        return Err(ApiError::validation("fullname must not be blank"));
    }
    let password_change = match body.new_password {
        Some(new_password) => {
            let current = body.current_password.ok_or_else(|| {
                ApiError::validation("currentPassword is required to change the password")
            })?;
            if new_password.is_empty() {
                return Err(ApiError::validation("newPassword must not be empty"));
            }
            Some((current, new_password))
        }
        None => None,
    };
    if services.users.profile(user_id)?.is_none() {
        return Err(ApiError::NotFound("user"));
    }

    if let Some((current, new_password)) = password_change {
        let svc = services.clone();
        tokio::task::spawn_blocking(move || {
            svc.authenticator
                .change_password(user_id, &current, &new_password)
        })
        .await??;
    }

    let profile = match body.fullname {
        Some(fullname) => services.users.rename(user_id, &fullname, Utc::now())?,
        None => services
            .users
            .profile(user_id)?
            .ok_or(ApiError::NotFound("user"))?,
    };

    tracing::info!(%user_id, by = %identity.subject_id, "user updated");
    Ok(dto::data(profile))
}
