use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use shopgate_auth::Registration;

use crate::app::dto::{self, LoginRequest, RegisterRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }

    let registration = Registration {
        email: body.email,
        fullname: body.fullname,
        password: body.password,
    };
    let subject_id =
        tokio::task::spawn_blocking(move || services.authenticator.register(registration))
            .await??;

    tracing::info!(%subject_id, "user registered");
    Ok(dto::message(StatusCode::CREATED, "User created"))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let issued = tokio::task::spawn_blocking(move || {
        services
            .authenticator
            .login(&body.email, &body.password, now)
    })
    .await??;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "message": "Login successful",
        "accessToken": issued.token,
    }))
    .into_response())
}
