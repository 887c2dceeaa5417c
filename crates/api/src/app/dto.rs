use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub fullname: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub fullname: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
}

// -------------------------
// Response helpers
// -------------------------

/// `{"status":"ok","message":...}`
pub fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": "ok", "message": message }))).into_response()
}

/// `{"status":"ok","data":...}`
pub fn data<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok", "data": data }))).into_response()
}

/// `{"status":"ok","message":...,<id_field>:<id>}` with 201.
pub fn created(message: &str, id_field: &str, id: impl ToString) -> Response {
    let mut body = json!({ "status": "ok", "message": message });
    body[id_field] = json!(id.to_string());
    (StatusCode::CREATED, Json(body)).into_response()
}
