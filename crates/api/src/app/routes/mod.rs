use axum::Router;

pub mod auth;
pub mod common;
pub mod orders;
pub mod products;
pub mod system;
pub mod users;

/// Router for everything except `/health`. Access control is per handler,
/// through the gate.
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/orders", orders::router())
        .nest("/products", products::router())
}
