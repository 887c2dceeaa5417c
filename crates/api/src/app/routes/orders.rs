use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shopgate_auth::{Identity, Policy};
use shopgate_core::{Entity, OrderId, StoreError, SubjectId};
use shopgate_sales::{NewOrder, OrderPatch, OrderStatus};

use crate::app::dto::{self, OrderListQuery};
use crate::app::errors::ApiError;
use crate::app::routes::common::{accept_body, parse_protected_id};
use crate::app::services::AppServices;
use crate::middleware::PresentedToken;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/user/:id", get(orders_for_user))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Query(query): Query<OrderListQuery>,
) -> Result<Response, ApiError> {
    let svc: &AppServices = &services;
    svc.gate
        .run(token.as_deref(), Utc::now(), Policy::AdminOnly, move |_| async move {
            orders_with_status(svc, query.status.as_deref())
        })
        .await?
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    svc.gate
        .run(token.as_deref(), now, Policy::Authenticated, move |identity| async move {
            place_order(svc, &identity, body)
        })
        .await?
}

pub async fn orders_for_user(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    let owner: SubjectId = parse_protected_id(svc, &token, now, &id)?;

    svc.gate
        .run(token.as_deref(), now, Policy::OwnerOrAdmin(owner), move |_| async move {
            owned_orders(svc, owner)
        })
        .await?
}

/// The policy target is the order's owner, so the owner is looked up (after
/// authentication) before the decision. A caller who may not see the order
/// gets the same 404 as for an unknown id.
pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let order_id: OrderId = parse_protected_id(&services, &token, now, &id)?;

    let identity = services.gate.authenticate(token.as_deref(), now)?;
    let owner = services
        .orders
        .owner_of(order_id)?
        .ok_or(ApiError::NotFound("order"))?;
    services
        .gate
        .authorize(&identity, &Policy::OwnerOrAdmin(owner))
        .map_err(|_| ApiError::NotFound("order"))?;

    let order = services
        .orders
        .get(order_id)?
        .ok_or(ApiError::NotFound("order"))?;
    Ok(dto::data(order))
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
    patch: Result<Json<OrderPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    let order_id: OrderId = parse_protected_id(svc, &token, now, &id)?;

    svc.gate
        .run(token.as_deref(), now, Policy::AdminOnly, move |_| async move {
            patch_order(svc, order_id, patch)
        })
        .await?
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    let order_id: OrderId = parse_protected_id(svc, &token, now, &id)?;

    svc.gate
        .run(token.as_deref(), now, Policy::AdminOnly, move |_| async move {
            remove_order(svc, order_id)
        })
        .await?
}

fn orders_with_status(services: &AppServices, status: Option<&str>) -> Result<Response, ApiError> {
    let status = status.map(str::parse::<OrderStatus>).transpose()?;
    Ok(dto::data(services.orders.list(status)?))
}

fn place_order(
    services: &AppServices,
    identity: &Identity,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = accept_body(body)?;
    let order = services
        .orders
        .create(identity.subject_id, body, Utc::now())?;
    tracing::info!(order_id = %order.id(), owner = %identity.subject_id, "order placed");
    Ok(dto::created("Order created", "orderId", order.id()))
}

fn owned_orders(services: &AppServices, owner: SubjectId) -> Result<Response, ApiError> {
    Ok(dto::data(services.orders.list_for_owner(owner)?))
}

fn patch_order(
    services: &AppServices,
    order_id: OrderId,
    patch: Result<Json<OrderPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let patch = accept_body(patch)?;
    let order = services.orders.update(order_id, patch, Utc::now())?;
    Ok(dto::data(order))
}

fn remove_order(services: &AppServices, order_id: OrderId) -> Result<Response, ApiError> {
    services.orders.delete(order_id).map_err(|err| match err {
        StoreError::NotFound => ApiError::NotFound("order"),
        other => other.into(),
    })?;
    tracing::info!(%order_id, "order deleted");
    Ok(dto::message(StatusCode::OK, "Order deleted"))
}
