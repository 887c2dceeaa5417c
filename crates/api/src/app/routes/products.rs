use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shopgate_auth::Policy;
use shopgate_core::{Entity, ProductId, StoreError};
use shopgate_products::{NewProduct, ProductPatch};

use crate::app::dto::{self, ProductListQuery};
use crate::app::errors::ApiError;
use crate::app::routes::common::{accept_body, parse_protected_id, parse_public_id};
use crate::app::services::AppServices;
use crate::middleware::PresentedToken;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Public catalog read.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ProductListQuery>,
) -> Result<Response, ApiError> {
    let products = services.products.list(query.category.as_deref())?;
    Ok(dto::data(products))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let product_id: ProductId = parse_public_id(&id)?;
    let product = services
        .products
        .get(product_id)?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(dto::data(product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let svc: &AppServices = &services;
    svc.gate
        .run(token.as_deref(), Utc::now(), Policy::AdminOnly, move |_| async move {
            add_product(svc, body)
        })
        .await?
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
    patch: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    let product_id: ProductId = parse_protected_id(svc, &token, now, &id)?;

    svc.gate
        .run(token.as_deref(), now, Policy::AdminOnly, move |_| async move {
            patch_product(svc, product_id, patch)
        })
        .await?
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    token: PresentedToken,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let svc: &AppServices = &services;
    let product_id: ProductId = parse_protected_id(svc, &token, now, &id)?;

    svc.gate
        .run(token.as_deref(), now, Policy::AdminOnly, move |_| async move {
            remove_product(svc, product_id)
        })
        .await?
}

fn add_product(
    services: &AppServices,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = accept_body(body)?;
    let product = services.products.create(body, Utc::now())?;
    tracing::info!(product_id = %product.id(), "product created");
    Ok(dto::created("Product created", "productId", product.id()))
}

fn patch_product(
    services: &AppServices,
    product_id: ProductId,
    patch: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let patch = accept_body(patch)?;
    let product = services.products.update(product_id, patch, Utc::now())?;
    Ok(dto::data(product))
}

fn remove_product(services: &AppServices, product_id: ProductId) -> Result<Response, ApiError> {
    services.products.delete(product_id).map_err(|err| match err {
        StoreError::NotFound => ApiError::NotFound("product"),
        other => other.into(),
    })?;
    tracing::info!(%product_id, "product deleted");
    Ok(dto::message(StatusCode::OK, "Product deleted"))
}
