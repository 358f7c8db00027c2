//! Catalog routes. Reads are public, writes are admin-only.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::auth::Identity;
use super::error::ApiError;
use super::{respond, ApiResult, ApiState};
use crate::domain::{Category, ProductCreate, ProductPatch, ProductView};

pub fn router() -> Router<ApiState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{id}", get(get_product).put(update_product).delete(delete_product))
}

#[derive(Debug, Default, Deserialize)]
struct CatalogQuery {
    featured: Option<bool>,
    category: Option<Category>,
}

/// GET /api/products
async fn list_products(
    State(state): State<ApiState>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Query(query) = query?;
    let mut products = state
        .products
        .list_products(move |product| {
            product.is_active
                && query.featured.map_or(true, |featured| product.is_featured == featured)
                && query.category.map_or(true, |category| product.category == category)
        })
        .await?;
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));
    let products: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();
    Ok(respond(None, json!({ "count": products.len(), "products": products })))
}

/// GET /api/products/{id}
async fn get_product(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<Json<serde_json::Value>> {
    let product = state
        .products
        .get_product(id.clone())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {}", id)))?;
    Ok(respond(None, json!({ "product": ProductView::from(product) })))
}

/// POST /api/products
async fn create_product(
    State(state): State<ApiState>,
    identity: Identity,
    payload: Result<Json<ProductCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    identity.require_admin()?;
    let Json(params) = payload?;
    let id = state.products.create_product(params).await?;
    let product = state.products.get_product(id.clone()).await?.map(ProductView::from);
    info!(product_id = %id, "Product created");
    Ok((
        StatusCode::CREATED,
        respond(Some("Product created successfully"), json!({ "product": product })),
    ))
}

/// PUT /api/products/{id}
async fn update_product(
    State(state): State<ApiState>,
    identity: Identity,
    Path(id): Path<String>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    identity.require_admin()?;
    let Json(patch) = payload?;
    let product = ProductView::from(state.products.update_product(id, patch).await?);
    Ok(respond(Some("Product updated successfully"), json!({ "product": product })))
}

/// DELETE /api/products/{id}
async fn delete_product(
    State(state): State<ApiState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    identity.require_admin()?;
    state.products.delete_product(id).await?;
    Ok(respond(Some("Product deleted successfully"), json!({})))
}
