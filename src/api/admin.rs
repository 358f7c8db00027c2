//! Admin dashboard routes.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::auth::Identity;
use super::{respond, ApiResult, ApiState};

pub fn router() -> Router<ApiState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ApiState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/recent-orders", get(recent_orders))
        .route("/low-stock", get(low_stock))
}

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ThresholdQuery {
    threshold: Option<u32>,
}

/// GET /api/admin/stats
async fn stats(State(state): State<ApiState>, identity: Identity) -> ApiResult<Json<serde_json::Value>> {
    let actor = identity.require_admin()?;
    let stats = state.queries.dashboard_stats(actor).await?;
    Ok(respond(None, stats))
}

/// GET /api/admin/recent-orders
async fn recent_orders(
    State(state): State<ApiState>,
    identity: Identity,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let actor = identity.require_admin()?;
    let Query(query) = query?;
    let orders = state.queries.recent_orders(actor, query.limit).await?;
    Ok(respond(None, json!({ "orders": orders })))
}

/// GET /api/admin/low-stock
async fn low_stock(
    State(state): State<ApiState>,
    identity: Identity,
    query: Result<Query<ThresholdQuery>, QueryRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let actor = identity.require_admin()?;
    let Query(query) = query?;
    let products = state.queries.low_stock_products(actor, query.threshold).await?;
    Ok(respond(None, json!({ "products": products })))
}
