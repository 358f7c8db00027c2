//! Order routes
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/orders | POST | user |
//! | /api/orders | GET | user |
//! | /api/orders/admin/all | GET | admin |
//! | /api/orders/{id} | GET | owner or admin |
//! | /api/orders/{id}/status | PUT | admin |
//! | /api/orders/{id}/cancel | PUT | owner or admin |

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::auth::Identity;
use super::error::ApiError;
use super::{respond, ApiResult, ApiState};
use crate::clients::{CheckoutRequest, StatusChange};
use crate::domain::OrderStatus;
use crate::queries::{OrderFilter, PageRequest};

pub fn router() -> Router<ApiState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(my_orders).post(create_order))
        .route("/admin/all", get(all_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_status))
        .route("/{id}/cancel", put(cancel_order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminOrdersQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<OrderStatus>,
    #[serde(alias = "from")]
    start_date: Option<DateTime<Utc>>,
    #[serde(alias = "to")]
    end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct CancelRequest {
    #[serde(default, alias = "note")]
    reason: Option<String>,
}

/// POST /api/orders
async fn create_order(
    State(state): State<ApiState>,
    Identity(actor): Identity,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(request) = payload?;
    let order = state.orders.create_order(&actor, request).await?;
    Ok((
        StatusCode::CREATED,
        respond(Some("Order created successfully"), json!({ "order": order })),
    ))
}

/// GET /api/orders
async fn my_orders(
    State(state): State<ApiState>,
    Identity(actor): Identity,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Query(page) = query?;
    let page = state.queries.list_for_user(&actor, page).await?;
    Ok(respond(None, page))
}

/// GET /api/orders/admin/all
async fn all_orders(
    State(state): State<ApiState>,
    identity: Identity,
    query: Result<Query<AdminOrdersQuery>, QueryRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let actor = identity.require_admin()?;
    let Query(query) = query?;
    let filter = OrderFilter {
        status: query.status,
        from: query.start_date,
        to: query.end_date,
    };
    let page = PageRequest {
        page: query.page,
        limit: query.limit,
    };
    let result = state.queries.list_all(actor, filter, page).await?;
    Ok(respond(None, result))
}

/// GET /api/orders/{id}
async fn get_order(
    State(state): State<ApiState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let order = state.orders.get_order_for(&actor, id).await?;
    Ok(respond(None, json!({ "order": order })))
}

/// PUT /api/orders/{id}/status
async fn update_status(
    State(state): State<ApiState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
    payload: Result<Json<StatusChange>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(change) = payload?;
    let order = state.orders.update_status(&actor, id, change).await?;
    Ok(respond(Some("Order status updated successfully"), json!({ "order": order })))
}

/// PUT /api/orders/{id}/cancel
///
/// The body is optional; `{"reason": "..."}` overrides the default note.
async fn cancel_order(
    State(state): State<ApiState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let request: CancelRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CancelRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::Validation(format!("Invalid body: {}", e)))?
    };
    let order = state.orders.cancel_order(&actor, id, request.reason).await?;
    Ok(respond(Some("Order cancelled successfully"), json!({ "order": order })))
}
