//! REST surface over the order system.
//!
//! Successful responses are JSON objects with `"success": true`, an optional
//! `message`, and the payload fields merged in. Errors render through
//! [`ApiError`].

pub mod admin;
pub mod auth;
pub mod error;
pub mod orders;
pub mod products;
pub mod users;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::queries::OrderQueryService;

pub use error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Handles shared by every request handler.
#[derive(Clone)]
pub struct ApiState {
    pub orders: OrderClient,
    pub products: ProductClient,
    pub users: UserClient,
    pub queries: OrderQueryService,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(orders::router())
        .merge(products::router())
        .merge(users::router())
        .merge(admin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Wraps `body` in the success envelope. Object bodies are merged in place,
/// anything else lands under `data`.
pub(crate) fn respond(message: Option<&str>, body: impl Serialize) -> Json<Value> {
    let mut envelope = Map::new();
    envelope.insert("success".into(), Value::Bool(true));
    if let Some(message) = message {
        envelope.insert("message".into(), Value::String(message.to_string()));
    }
    match serde_json::to_value(body) {
        Ok(Value::Object(fields)) => envelope.extend(fields),
        Ok(Value::Null) => {}
        Ok(other) => {
            envelope.insert("data".into(), other);
        }
        Err(e) => error!(error = %e, "Response body failed to serialize"),
    }
    Json(Value::Object(envelope))
}
