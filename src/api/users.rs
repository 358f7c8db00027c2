//! User registration and lookup.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::auth::Identity;
use super::error::ApiError;
use super::{respond, ApiResult, ApiState};
use crate::domain::UserCreate;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/api/users", post(register))
        .route("/api/users/{id}", get(get_user))
}

#[derive(Debug, Deserialize)]
struct Registration {
    name: String,
    email: String,
}

/// POST /api/users
///
/// Always registers a customer; admin accounts are provisioned at startup.
async fn register(
    State(state): State<ApiState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(registration) = payload?;
    let id = state
        .users
        .create_user(UserCreate::customer(registration.name, registration.email))
        .await?;
    let user = state.users.require_user(id).await?;
    Ok((
        StatusCode::CREATED,
        respond(Some("User registered successfully"), json!({ "user": user })),
    ))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<ApiState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !actor.can_access(&id) {
        return Err(ApiError::Forbidden("Access denied".into()));
    }
    let user = state.users.require_user(id).await?;
    Ok(respond(None, json!({ "user": user })))
}
