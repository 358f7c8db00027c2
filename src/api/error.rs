use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

/// Errors rendered to HTTP clients as `{ "success": false, "message": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Malformed or invalid input (400)
    #[error("{0}")]
    Validation(String),
    /// Well-formed request that breaks a business rule (400)
    #[error("{0}")]
    BusinessRule(String),
    #[error("Request timed out")]
    Timeout(String),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(detail) => error!(%status, %detail, "Request failed"),
            ApiError::Timeout(detail) => error!(%status, %detail, "Request timed out"),
            other => warn!(%status, message = %other, "Request rejected"),
        }
        let body = json!({
            "success": false,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        let message = e.to_string();
        match e {
            OrderError::NotFound(_) => ApiError::NotFound(message),
            OrderError::InvalidInput(_) => ApiError::Validation(message),
            OrderError::EmptyOrder
            | OrderError::InsufficientStock { .. }
            | OrderError::InvalidTransition { .. } => ApiError::BusinessRule(message),
            OrderError::Forbidden(_) => ApiError::Forbidden(message),
            OrderError::Conflict(_) => ApiError::Conflict(message),
            OrderError::Timeout(_) => ApiError::Timeout(message),
            OrderError::ActorCommunicationError(_) => ApiError::Internal(message),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(e: ProductError) -> Self {
        let message = e.to_string();
        match e {
            ProductError::NotFound(_) => ApiError::NotFound(message),
            ProductError::InsufficientStock { .. } => ApiError::BusinessRule(message),
            ProductError::InvalidQuantity(_) | ProductError::ValidationError(_) => ApiError::Validation(message),
            ProductError::Conflict(_) => ApiError::Conflict(message),
            ProductError::Timeout(_) => ApiError::Timeout(message),
            ProductError::ActorCommunicationError(_) => ApiError::Internal(message),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        let message = e.to_string();
        match e {
            UserError::NotFound(_) => ApiError::NotFound(message),
            UserError::AlreadyExists(_) => ApiError::Conflict(message),
            UserError::ValidationError(_) => ApiError::Validation(message),
            UserError::Timeout(_) => ApiError::Timeout(message),
            UserError::ActorCommunicationError(_) => ApiError::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
