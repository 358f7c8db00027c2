//! Caller identity, as asserted by the upstream gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use crate::domain::{Actor, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller. Rejects with 401 when either identity header is
/// missing or malformed.
#[derive(Debug, Clone)]
pub struct Identity(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;
        let role = header(parts, USER_ROLE_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;
        let role = role
            .parse::<Role>()
            .map_err(|_| ApiError::Unauthorized(format!("Invalid role: {}", role)))?;

        Ok(Identity(Actor::new(user_id, role)))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl Identity {
    pub fn require_admin(&self) -> Result<&Actor, ApiError> {
        if self.0.is_admin() {
            Ok(&self.0)
        } else {
            Err(ApiError::Forbidden("Admin access required".into()))
        }
    }
}
