use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error("User request timed out: {0}")]
    Timeout(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<UserError>> for UserError {
    fn from(e: FrameworkError<UserError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            FrameworkError::Conflict(email) => UserError::AlreadyExists(email),
            FrameworkError::Entity(inner) => inner,
            FrameworkError::Timeout(after) => UserError::Timeout(format!("{:?}", after)),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
