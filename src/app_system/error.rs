use thiserror::Error;

use crate::product_actor::ProductError;
use crate::user_actor::UserError;

/// Failures while starting, seeding or stopping the system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Seeding failed: {0}")]
    Seed(String),
    #[error("Actor task failed: {0}")]
    ActorTask(#[from] tokio::task::JoinError),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl From<UserError> for SystemError {
    fn from(e: UserError) -> Self {
        SystemError::Seed(e.to_string())
    }
}

impl From<ProductError> for SystemError {
    fn from(e: ProductError) -> Self {
        SystemError::Seed(e.to_string())
    }
}
