use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Product SKU already exists: {0}")]
    Conflict(String),
    #[error("Product request timed out: {0}")]
    Timeout(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<ProductError>> for ProductError {
    fn from(e: FrameworkError<ProductError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Conflict(sku) => ProductError::Conflict(sku),
            FrameworkError::Entity(inner) => inner,
            FrameworkError::Timeout(after) => ProductError::Timeout(format!("{:?}", after)),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
