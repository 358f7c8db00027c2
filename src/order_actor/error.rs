use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::OrderStatus;
use crate::pricing::PricingError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Order must contain at least one item")]
    EmptyOrder,
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },
    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(e: FrameworkError<OrderError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(format!("Order {}", id)),
            FrameworkError::Conflict(number) => {
                OrderError::Conflict(format!("order number {} already exists", number))
            }
            FrameworkError::Entity(inner) => inner,
            FrameworkError::Timeout(after) => OrderError::Timeout(format!("{:?}", after)),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<ProductError> for OrderError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => OrderError::NotFound(format!("Product {}", id)),
            ProductError::InsufficientStock {
                product_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            ProductError::InvalidQuantity(quantity) => {
                OrderError::InvalidInput(format!("invalid quantity {}", quantity))
            }
            ProductError::ValidationError(msg) => OrderError::InvalidInput(msg),
            ProductError::Conflict(sku) => OrderError::Conflict(format!("SKU {} already exists", sku)),
            ProductError::Timeout(msg) => OrderError::Timeout(msg),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
        }
    }
}

impl From<UserError> for OrderError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(id) => OrderError::NotFound(format!("User {}", id)),
            UserError::AlreadyExists(email) => {
                OrderError::Conflict(format!("user {} already exists", email))
            }
            UserError::ValidationError(msg) => OrderError::InvalidInput(msg),
            UserError::Timeout(msg) => OrderError::Timeout(msg),
            UserError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
        }
    }
}

impl From<PricingError> for OrderError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::EmptyOrder => OrderError::EmptyOrder,
            PricingError::ProductNotFound(id) => OrderError::NotFound(format!("Product {}", id)),
            PricingError::InsufficientStock {
                product_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            other => OrderError::InvalidInput(other.to_string()),
        }
    }
}
