use chrono::{DateTime, Utc};

use crate::domain::{Order, OrderStatus, ShippingDetails};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order along one edge of the status machine and appends a
    /// history entry. Illegal edges are rejected without touching the order.
    Transition {
        status: OrderStatus,
        actor: String,
        note: String,
        shipping: Option<ShippingDetails>,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Transition { previous: OrderStatus, order: Order },
}
