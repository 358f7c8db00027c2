//! Customer notifications sent after order events.
//!
//! Delivery is fire-and-forget: a failed notification is logged and never
//! fails the operation that triggered it.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn, Instrument};

use crate::domain::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    OrderCreated {
        order_number: String,
        user_id: String,
        grand_total: Decimal,
    },
    StatusChanged {
        order_number: String,
        user_id: String,
        status: OrderStatus,
        note: String,
    },
}

impl Notification {
    pub fn order_created(order: &Order) -> Self {
        Notification::OrderCreated {
            order_number: order.order_number.clone(),
            user_id: order.user_id.clone(),
            grand_total: order.pricing.grand_total,
        }
    }

    pub fn status_changed(order: &Order, note: &str) -> Self {
        Notification::StatusChanged {
            order_number: order.order_number.clone(),
            user_id: order.user_id.clone(),
            status: order.status,
            note: note.to_string(),
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Notification::OrderCreated { order_number, .. } => {
                format!("Order Confirmation - {}", order_number)
            }
            Notification::StatusChanged {
                order_number, status, ..
            } => format!("Order {} is now {}", order_number, status),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Writes the message it would deliver to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        match &notification {
            Notification::OrderCreated { user_id, grand_total, .. } => {
                info!(%user_id, %grand_total, subject = %notification.subject(), "Sending notification");
            }
            Notification::StatusChanged { user_id, note, .. } => {
                info!(%user_id, %note, subject = %notification.subject(), "Sending notification");
            }
        }
        Ok(())
    }
}

/// Spawns delivery on its own task and returns immediately.
pub fn notify_in_background(notifier: Arc<dyn Notifier>, notification: Notification) {
    let span = tracing::info_span!("notification");
    tokio::spawn(
        async move {
            if let Err(e) = notifier.notify(notification).await {
                warn!(error = %e, "Notification delivery failed");
            }
        }
        .instrument(span),
    );
}
