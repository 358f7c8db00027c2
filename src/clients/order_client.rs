use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::clients::{ProductClient, UserClient};
use crate::domain::{
    Actor, Address, Coupon, Order, OrderCreate, OrderStatus, PaymentInfo, PaymentRequest, Product,
    ShippingDetails,
};
use crate::inventory::{InventoryAdjuster, StockLine};
use crate::notifications::{notify_in_background, Notification, Notifier};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use crate::order_number::OrderNumberGenerator;
use crate::pricing::{LineRequest, PricingEngine};

/// How many fresh order numbers are tried before giving up on a checkout.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 3;

const DEFAULT_CANCEL_NOTE: &str = "Cancelled by customer";

/// Everything a customer submits at checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(alias = "orderItems")]
    pub items: Vec<LineRequest>,
    pub shipping_address: Address,
    #[serde(default)]
    pub billing_address: Option<Address>,
    pub payment_info: PaymentRequest,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub customer_note: Option<String>,
}

/// An admin-requested status transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "shippingInfo")]
    pub shipping: Option<ShippingDetails>,
}

impl StatusChange {
    pub fn to(status: OrderStatus) -> Self {
        Self {
            status,
            note: None,
            shipping: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_shipping(mut self, shipping: ShippingDetails) -> Self {
        self.shipping = Some(shipping);
        self
    }
}

/// Client for interacting with the Order actor.
///
/// This client runs the order lifecycle: it validates the customer, prices the
/// cart against a catalog snapshot, reserves stock, persists the order, and
/// puts stock back when an order is cancelled.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    user_client: UserClient,
    product_client: ProductClient,
    inventory: InventoryAdjuster,
    pricing: PricingEngine,
    numbers: Arc<OrderNumberGenerator>,
    notifier: Arc<dyn Notifier>,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        user_client: UserClient,
        product_client: ProductClient,
        pricing: PricingEngine,
        numbers: Arc<OrderNumberGenerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner,
            user_client,
            inventory: InventoryAdjuster::new(product_client.clone()),
            product_client,
            pricing,
            numbers,
            notifier,
        }
    }

    #[instrument(skip(self, request), fields(user_id = %actor.user_id, lines = request.items.len()))]
    pub async fn create_order(&self, actor: &Actor, request: CheckoutRequest) -> Result<Order, OrderError> {
        info!("Processing create_order request");

        // Step 1: Validate user and input
        let user = self.user_client.require_user(actor.user_id.clone()).await?;
        info!(user_name = %user.name, "User validation successful");

        if request.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        request.shipping_address.validate().map_err(OrderError::InvalidInput)?;
        if let Some(billing) = &request.billing_address {
            billing.validate().map_err(OrderError::InvalidInput)?;
        }

        // Step 2: Snapshot the catalog and price the cart
        let catalog = self.snapshot_catalog(&request.items).await?;
        let quote = self.pricing.quote(&request.items, &catalog, request.coupon.as_ref())?;
        info!(grand_total = %quote.pricing.grand_total, "Order priced");

        // Step 3: Reserve stock
        let lines = StockLine::from_items(&quote.items);
        if let Err(e) = self.inventory.reserve(&lines).await {
            error!(error = %e, "Stock reservation failed");
            return Err(e.into());
        }

        // Step 4: Persist, retrying on order number collisions
        let created_at = Utc::now();
        let payment_info = PaymentInfo {
            method: request.payment_info.method,
            transaction_id: request.payment_info.transaction_id,
            status: request.payment_info.status,
            amount: quote.pricing.grand_total,
        };
        let coupon = request.coupon.filter(|coupon| !coupon.code.trim().is_empty());

        let mut attempt = 0;
        let order_id = loop {
            attempt += 1;
            let payload = OrderCreate {
                order_number: self.numbers.next_number(),
                user_id: user.id.clone(),
                items: quote.items.clone(),
                shipping_address: request.shipping_address.clone(),
                billing_address: request.billing_address.clone(),
                payment_info: payment_info.clone(),
                pricing: quote.pricing.clone(),
                coupon: coupon.clone(),
                customer_note: request.customer_note.clone(),
                created_at,
            };
            match self.inner.create(payload).await {
                Ok(id) => break id,
                Err(FrameworkError::Conflict(number)) if attempt < MAX_ORDER_NUMBER_ATTEMPTS => {
                    warn!(order_number = %number, attempt, "Order number taken, retrying");
                }
                Err(e) => {
                    error!(error = %e, "Persisting order failed, releasing reservation");
                    self.release_or_log(&lines).await;
                    return Err(e.into());
                }
            }
        };

        let order = self.load(order_id).await?;
        info!(order_id = %order.id, order_number = %order.order_number, "Order created");
        notify_in_background(self.notifier.clone(), Notification::order_created(&order));
        Ok(order)
    }

    /// The order, if `actor` owns it or is an admin.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_order_for(&self, actor: &Actor, id: String) -> Result<Order, OrderError> {
        let order = self.load(id).await?;
        if !actor.can_access(&order.user_id) {
            warn!("Access to order denied");
            return Err(OrderError::Forbidden("Access denied".into()));
        }
        Ok(order)
    }

    /// Admin-only status transition. Moving into `cancelled` restores stock.
    #[instrument(skip(self, actor, change), fields(user_id = %actor.user_id, status = %change.status))]
    pub async fn update_status(&self, actor: &Actor, id: String, change: StatusChange) -> Result<Order, OrderError> {
        if !actor.is_admin() {
            warn!("Status update denied for non-admin");
            return Err(OrderError::Forbidden("Only admins can update order status".into()));
        }
        let note = change
            .note
            .filter(|note| !note.trim().is_empty())
            .unwrap_or_else(|| format!("Status updated to {}", change.status));
        self.transition(actor, id, change.status, note, change.shipping).await
    }

    /// Cancels an order on behalf of its owner or an admin.
    #[instrument(skip(self, actor, reason), fields(user_id = %actor.user_id))]
    pub async fn cancel_order(&self, actor: &Actor, id: String, reason: Option<String>) -> Result<Order, OrderError> {
        self.get_order_for(actor, id.clone()).await?;
        let note = reason
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCEL_NOTE.to_string());
        self.transition(actor, id, OrderStatus::Cancelled, note, None).await
    }

    /// Applies the transition inside the order actor, then releases stock if
    /// this call is the one that cancelled the order.
    async fn transition(
        &self,
        actor: &Actor,
        id: String,
        status: OrderStatus,
        note: String,
        shipping: Option<ShippingDetails>,
    ) -> Result<Order, OrderError> {
        let action = OrderAction::Transition {
            status,
            actor: actor.user_id.clone(),
            note: note.clone(),
            shipping,
            at: Utc::now(),
        };
        let OrderActionResult::Transition { previous, order } = self.inner.perform_action(id, action).await?;
        info!(order_id = %order.id, from = %previous, to = %order.status, "Order status changed");

        if order.status == OrderStatus::Cancelled {
            if let Err(e) = self.inventory.release(&StockLine::from_items(&order.items)).await {
                error!(order_id = %order.id, error = %e, "Order cancelled but stock release failed");
                return Err(e.into());
            }
        }

        notify_in_background(self.notifier.clone(), Notification::status_changed(&order, &note));
        Ok(order)
    }

    async fn snapshot_catalog(&self, lines: &[LineRequest]) -> Result<HashMap<String, Product>, OrderError> {
        let mut catalog = HashMap::new();
        for line in lines {
            if catalog.contains_key(&line.product_id) {
                continue;
            }
            if let Some(product) = self.product_client.get_product(line.product_id.clone()).await? {
                catalog.insert(product.id.clone(), product);
            }
        }
        Ok(catalog)
    }

    async fn load(&self, id: String) -> Result<Order, OrderError> {
        self.inner
            .get(id.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order {}", id)))
    }

    async fn release_or_log(&self, lines: &[StockLine]) {
        if let Err(e) = self.inventory.release(lines).await {
            error!(error = %e, "Releasing reservation failed");
        }
    }
}
