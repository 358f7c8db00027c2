use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus, ShippingInfo, StatusHistoryEntry};

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn id(&self) -> &String {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.order_number.clone())
    }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order starts `pending` with a single "Order created" history entry.
    /// The billing address falls back to the shipping address.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        params.shipping_address.validate().map_err(OrderError::InvalidInput)?;
        if let Some(billing) = &params.billing_address {
            billing.validate().map_err(OrderError::InvalidInput)?;
        }
        if !params.pricing.is_consistent() {
            return Err(OrderError::InvalidInput("pricing breakdown does not add up".into()));
        }

        let billing_address = params
            .billing_address
            .unwrap_or_else(|| params.shipping_address.clone());

        Ok(Self {
            id,
            order_number: params.order_number,
            history: vec![StatusHistoryEntry {
                status: OrderStatus::Pending,
                actor: params.user_id.clone(),
                timestamp: params.created_at,
                note: "Order created".into(),
            }],
            user_id: params.user_id,
            items: params.items,
            shipping_address: params.shipping_address,
            billing_address,
            payment_info: params.payment_info,
            pricing: params.pricing,
            coupon: params.coupon,
            status: OrderStatus::Pending,
            shipping_info: ShippingInfo::default(),
            customer_note: params.customer_note,
            created_at: params.created_at,
            updated_at: params.created_at,
        })
    }

    /// Orders only change through status transitions.
    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Err(OrderError::InvalidInput("orders change only through status transitions".into()))
    }

    fn on_delete(&self) -> Result<(), OrderError> {
        Err(OrderError::Forbidden("orders are never deleted".into()))
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Transition {
                status,
                actor,
                note,
                shipping,
                at,
            } => {
                let previous = self.status;
                if !previous.can_transition_to(status) {
                    return Err(OrderError::InvalidTransition {
                        from: previous,
                        to: status,
                    });
                }

                match status {
                    OrderStatus::Shipped => {
                        self.shipping_info.shipped_at = Some(at);
                        if let Some(details) = shipping {
                            if details.carrier.is_some() {
                                self.shipping_info.carrier = details.carrier;
                            }
                            if details.tracking_number.is_some() {
                                self.shipping_info.tracking_number = details.tracking_number;
                            }
                            if details.estimated_delivery.is_some() {
                                self.shipping_info.estimated_delivery = details.estimated_delivery;
                            }
                        }
                    }
                    OrderStatus::Delivered => self.shipping_info.actual_delivery = Some(at),
                    _ => {}
                }

                self.status = status;
                self.updated_at = at;
                self.history.push(StatusHistoryEntry {
                    status,
                    actor,
                    timestamp: at,
                    note,
                });

                Ok(OrderActionResult::Transition {
                    previous,
                    order: self.clone(),
                })
            }
        }
    }
}
