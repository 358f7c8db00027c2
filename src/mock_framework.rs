//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_transaction`] to assert behavior.

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, Filter, FrameworkError, ResourceClient, ResourceRequest};
use crate::domain::{
    Address, Category, LineItem, Order, OrderCreate, PaymentInfo, PaymentMethod, PaymentStatus, PricingBreakdown,
    Product, Role, User,
};

type Reply<T, R> = oneshot::Sender<Result<R, FrameworkError<<T as Entity>::Error>>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// Tests that exercise a *client* (e.g. the order lifecycle in `OrderClient`)
/// do not need a running `ResourceActor`. The mock client sends to a channel
/// the test owns, so the test can inspect each request and answer it with
/// whatever success or failure the scenario calls for.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Reply<T, T::Id>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Reply<T, Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request.
/// The returned filter can be applied to fixtures to build the reply.
pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Filter<T>, Reply<T, Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Reply<T, T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Transaction request
pub async fn expect_transaction<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<(T::Id, T::Action)>, Reply<T, Vec<T::ActionResult>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Transaction { actions, respond_to }) => Some((actions, respond_to)),
        _ => None,
    }
}

// --- Fixtures ---

pub fn customer(id: &str) -> User {
    User {
        id: id.into(),
        name: "Ada Lovelace".into(),
        email: format!("{}@example.com", id),
        role: Role::Customer,
        created_at: Utc::now(),
    }
}

pub fn wig(id: &str, price: Decimal, stock: u32) -> Product {
    Product {
        id: id.into(),
        name: format!("Wig {}", id),
        description: String::new(),
        category: Category::FemaleWigs,
        sku: format!("VH-FEM-{}", id),
        price,
        discount_price: None,
        stock,
        colors: Vec::new(),
        is_active: true,
        is_featured: false,
        created_at: Utc::now(),
    }
}

/// A pending order at 20.00 per unit with no tax, shipping or discount.
pub fn order(id: &str, user_id: &str, lines: &[(&str, u32)]) -> Order {
    let unit_price = Decimal::new(20, 0);
    let items: Vec<LineItem> = lines
        .iter()
        .map(|(product_id, quantity)| LineItem {
            product_id: product_id.to_string(),
            product_name: format!("Wig {}", product_id),
            quantity: *quantity,
            unit_price,
            line_total: unit_price * Decimal::from(*quantity),
        })
        .collect();
    let items_total: Decimal = items.iter().map(|item| item.line_total).sum();
    let params = OrderCreate {
        order_number: "VH-1700000000000-001".into(),
        user_id: user_id.into(),
        items,
        shipping_address: address(),
        billing_address: None,
        payment_info: PaymentInfo {
            method: PaymentMethod::CreditCard,
            transaction_id: None,
            status: PaymentStatus::Pending,
            amount: items_total,
        },
        pricing: PricingBreakdown {
            items_total,
            tax: Decimal::ZERO,
            shipping: Decimal::ZERO,
            discount: Decimal::ZERO,
            grand_total: items_total,
        },
        coupon: None,
        customer_note: None,
        created_at: Utc::now(),
    };
    Order::from_create_params(id.into(), params).expect("fixture order is valid")
}

pub fn address() -> Address {
    Address {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        street: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        zip_code: "62701".into(),
        country: "US".into(),
        phone: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserCreate;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        // Test Create
        let create_task = tokio::spawn(async move { client.create(UserCreate::customer("Test", "test@example.com")).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Test");
        responder.send(Ok("user_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("user_1".to_string()));
    }
}
