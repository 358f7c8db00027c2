//! Cross-actor scenarios: the order lifecycle driven against mocks for exact
//! message ordering, and against the full system for end-to-end behavior.

mod mocked {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::actor_framework::{Entity, FrameworkError};
    use crate::clients::{CheckoutRequest, OrderClient, ProductClient, UserClient};
    use crate::domain::{Actor, Order, OrderStatus, PaymentMethod, PaymentRequest, PaymentStatus, Product, User};
    use crate::mock_framework::{
        address, create_mock_client, customer, expect_action, expect_create, expect_get, expect_list,
        expect_transaction, order, wig,
    };
    use crate::notifications::testing::RecordingNotifier;
    use crate::notifications::Notifier;
    use crate::order_actor::{OrderAction, OrderError};
    use crate::order_number::OrderNumberGenerator;
    use crate::pricing::{LineRequest, PricingEngine};
    use crate::product_actor::{ProductAction, ProductActionResult};

    fn checkout(lines: Vec<LineRequest>) -> CheckoutRequest {
        CheckoutRequest {
            items: lines,
            shipping_address: address(),
            billing_address: None,
            payment_info: PaymentRequest {
                method: PaymentMethod::Paypal,
                transaction_id: None,
                status: PaymentStatus::Pending,
            },
            coupon: None,
            customer_note: Some("Gift wrap please".into()),
        }
    }

    struct Harness {
        client: OrderClient,
        users: tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<User>>,
        products: tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Product>>,
        orders: tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Order>>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let (user_client_inner, users) = create_mock_client::<User>(10);
        let (product_client_inner, products) = create_mock_client::<Product>(10);
        let (order_client_inner, orders) = create_mock_client::<Order>(10);
        let notifier = Arc::new(RecordingNotifier::default());
        let client = OrderClient::new(
            order_client_inner,
            UserClient::new(user_client_inner),
            ProductClient::new(product_client_inner),
            PricingEngine::default(),
            Arc::new(OrderNumberGenerator::new("VH")),
            notifier.clone() as Arc<dyn Notifier>,
        );
        Harness {
            client,
            users,
            products,
            orders,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_order_creation_flow() {
        // 1. Setup Mocks
        let mut h = harness();
        let client = h.client.clone();

        // 2. Execute Order Creation in background
        let order_task = tokio::spawn(async move {
            client
                .create_order(&Actor::customer("user_1"), checkout(vec![LineRequest::new("product_1", 3)]))
                .await
        });

        // 3. Verify Interactions

        // Expect User Get
        let (user_id, responder) = expect_get(&mut h.users).await.expect("Expected User Get");
        assert_eq!(user_id, "user_1");
        responder.send(Ok(Some(customer("user_1")))).unwrap();

        // Expect Product Get (catalog snapshot)
        let (product_id, responder) = expect_get(&mut h.products).await.expect("Expected Product Get");
        assert_eq!(product_id, "product_1");
        responder
            .send(Ok(Some(wig("product_1", Decimal::new(50, 0), 5))))
            .unwrap();

        // Expect Stock Reservation (Transaction)
        let (actions, responder) = expect_transaction(&mut h.products)
            .await
            .expect("Expected Product Transaction");
        assert_eq!(actions, vec![("product_1".to_string(), ProductAction::ReserveStock(3))]);
        responder.send(Ok(vec![ProductActionResult::ReserveStock(2)])).unwrap();

        // Expect Order Create
        let (payload, responder) = expect_create(&mut h.orders).await.expect("Expected Order Create");
        assert_eq!(payload.user_id, "user_1");
        assert_eq!(payload.items[0].quantity, 3);
        assert_eq!(payload.pricing.grand_total, Decimal::new(16200, 2));
        assert_eq!(payload.payment_info.amount, Decimal::new(16200, 2));
        assert!(payload.order_number.starts_with("VH-"));
        let stored = Order::from_create_params("order_1".into(), payload).unwrap();
        responder.send(Ok("order_1".to_string())).unwrap();

        // Expect Order Get
        let (order_id, responder) = expect_get(&mut h.orders).await.expect("Expected Order Get");
        assert_eq!(order_id, "order_1");
        responder.send(Ok(Some(stored))).unwrap();

        // 4. Verify Result
        let order = order_task.await.unwrap().unwrap();
        assert_eq!(order.id, "order_1");
        assert_eq!(order.customer_note.as_deref(), Some("Gift wrap please"));

        tokio::task::yield_now().await;
        for _ in 0..50 {
            if !h.notifier.sent.lock().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(h.notifier.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn failed_reservation_persists_nothing() {
        let mut h = harness();
        let client = h.client.clone();
        let order_task = tokio::spawn(async move {
            client
                .create_order(&Actor::customer("user_1"), checkout(vec![LineRequest::new("product_1", 2)]))
                .await
        });

        let (_, responder) = expect_get(&mut h.users).await.unwrap();
        responder.send(Ok(Some(customer("user_1")))).unwrap();
        let (_, responder) = expect_get(&mut h.products).await.unwrap();
        responder.send(Ok(Some(wig("product_1", Decimal::new(50, 0), 2)))).unwrap();

        // stock sold elsewhere between snapshot and reservation
        let (_, responder) = expect_transaction(&mut h.products).await.unwrap();
        responder
            .send(Err(FrameworkError::Entity(crate::product_actor::ProductError::InsufficientStock {
                product_id: "product_1".into(),
                requested: 2,
                available: 1,
            })))
            .unwrap();

        let err = order_task.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            OrderError::InsufficientStock {
                product_id: "product_1".into(),
                requested: 2,
                available: 1
            }
        );
        assert!(h.orders.try_recv().is_err());
    }

    #[tokio::test]
    async fn order_number_conflicts_are_retried_then_compensated() {
        let mut h = harness();
        let client = h.client.clone();
        let order_task = tokio::spawn(async move {
            client
                .create_order(
                    &Actor::customer("user_1"),
                    checkout(vec![LineRequest::new("product_1", 1), LineRequest::new("product_2", 2)]),
                )
                .await
        });

        let (_, responder) = expect_get(&mut h.users).await.unwrap();
        responder.send(Ok(Some(customer("user_1")))).unwrap();
        for stock in [5, 5] {
            let (id, responder) = expect_get(&mut h.products).await.unwrap();
            responder.send(Ok(Some(wig(&id, Decimal::new(20, 0), stock)))).unwrap();
        }
        let (_, responder) = expect_transaction(&mut h.products).await.unwrap();
        responder
            .send(Ok(vec![ProductActionResult::ReserveStock(4), ProductActionResult::ReserveStock(3)]))
            .unwrap();

        let mut numbers = Vec::new();
        for _ in 0..crate::clients::MAX_ORDER_NUMBER_ATTEMPTS {
            let (payload, responder) = expect_create(&mut h.orders).await.unwrap();
            numbers.push(payload.order_number.clone());
            responder.send(Err(FrameworkError::Conflict(payload.order_number))).unwrap();
        }
        numbers.dedup();
        assert_eq!(numbers.len(), crate::clients::MAX_ORDER_NUMBER_ATTEMPTS);

        // reservation is handed back in one transaction
        let (filter, responder) = expect_list(&mut h.products).await.unwrap();
        let catalog = vec![wig("product_1", Decimal::new(20, 0), 4), wig("product_2", Decimal::new(20, 0), 3)];
        responder
            .send(Ok(catalog.into_iter().filter(|product| filter(product)).collect()))
            .unwrap();
        let (actions, responder) = expect_transaction(&mut h.products).await.unwrap();
        assert_eq!(
            actions,
            vec![
                ("product_1".to_string(), ProductAction::ReleaseStock(1)),
                ("product_2".to_string(), ProductAction::ReleaseStock(2)),
            ]
        );
        responder
            .send(Ok(vec![ProductActionResult::ReleaseStock(5), ProductActionResult::ReleaseStock(5)]))
            .unwrap();

        let err = order_task.await.unwrap().unwrap_err();
        assert!(matches!(err, OrderError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn cancel_surfaces_a_release_that_was_not_applied() {
        let mut h = harness();
        let client = h.client.clone();
        let cancel_task = tokio::spawn(async move {
            client
                .cancel_order(&Actor::customer("user_1"), "order_1".into(), None)
                .await
        });

        // Access check
        let placed = order("order_1", "user_1", &[("product_1", 2), ("product_2", 1)]);
        let (id, responder) = expect_get(&mut h.orders).await.expect("Expected Order Get");
        assert_eq!(id, "order_1");
        responder.send(Ok(Some(placed.clone()))).unwrap();

        // Transition inside the order actor
        let (id, action, responder) = expect_action(&mut h.orders).await.expect("Expected Order Action");
        assert_eq!(id, "order_1");
        let OrderAction::Transition { status, note, .. } = &action;
        assert_eq!(*status, OrderStatus::Cancelled);
        assert_eq!(note, "Cancelled by customer");
        let mut stored = placed;
        responder.send(Ok(stored.handle_action(action).unwrap())).unwrap();

        // Release goes out as one transaction; the actor dies before answering
        let (_, responder) = expect_list(&mut h.products).await.expect("Expected Product List");
        responder
            .send(Ok(vec![wig("product_1", Decimal::new(20, 0), 0), wig("product_2", Decimal::new(20, 0), 0)]))
            .unwrap();
        let (actions, responder) = expect_transaction(&mut h.products)
            .await
            .expect("Expected Product Transaction");
        assert_eq!(actions.len(), 2);
        drop(responder);

        let err = cancel_task.await.unwrap().unwrap_err();
        assert!(matches!(err, OrderError::ActorCommunicationError(_)), "{err:?}");
        assert!(h.products.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_before_touching_the_catalog() {
        let mut h = harness();
        let client = h.client.clone();
        let order_task = tokio::spawn(async move {
            client
                .create_order(&Actor::customer("ghost"), checkout(vec![LineRequest::new("product_1", 1)]))
                .await
        });

        let (_, responder) = expect_get(&mut h.users).await.unwrap();
        responder.send(Ok(None)).unwrap();

        let err = order_task.await.unwrap().unwrap_err();
        assert_eq!(err, OrderError::NotFound("User ghost".into()));
        assert!(h.products.try_recv().is_err());
    }
}

mod end_to_end {
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use crate::app_system::{AppConfig, OrderSystem};
    use crate::clients::{CheckoutRequest, StatusChange};
    use crate::domain::{
        Actor, Category, Coupon, CouponKind, OrderStatus, PaymentMethod, PaymentRequest, PaymentStatus,
        ProductCreate, ShippingDetails, UserCreate,
    };
    use crate::mock_framework::address;
    use crate::notifications::testing::RecordingNotifier;
    use crate::notifications::Notification;
    use crate::order_actor::OrderError;
    use crate::pricing::LineRequest;
    use crate::queries::{OrderFilter, PageRequest};

    struct Store {
        system: OrderSystem,
        customer: Actor,
        admin: Actor,
        notifier: Arc<RecordingNotifier>,
    }

    async fn store() -> Store {
        let notifier = Arc::new(RecordingNotifier::default());
        let system = OrderSystem::with_notifier(&AppConfig::default(), notifier.clone());
        let customer = system
            .user_client
            .create_user(UserCreate::customer("Ada", "ada@example.com"))
            .await
            .unwrap();
        let admin = system
            .user_client
            .create_user(UserCreate::admin("Admin", "admin@example.com"))
            .await
            .unwrap();
        Store {
            system,
            customer: Actor::customer(customer),
            admin: Actor::admin(admin),
            notifier,
        }
    }

    async fn product(store: &Store, name: &str, price: Decimal, stock: u32) -> String {
        store
            .system
            .product_client
            .create_product(ProductCreate::new(name, Category::FemaleWigs, price, stock).with_sku(format!("SKU-{}", name)))
            .await
            .unwrap()
    }

    fn checkout(lines: Vec<LineRequest>, coupon: Option<Coupon>) -> CheckoutRequest {
        CheckoutRequest {
            items: lines,
            shipping_address: address(),
            billing_address: None,
            payment_info: PaymentRequest {
                method: PaymentMethod::CreditCard,
                transaction_id: Some("txn_1".into()),
                status: PaymentStatus::Completed,
            },
            coupon,
            customer_note: None,
        }
    }

    async fn stock(store: &Store, id: &str) -> u32 {
        store.system.product_client.check_stock(id.to_string()).await.unwrap()
    }

    #[tokio::test]
    async fn checkout_prices_and_reserves() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(50, 0), 5).await;

        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig.clone(), 3)], None))
            .await
            .unwrap();

        assert_eq!(order.pricing.items_total, Decimal::new(15000, 2));
        assert_eq!(order.pricing.tax, Decimal::new(1200, 2));
        assert_eq!(order.pricing.shipping, Decimal::ZERO);
        assert_eq!(order.pricing.discount, Decimal::ZERO);
        assert_eq!(order.pricing.grand_total, Decimal::new(16200, 2));
        assert_eq!(order.payment_info.amount, order.pricing.grand_total);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.history.len(), 1);
        assert_eq!(order.history[0].actor, s.customer.user_id);
        assert_eq!(order.billing_address, order.shipping_address);
        assert_eq!(stock(&s, &wig).await, 2);
    }

    #[tokio::test]
    async fn fixed_coupon_checkout() {
        let s = store().await;
        let wig = product(&s, "pixie", Decimal::new(50, 0), 5).await;
        let coupon = Coupon {
            code: "SAVE20".into(),
            value: Decimal::new(20, 0),
            kind: CouponKind::Fixed,
        };

        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig, 1)], Some(coupon)))
            .await
            .unwrap();
        assert_eq!(order.pricing.grand_total, Decimal::new(4400, 2));
        assert_eq!(order.coupon.map(|c| c.code), Some("SAVE20".to_string()));
    }

    #[tokio::test]
    async fn cancellation_restores_stock_and_appends_history() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(50, 0), 5).await;
        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig.clone(), 3)], None))
            .await
            .unwrap();

        let cancelled = s
            .system
            .order_client
            .cancel_order(&s.customer, order.id.clone(), None)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.history.len(), 2);
        assert_eq!(cancelled.history[0], order.history[0]);
        assert_eq!(cancelled.history[1].note, "Cancelled by customer");
        assert_eq!(stock(&s, &wig).await, 5);

        let err = s
            .system
            .order_client
            .cancel_order(&s.customer, order.id, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Cancelled
            }
        );
        assert_eq!(stock(&s, &wig).await, 5);
    }

    #[tokio::test]
    async fn concurrent_cancels_release_stock_once() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(50, 0), 5).await;
        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig.clone(), 3)], None))
            .await
            .unwrap();

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let client = s.system.order_client.clone();
                let actor = if i % 2 == 0 { s.customer.clone() } else { s.admin.clone() };
                let id = order.id.clone();
                tokio::spawn(async move { client.cancel_order(&actor, id, None).await })
            })
            .collect();

        let mut succeeded = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 1);
        assert_eq!(stock(&s, &wig).await, 5);
    }

    #[tokio::test]
    async fn admin_walks_order_to_delivery() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(50, 0), 5).await;
        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig.clone(), 1)], None))
            .await
            .unwrap();
        let orders = &s.system.order_client;

        let err = orders
            .update_status(&s.customer, order.id.clone(), StatusChange::to(OrderStatus::Confirmed))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));

        let err = orders
            .update_status(&s.admin, order.id.clone(), StatusChange::to(OrderStatus::Shipped))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { .. }));

        orders
            .update_status(&s.admin, order.id.clone(), StatusChange::to(OrderStatus::Confirmed))
            .await
            .unwrap();
        orders
            .update_status(&s.admin, order.id.clone(), StatusChange::to(OrderStatus::Processing))
            .await
            .unwrap();
        let shipped = orders
            .update_status(
                &s.admin,
                order.id.clone(),
                StatusChange::to(OrderStatus::Shipped)
                    .with_note("Out the door")
                    .with_shipping(ShippingDetails {
                        carrier: Some("DHL".into()),
                        tracking_number: Some("JD0001".into()),
                        estimated_delivery: None,
                    }),
            )
            .await
            .unwrap();
        assert!(shipped.shipping_info.shipped_at.is_some());
        assert_eq!(shipped.shipping_info.tracking_number.as_deref(), Some("JD0001"));

        let err = orders
            .cancel_order(&s.customer, order.id.clone(), Some("Changed my mind".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { from: OrderStatus::Shipped, .. }));

        let delivered = orders
            .update_status(&s.admin, order.id.clone(), StatusChange::to(OrderStatus::Delivered))
            .await
            .unwrap();
        assert!(delivered.shipping_info.actual_delivery.is_some());
        let trail: Vec<OrderStatus> = delivered.history.iter().map(|entry| entry.status).collect();
        assert_eq!(
            trail,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Processing,
                OrderStatus::Shipped,
                OrderStatus::Delivered
            ]
        );
        assert_eq!(delivered.history[3].note, "Out the door");
        assert_eq!(stock(&s, &wig).await, 4);

        let err = orders
            .cancel_order(&s.customer, order.id.clone(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { from: OrderStatus::Delivered, .. }));
        let unchanged = orders.get_order_for(&s.customer, order.id.clone()).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Delivered);
        assert_eq!(unchanged.history.len(), 5);
        assert_eq!(stock(&s, &wig).await, 4);

        let stats = s.system.queries.dashboard_stats(&s.admin).await.unwrap();
        assert_eq!(stats.total_revenue, delivered.pricing.grand_total);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_products, 1);
    }

    #[tokio::test]
    async fn admin_cancellation_restores_stock() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(50, 0), 5).await;
        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig.clone(), 2)], None))
            .await
            .unwrap();

        let cancelled = s
            .system
            .order_client
            .update_status(
                &s.admin,
                order.id,
                StatusChange::to(OrderStatus::Cancelled).with_note("Fraud check failed"),
            )
            .await
            .unwrap();
        assert_eq!(cancelled.history[1].actor, s.admin.user_id);
        assert_eq!(stock(&s, &wig).await, 5);
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_cancel() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(50, 0), 5).await;
        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig.clone(), 1)], None))
            .await
            .unwrap();

        let stranger = Actor::customer("user_42");
        let err = s
            .system
            .order_client
            .cancel_order(&stranger, order.id.clone(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));
        assert_eq!(stock(&s, &wig).await, 4);

        let err = s
            .system
            .order_client
            .get_order_for(&stranger, "order_999".into())
            .await
            .unwrap_err();
        assert_eq!(err, OrderError::NotFound("Order order_999".into()));
    }

    #[tokio::test]
    async fn failed_checkout_leaves_stock_untouched() {
        let s = store().await;
        let plenty = product(&s, "plenty", Decimal::new(10, 0), 10).await;
        let scarce = product(&s, "scarce", Decimal::new(10, 0), 1).await;

        let err = s
            .system
            .order_client
            .create_order(
                &s.customer,
                checkout(vec![LineRequest::new(plenty.clone(), 2), LineRequest::new(scarce.clone(), 2)], None),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { available: 1, .. }));
        assert_eq!(stock(&s, &plenty).await, 10);
        assert_eq!(stock(&s, &scarce).await, 1);

        let mut bad_address = checkout(vec![LineRequest::new(plenty.clone(), 1)], None);
        bad_address.shipping_address.zip_code.clear();
        let err = s
            .system
            .order_client
            .create_order(&s.customer, bad_address)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidInput(_)));
        assert_eq!(stock(&s, &plenty).await, 10);

        let page = s.system.queries.list_for_user(&s.customer, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn listings_paginate_newest_first() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(10, 0), 100).await;
        let other = Actor::customer(
            s.system
                .user_client
                .create_user(UserCreate::customer("Grace", "grace@example.com"))
                .await
                .unwrap(),
        );

        let mut placed = Vec::new();
        for quantity in 1..=5 {
            let order = s
                .system
                .order_client
                .create_order(&s.customer, checkout(vec![LineRequest::new(wig.clone(), quantity)], None))
                .await
                .unwrap();
            placed.push(order.id);
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        s.system
            .order_client
            .create_order(&other, checkout(vec![LineRequest::new(wig.clone(), 1)], None))
            .await
            .unwrap();

        let page = s
            .system
            .queries
            .list_for_user(&s.customer, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.count, 2);
        let ids: Vec<&str> = page.orders.iter().map(|order| order.id.as_str()).collect();
        assert_eq!(ids, vec![placed[2].as_str(), placed[1].as_str()]);

        let err = s
            .system
            .queries
            .list_all(&s.customer, OrderFilter::default(), PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));

        let all = s
            .system
            .queries
            .list_all(&s.admin, OrderFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.page.total, 6);
        assert_eq!(all.stats.total_orders, 6);
        let revenue: Decimal = all.page.orders.iter().map(|order| order.pricing.grand_total).sum();
        assert_eq!(all.stats.total_revenue, revenue);

        let recent = s.system.queries.recent_orders(&s.admin, None).await.unwrap();
        assert_eq!(recent.len(), 5);

        let low = s.system.queries.low_stock_products(&s.admin, Some(100)).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].stock, 100 - 16);
    }

    #[tokio::test]
    async fn notifications_follow_order_events() {
        let s = store().await;
        let wig = product(&s, "bob", Decimal::new(50, 0), 5).await;
        let order = s
            .system
            .order_client
            .create_order(&s.customer, checkout(vec![LineRequest::new(wig, 1)], None))
            .await
            .unwrap();
        s.system
            .order_client
            .update_status(&s.admin, order.id.clone(), StatusChange::to(OrderStatus::Confirmed))
            .await
            .unwrap();

        for _ in 0..50 {
            if s.notifier.sent.lock().len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let sent = s.notifier.sent.lock().clone();
        assert!(sent.contains(&Notification::order_created(&order)));
        assert!(sent.iter().any(|n| matches!(
            n,
            Notification::StatusChanged { status: OrderStatus::Confirmed, .. }
        )));
    }

    #[tokio::test]
    async fn system_shuts_down_cleanly() {
        let s = store().await;
        s.system.ensure_admin("admin@example.com").await.unwrap();
        s.system.shutdown().await.unwrap();
    }
}
