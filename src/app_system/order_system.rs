use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info};

use super::config::AppConfig;
use super::error::SystemError;
use crate::actor_framework::{sequential_ids, ResourceActor};
use crate::api::ApiState;
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::domain::{Category, ColorVariant, Order, Product, ProductCreate, User, UserCreate};
use crate::notifications::{LogNotifier, Notifier};
use crate::order_number::OrderNumberGenerator;
use crate::pricing::PricingEngine;
use crate::queries::OrderQueryService;
use crate::user_actor::UserError;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub user_client: UserClient,
    pub product_client: ProductClient,
    pub queries: OrderQueryService,
    handles: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
}

impl OrderSystem {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    pub fn with_notifier(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        info!(buffer = config.actor_buffer_size, timeout = ?config.request_timeout, "Starting order system");

        // 1. Leaves: users and products
        let (user_actor, user_resource_client) =
            ResourceActor::<User>::new(config.actor_buffer_size, sequential_ids("user"));
        let user_client = UserClient::new(user_resource_client.with_timeout(config.request_timeout));
        let user_handle = tokio::spawn(user_actor.run());

        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(config.actor_buffer_size, sequential_ids("product"));
        let product_client = ProductClient::new(product_resource_client.with_timeout(config.request_timeout));
        let product_handle = tokio::spawn(product_actor.run());

        // 2. Root: orders, wired to both leaves
        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(config.actor_buffer_size, sequential_ids("order"));
        let order_client = OrderClient::new(
            order_resource_client.with_timeout(config.request_timeout),
            user_client.clone(),
            product_client.clone(),
            PricingEngine::new(config.pricing.clone()),
            Arc::new(OrderNumberGenerator::new(config.order_number_prefix.clone())),
            notifier,
        );
        let order_handle = tokio::spawn(order_actor.run());

        let queries = OrderQueryService::new(order_client.clone(), product_client.clone(), user_client.clone());

        Self {
            order_client,
            user_client,
            product_client,
            queries,
            handles: vec![
                ("orders", order_handle),
                ("products", product_handle),
                ("users", user_handle),
            ],
        }
    }

    pub fn api_state(&self) -> ApiState {
        ApiState {
            orders: self.order_client.clone(),
            products: self.product_client.clone(),
            users: self.user_client.clone(),
            queries: self.queries.clone(),
        }
    }

    /// Creates the admin account unless it already exists.
    pub async fn ensure_admin(&self, email: &str) -> Result<(), SystemError> {
        match self.user_client.create_user(UserCreate::admin("Admin", email)).await {
            Ok(id) => {
                info!(user_id = %id, %email, "Admin account created");
                Ok(())
            }
            Err(UserError::AlreadyExists(_)) => {
                info!(%email, "Admin account already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A demo customer and a handful of catalog entries.
    pub async fn seed_demo_data(&self) -> Result<(), SystemError> {
        let customer = self
            .user_client
            .create_user(UserCreate::customer("Demo Customer", "customer@velvethair.com"))
            .await?;
        info!(user_id = %customer, "Demo customer created");

        let jet_black = ColorVariant {
            name: "Jet Black".into(),
            color_code: "#0A0A0A".into(),
            is_available: true,
        };
        let mut lace_front = ProductCreate::new("Silky Lace Front", Category::FemaleWigs, Decimal::new(18999, 2), 25)
            .with_discount(Decimal::new(14999, 2));
        lace_front.colors = vec![jet_black];
        lace_front.is_featured = true;

        let catalog = [
            lace_front,
            ProductCreate::new("Classic Crew Cut", Category::MaleWigs, Decimal::new(8950, 2), 12),
            ProductCreate::new("Wig Grip Band", Category::Accessories, Decimal::new(1299, 2), 8),
            ProductCreate::new("Synthetic Wig Shampoo", Category::CareProducts, Decimal::new(1650, 2), 40),
        ];
        for params in catalog {
            let id = self.product_client.create_product(params).await?;
            info!(product_id = %id, "Demo product created");
        }
        Ok(())
    }

    /// Closes the root actor first, then the leaves, and waits for each task.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        // Actors stop once every client handle is gone
        drop(self.queries);
        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);

        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(actor = name, "Actor task failed: {:?}", e);
                return Err(e.into());
            }
            info!(actor = name, "Actor stopped");
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
