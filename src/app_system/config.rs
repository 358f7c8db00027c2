use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::actor_framework::DEFAULT_REQUEST_TIMEOUT;
use crate::pricing::PricingConfig;

/// Service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Upper bound on every actor request
    pub request_timeout: Duration,
    /// Mailbox size of each resource actor
    pub actor_buffer_size: usize,
    pub order_number_prefix: String,
    pub pricing: PricingConfig,
    /// Email of the admin account created at startup
    pub admin_email: String,
    /// Seed a demo customer and a few products at startup
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 3000,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            actor_buffer_size: 32,
            order_number_prefix: "VH".to_string(),
            pricing: PricingConfig::default(),
            admin_email: "admin@velvethair.com".to_string(),
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_port: env_or("HTTP_PORT", defaults.http_port),
            request_timeout: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            actor_buffer_size: env_or("ACTOR_BUFFER_SIZE", defaults.actor_buffer_size).max(1),
            order_number_prefix: std::env::var("ORDER_NUMBER_PREFIX")
                .ok()
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or(defaults.order_number_prefix),
            pricing: PricingConfig {
                tax_rate: env_or::<Decimal>("TAX_RATE", defaults.pricing.tax_rate),
                free_shipping_threshold: env_or("FREE_SHIPPING_THRESHOLD", defaults.pricing.free_shipping_threshold),
                flat_shipping_fee: env_or("FLAT_SHIPPING_FEE", defaults.pricing.flat_shipping_fee),
            },
            admin_email: std::env::var("DEFAULT_ADMIN_EMAIL")
                .ok()
                .filter(|email| !email.trim().is_empty())
                .unwrap_or(defaults.admin_email),
            seed_demo_data: std::env::var("SEED_DEMO_DATA")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.seed_demo_data),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
