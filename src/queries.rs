//! Read-side views over orders: paginated listings, revenue stats and the
//! admin dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::domain::{Actor, Order, OrderStatus, Product};
use crate::order_actor::OrderError;

pub const USER_PAGE_SIZE: u32 = 10;
pub const ADMIN_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const RECENT_ORDERS_LIMIT: usize = 5;
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Raw paging parameters as they arrive on a query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    #[serde(alias = "pageSize")]
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Page (at least 1) and page size (1 to 100).
    pub fn resolve(self, default_size: u32) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let size = self.limit.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE);
        (page, size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub count: usize,
    pub total: usize,
    pub total_pages: u32,
    pub current_page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
    pub total_orders: usize,
}

impl OrderStats {
    fn over(orders: &[Order]) -> Self {
        let total_revenue: Decimal = orders.iter().map(|order| order.pricing.grand_total).sum();
        let avg_order_value = if orders.is_empty() {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(orders.len()))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };
        Self {
            total_revenue,
            avg_order_value,
            total_orders: orders.len(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    #[serde(alias = "startDate")]
    pub from: Option<DateTime<Utc>>,
    #[serde(alias = "endDate")]
    pub to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |status| order.status == status)
            && self.from.map_or(true, |from| order.created_at >= from)
            && self.to.map_or(true, |to| order.created_at <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderPage {
    #[serde(flatten)]
    pub page: OrderPage,
    pub stats: OrderStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_orders: usize,
    pub total_users: usize,
    pub total_revenue: Decimal,
}

#[derive(Clone)]
pub struct OrderQueryService {
    orders: OrderClient,
    products: ProductClient,
    users: UserClient,
}

impl OrderQueryService {
    pub fn new(orders: OrderClient, products: ProductClient, users: UserClient) -> Self {
        Self {
            orders,
            products,
            users,
        }
    }

    /// The caller's own orders, newest first.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_for_user(&self, actor: &Actor, page: PageRequest) -> Result<OrderPage, OrderError> {
        let owner = actor.user_id.clone();
        let orders = self.orders.list_orders(move |order| order.user_id == owner).await?;
        Ok(paginate(newest_first(orders), page.resolve(USER_PAGE_SIZE)))
    }

    /// Every order matching `filter`, with stats over the whole filtered set.
    #[instrument(skip(self, actor, filter), fields(user_id = %actor.user_id))]
    pub async fn list_all(
        &self,
        actor: &Actor,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<AdminOrderPage, OrderError> {
        require_admin(actor)?;
        let orders = newest_first(self.orders.list_orders(move |order| filter.matches(order)).await?);
        let stats = OrderStats::over(&orders);
        debug!(total = orders.len(), "Orders listed");
        Ok(AdminOrderPage {
            page: paginate(orders, page.resolve(ADMIN_PAGE_SIZE)),
            stats,
        })
    }

    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats, OrderError> {
        require_admin(actor)?;
        let (products, orders, users) = tokio::try_join!(
            async { self.products.list_products(|_| true).await.map_err(OrderError::from) },
            self.orders.list_orders(|_| true),
            async { self.users.list_users(|_| true).await.map_err(OrderError::from) },
        )?;
        let total_revenue = orders
            .iter()
            .filter(|order| order.status.counts_as_revenue())
            .map(|order| order.pricing.grand_total)
            .sum();
        Ok(DashboardStats {
            total_products: products.len(),
            total_orders: orders.len(),
            total_users: users.len(),
            total_revenue,
        })
    }

    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn recent_orders(&self, actor: &Actor, limit: Option<usize>) -> Result<Vec<Order>, OrderError> {
        require_admin(actor)?;
        let limit = limit.filter(|limit| *limit > 0).unwrap_or(RECENT_ORDERS_LIMIT);
        let mut orders = newest_first(self.orders.list_orders(|_| true).await?);
        orders.truncate(limit);
        Ok(orders)
    }

    /// Products with fewer than `threshold` units, scarcest first.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn low_stock_products(&self, actor: &Actor, threshold: Option<u32>) -> Result<Vec<Product>, OrderError> {
        require_admin(actor)?;
        let threshold = threshold.filter(|threshold| *threshold > 0).unwrap_or(LOW_STOCK_THRESHOLD);
        let mut products = self.products.list_products(move |product| product.stock < threshold).await?;
        products.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));
        Ok(products)
    }
}

fn require_admin(actor: &Actor) -> Result<(), OrderError> {
    if actor.is_admin() {
        Ok(())
    } else {
        warn!(user_id = %actor.user_id, "Admin view denied");
        Err(OrderError::Forbidden("Admin access required".into()))
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.order_number.cmp(&a.order_number))
    });
    orders
}

fn paginate(orders: Vec<Order>, (page, size): (u32, u32)) -> OrderPage {
    let total = orders.len();
    let total_pages = total.div_ceil(size as usize) as u32;
    let skip = (page as usize - 1).saturating_mul(size as usize);
    let orders: Vec<Order> = orders.into_iter().skip(skip).take(size as usize).collect();
    OrderPage {
        count: orders.len(),
        orders,
        total,
        total_pages,
        current_page: page,
    }
}
