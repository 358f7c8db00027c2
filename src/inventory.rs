//! Stock reservation and release for orders.

use std::collections::HashSet;

use tracing::{info, instrument, warn};

use crate::clients::ProductClient;
use crate::domain::{LineItem, Product};
use crate::product_actor::ProductError;

/// Attempts at `release` when a product is deleted between resolving the
/// catalog and applying the increments.
const RELEASE_ATTEMPTS: usize = 2;

/// A product quantity held by an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: String,
    pub quantity: u32,
}

impl StockLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    pub fn from_items(items: &[LineItem]) -> Vec<StockLine> {
        items
            .iter()
            .map(|item| StockLine::new(item.product_id.clone(), item.quantity))
            .collect()
    }
}

#[derive(Clone)]
pub struct InventoryAdjuster {
    products: ProductClient,
}

impl InventoryAdjuster {
    pub fn new(products: ProductClient) -> Self {
        Self { products }
    }

    /// Decrements stock for every line, or for none of them.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn reserve(&self, lines: &[StockLine]) -> Result<(), ProductError> {
        let pairs = lines
            .iter()
            .map(|line| (line.product_id.clone(), line.quantity))
            .collect();
        self.products.reserve_stock(pairs).await?;
        info!("Stock reserved");
        Ok(())
    }

    /// Returns stock for every line, or for none of them. Products deleted
    /// since the reservation are skipped. Must run at most once per reservation.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn release(&self, lines: &[StockLine]) -> Result<(), ProductError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let pairs = self.still_listed(lines).await?;
            if pairs.is_empty() {
                return Ok(());
            }
            match self.products.release_stock(pairs).await {
                Ok(_) => {
                    info!("Stock released");
                    return Ok(());
                }
                Err(ProductError::NotFound(id)) if attempt < RELEASE_ATTEMPTS => {
                    warn!(product_id = %id, "Product deleted during release, resolving again");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The `(product_id, quantity)` pairs whose product still exists.
    async fn still_listed(&self, lines: &[StockLine]) -> Result<Vec<(String, u32)>, ProductError> {
        let wanted: HashSet<String> = lines.iter().map(|line| line.product_id.clone()).collect();
        let present: HashSet<String> = self
            .products
            .list_products(move |product: &Product| wanted.contains(&product.id))
            .await?
            .into_iter()
            .map(|product| product.id)
            .collect();

        let mut pairs = Vec::with_capacity(lines.len());
        for line in lines {
            if present.contains(&line.product_id) {
                pairs.push((line.product_id.clone(), line.quantity));
            } else {
                warn!(product_id = %line.product_id, quantity = line.quantity, "Product no longer exists, skipping release");
            }
        }
        Ok(pairs)
    }
}
