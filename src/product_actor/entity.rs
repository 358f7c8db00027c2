use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};

/// Upper bound on a catalog price or discount price
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> &String {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.sku.clone())
    }

    /// Creates a new Product from creation parameters.
    ///
    /// A missing SKU is generated from the category code and the creation time.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        let created_at = Utc::now();
        let sku = match params.sku {
            Some(sku) if !sku.trim().is_empty() => sku.trim().to_string(),
            _ => {
                let stamp = sku_stamp(created_at.timestamp_millis()).rem_euclid(1_000_000);
                format!("VH-{}-{:06}", params.category.sku_code(), stamp)
            }
        };
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            description: params.description,
            category: params.category,
            sku,
            price: params.price,
            discount_price: params.discount_price,
            stock: params.stock,
            colors: params.colors,
            is_active: params.is_active,
            is_featured: params.is_featured,
            created_at,
        })
    }

    fn on_create(&mut self) -> Result<(), ProductError> {
        validate(self)
    }

    /// Applies an admin edit. The product is re-validated as a whole, so a new
    /// price can invalidate an old discount.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if patch.remove_discount {
            self.discount_price = None;
        } else if let Some(discount_price) = patch.discount_price {
            self.discount_price = Some(discount_price);
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(is_featured) = patch.is_featured {
            self.is_featured = is_featured;
        }
        validate(self)
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::ReserveStock(0) | ProductAction::ReleaseStock(0) => {
                Err(ProductError::InvalidQuantity(0))
            }
            ProductAction::ReserveStock(quantity) => {
                if self.stock < quantity {
                    return Err(ProductError::InsufficientStock {
                        product_id: self.id.clone(),
                        requested: quantity,
                        available: self.stock,
                    });
                }
                self.stock -= quantity;
                Ok(ProductActionResult::ReserveStock(self.stock))
            }
            ProductAction::ReleaseStock(quantity) => {
                self.stock = self.stock.saturating_add(quantity);
                Ok(ProductActionResult::ReleaseStock(self.stock))
            }
        }
    }
}

/// Millisecond stamp for generated SKUs. Strictly increasing within the
/// process, so products created in the same millisecond still differ.
fn sku_stamp(now_millis: i64) -> i64 {
    static LAST: AtomicI64 = AtomicI64::new(0);
    let previous = match LAST.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now_millis.max(last + 1))
    }) {
        Ok(previous) | Err(previous) => previous,
    };
    now_millis.max(previous + 1)
}

fn validate(product: &Product) -> Result<(), ProductError> {
    if product.name.is_empty() {
        return Err(ProductError::ValidationError("name is required".into()));
    }
    if product.price < Decimal::ZERO {
        return Err(ProductError::ValidationError("price must not be negative".into()));
    }
    if product.price > MAX_PRICE {
        return Err(ProductError::ValidationError(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, product.price
        )));
    }
    if let Some(discount) = product.discount_price {
        if discount < Decimal::ZERO {
            return Err(ProductError::ValidationError("discount price must not be negative".into()));
        }
        if discount >= product.price {
            return Err(ProductError::ValidationError(
                "discount price must be lower than the base price".into(),
            ));
        }
    }
    if let Some(color) = product.colors.iter().find(|color| !color.has_valid_code()) {
        return Err(ProductError::ValidationError(format!(
            "invalid color code '{}' for {}",
            color.color_code, color.name
        )));
    }
    Ok(())
}
