//! Checkout pricing.
//!
//! Prices a set of requested lines against a catalog snapshot. Everything here
//! is pure: no actor is contacted and nothing is reserved.

use std::collections::HashMap;

use rust_decimal::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Coupon, CouponKind, LineItem, PricingBreakdown, Product};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Upper bound on a single line's quantity
pub const MAX_QUANTITY: u32 = 9999;

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub tax_rate: Decimal,
    /// Orders whose items total strictly exceeds this ship free.
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            free_shipping_threshold: Decimal::new(100, 0),
            flat_shipping_fee: Decimal::new(10, 0),
        }
    }
}

/// One requested line at checkout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    #[serde(alias = "product")]
    pub product_id: String,
    pub quantity: u32,
}

impl LineRequest {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub items: Vec<LineItem>,
    pub pricing: PricingBreakdown,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    #[error("Order must contain at least one item")]
    EmptyOrder,
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Product {0} is not available for sale")]
    InactiveProduct(String),
    #[error("Quantity for product {0} must be at least 1")]
    InvalidQuantity(String),
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn overflow(what: &str) -> PricingError {
    PricingError::InvalidInput(format!("{} exceeds the representable amount", what))
}

#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Prices `lines` against `catalog`.
    ///
    /// Stock is checked against the summed quantity of every line naming the
    /// same product. The coupon discount never exceeds the items total.
    pub fn quote(
        &self,
        lines: &[LineRequest],
        catalog: &HashMap<String, Product>,
        coupon: Option<&Coupon>,
    ) -> Result<Quote, PricingError> {
        if lines.is_empty() {
            return Err(PricingError::EmptyOrder);
        }

        let mut requested: HashMap<&str, u32> = HashMap::new();
        let mut items = Vec::with_capacity(lines.len());

        for line in lines {
            let product = catalog
                .get(&line.product_id)
                .ok_or_else(|| PricingError::ProductNotFound(line.product_id.clone()))?;
            if !product.is_active {
                return Err(PricingError::InactiveProduct(product.id.clone()));
            }
            if line.quantity == 0 {
                return Err(PricingError::InvalidQuantity(product.id.clone()));
            }
            if line.quantity > MAX_QUANTITY {
                return Err(PricingError::InvalidInput(format!(
                    "quantity exceeds maximum allowed ({}), got {}",
                    MAX_QUANTITY, line.quantity
                )));
            }

            let total = requested.entry(product.id.as_str()).or_insert(0);
            *total = total.saturating_add(line.quantity);
            if *total > product.stock {
                return Err(PricingError::InsufficientStock {
                    product_id: product.id.clone(),
                    requested: *total,
                    available: product.stock,
                });
            }

            let unit_price = product.final_price();
            let line_total = unit_price
                .checked_mul(Decimal::from(line.quantity))
                .ok_or_else(|| overflow("line total"))?;
            items.push(LineItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price,
                line_total,
            });
        }

        let items_total = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total))
            .ok_or_else(|| overflow("items total"))?;
        let tax = items_total
            .checked_mul(self.config.tax_rate)
            .map(round_money)
            .ok_or_else(|| overflow("tax"))?;
        let shipping = if items_total > self.config.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.config.flat_shipping_fee
        };
        let discount = match coupon {
            Some(coupon) => self.discount_for(coupon, items_total)?,
            None => Decimal::ZERO,
        };

        let grand_total = items_total
            .checked_add(tax)
            .and_then(|total| total.checked_add(shipping))
            .and_then(|total| total.checked_sub(discount))
            .ok_or_else(|| overflow("grand total"))?;

        Ok(Quote {
            items,
            pricing: PricingBreakdown {
                items_total,
                tax,
                shipping,
                discount,
                grand_total,
            },
        })
    }

    fn discount_for(&self, coupon: &Coupon, items_total: Decimal) -> Result<Decimal, PricingError> {
        if coupon.code.trim().is_empty() {
            return Ok(Decimal::ZERO);
        }
        if coupon.value.is_sign_negative() {
            return Err(PricingError::InvalidCoupon(format!(
                "{} has a negative value",
                coupon.code
            )));
        }
        let discount = match coupon.kind {
            CouponKind::Percentage => {
                if coupon.value > Decimal::ONE_HUNDRED {
                    return Err(PricingError::InvalidCoupon(format!(
                        "{} exceeds 100 percent",
                        coupon.code
                    )));
                }
                items_total
                    .checked_mul(coupon.value)
                    .map(|scaled| round_money(scaled / Decimal::ONE_HUNDRED))
                    .ok_or_else(|| overflow("discount"))?
            }
            CouponKind::Fixed => round_money(coupon.value),
        };
        Ok(discount.min(items_total))
    }
}
