use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog section a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    MaleWigs,
    FemaleWigs,
    Accessories,
    CareProducts,
}

impl Category {
    /// Three-letter code used in generated SKUs.
    pub fn sku_code(self) -> &'static str {
        match self {
            Category::MaleWigs => "MAL",
            Category::FemaleWigs => "FEM",
            Category::Accessories => "ACC",
            Category::CareProducts => "CAR",
        }
    }
}

/// One color a product is offered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    pub name: String,
    pub color_code: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl ColorVariant {
    /// `#RGB` or `#RRGGBB`.
    pub fn has_valid_code(&self) -> bool {
        match self.color_code.strip_prefix('#') {
            Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => false,
        }
    }
}

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub sku: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: u32,
    pub colors: Vec<ColorVariant>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The discount price when one is set below the base price, otherwise the base price.
    pub fn final_price(&self) -> Decimal {
        match self.discount_price {
            Some(discount) if discount < self.price => discount,
            _ => self.price,
        }
    }

    /// Whole-number percentage saved by the discount price, 0 without one.
    pub fn discount_percentage(&self) -> u32 {
        match self.discount_price {
            Some(discount) if discount < self.price && self.price > Decimal::ZERO => {
                ((self.price - discount) / self.price * Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_u32()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// A product as the catalog routes render it, with its derived prices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub final_price: Decimal,
    pub discount_percentage: u32,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            final_price: product.final_price(),
            discount_percentage: product.discount_percentage(),
            product,
        }
    }
}

/// Params for creating a new product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub colors: Vec<ColorVariant>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, category: Category, price: Decimal, stock: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            sku: None,
            price,
            discount_price: None,
            stock,
            colors: Vec::new(),
            is_active: true,
            is_featured: false,
        }
    }

    pub fn with_discount(mut self, discount_price: Decimal) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }
}

/// Partial product update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub remove_discount: bool,
    pub stock: Option<u32>,
    pub colors: Option<Vec<ColorVariant>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

fn default_true() -> bool {
    true
}
