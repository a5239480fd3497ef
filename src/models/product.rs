use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// A catalog record as it lives in the store. Prices stay exact
/// (`Decimal`) until they cross the wire.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    pub category: String,
    pub sku: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update: only `Some` fields are written. `sku`, `product_id`
/// and `created_at` are immutable after create.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
