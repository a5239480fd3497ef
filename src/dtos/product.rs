// src/dtos/product.rs
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::models::product::Product;

/// Create body. Every field is optional at the serde level so the
/// handler can report exactly which required field is missing instead
/// of returning a generic deserialization error. `price` and `stock`
/// arrive as raw JSON values and are coerced (numbers or numeric
/// strings are both accepted).
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub stock: Option<Value>,
    pub category: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub stock: Option<Value>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.active.is_none()
    }
}

/// Coerce a JSON value into an exact decimal. Numbers go through their
/// decimal string representation so `9.90` stays `9.90`, not the
/// nearest binary float.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub sku: String,
    pub active: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// Convert from Model to Response DTO; prices degrade to floats on the
// wire, as the frontend expects plain JSON numbers.
impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.product_id,
            name: product.name,
            description: product.description,
            price: product.price.to_f64().unwrap_or_default(),
            stock: product.stock,
            category: product.category,
            sku: product.sku,
            active: product.active,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub products: Vec<ProductResponse>,
    pub count: usize,
    #[serde(rename = "lastKey")]
    pub last_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateProductResponse {
    pub message: String,
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateProductResponse {
    pub message: String,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn decimal_from_json_number_is_exact() {
        let d = coerce_decimal(&json!(9.90)).unwrap();
        assert_eq!(d, Decimal::from_str("9.90").unwrap());
    }

    #[test]
    fn decimal_from_numeric_string() {
        let d = coerce_decimal(&json!("12.50")).unwrap();
        assert_eq!(d, Decimal::from_str("12.50").unwrap());
    }

    #[test]
    fn decimal_rejects_garbage() {
        assert!(coerce_decimal(&json!("not a price")).is_none());
        assert!(coerce_decimal(&json!(["9.90"])).is_none());
        assert!(coerce_decimal(&json!(null)).is_none());
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce_integer(&json!(100)), Some(100));
        assert_eq!(coerce_integer(&json!("42")), Some(42));
        assert_eq!(coerce_integer(&json!(9.5)), None);
        assert_eq!(coerce_integer(&json!(true)), None);
    }

    #[test]
    fn update_request_emptiness() {
        let empty: UpdateProductRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());

        // sku is not an updatable field and must not count as content
        let sku_only: UpdateProductRequest =
            serde_json::from_value(json!({ "sku": "ABC-1" })).unwrap();
        assert!(sku_only.is_empty());

        let stock_only: UpdateProductRequest =
            serde_json::from_value(json!({ "stock": 50 })).unwrap();
        assert!(!stock_only.is_empty());
    }

    #[test]
    fn response_omits_updated_at_until_first_update() {
        let product = Product {
            product_id: "p1".into(),
            name: "Aspirin".into(),
            description: String::new(),
            price: Decimal::from_str("9.90").unwrap(),
            stock: 100,
            category: String::new(),
            sku: String::new(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        let body = serde_json::to_value(ProductResponse::from(product)).unwrap();
        assert!(body.get("updated_at").is_none());
        assert!(body.get("created_at").is_some());
        assert!((body["price"].as_f64().unwrap() - 9.90).abs() < 1e-9);
    }
}
