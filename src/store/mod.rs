// src/store/mod.rs
//
// The catalog persists in an external key-value style store. Handlers
// only ever see the five primitive operations below; the concrete
// engine (Postgres in production, an in-memory map in tests) stays
// behind the trait.
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::product::{Product, ProductPatch};

pub use memory::MemoryProductStore;
pub use postgres::PgProductStore;

#[derive(Debug)]
pub enum StoreError {
    /// The pagination token could not be decoded.
    InvalidToken(serde_json::Error),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidToken(err)
    }
}

/// One page of a table scan. `last_key` is the opaque continuation
/// token; `None` means the scan reached the end of the table.
#[derive(Debug)]
pub struct ScanPage {
    pub items: Vec<Product>,
    pub last_key: Option<String>,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Bounded scan in primary-key order, resuming after `start_after`
    /// when given.
    async fn scan(&self, limit: usize, start_after: Option<&str>) -> Result<ScanPage, StoreError>;

    async fn get(&self, product_id: &str) -> Result<Option<Product>, StoreError>;

    /// Unconditional write: an existing record under the same key is
    /// replaced wholesale.
    async fn put(&self, product: &Product) -> Result<(), StoreError>;

    /// Attribute-level partial update. Returns the full post-update
    /// record, or `None` when the key does not exist.
    async fn update(
        &self,
        product_id: &str,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    async fn delete(&self, product_id: &str) -> Result<(), StoreError>;
}

/// Continuation tokens are JSON on the wire but opaque to callers; the
/// shape is private to the store layer.
#[derive(Debug, Serialize, Deserialize)]
struct LastKey {
    product_id: String,
}

fn encode_last_key(product_id: &str) -> Result<String, StoreError> {
    let token = serde_json::to_string(&LastKey {
        product_id: product_id.to_string(),
    })?;
    Ok(token)
}

fn decode_last_key(token: &str) -> Result<String, StoreError> {
    let key: LastKey = serde_json::from_str(token)?;
    Ok(key.product_id)
}
