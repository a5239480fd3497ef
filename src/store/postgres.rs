// src/store/postgres.rs
use async_trait::async_trait;
use sqlx::PgPool;

use super::{decode_last_key, encode_last_key, ProductStore, ScanPage, StoreError};
use crate::models::product::{Product, ProductPatch};

const PRODUCT_COLUMNS: &str =
    "product_id, name, description, price, stock, category, sku, active, created_at, updated_at";

/// Postgres-backed product store. The table is keyed by `product_id`
/// and scanned with keyset pagination in primary-key order, which is
/// what makes the continuation tokens stable between pages.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn scan(&self, limit: usize, start_after: Option<&str>) -> Result<ScanPage, StoreError> {
        let start_key = match start_after {
            Some(token) => Some(decode_last_key(token)?),
            None => None,
        };

        let items = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE $1::TEXT IS NULL OR product_id > $1
             ORDER BY product_id
             LIMIT $2"
        ))
        .bind(start_key)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let last_key = if items.len() == limit && limit > 0 {
            match items.last() {
                Some(p) => Some(encode_last_key(&p.product_id)?),
                None => None,
            }
        } else {
            None
        };

        Ok(ScanPage { items, last_key })
    }

    async fn get(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn put(&self, product: &Product) -> Result<(), StoreError> {
        // Key-value put semantics: an existing row is replaced in full,
        // not merged.
        sqlx::query(
            "INSERT INTO products
                 (product_id, name, description, price, stock, category, sku, active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (product_id) DO UPDATE SET
                 name = EXCLUDED.name,
                 description = EXCLUDED.description,
                 price = EXCLUDED.price,
                 stock = EXCLUDED.stock,
                 category = EXCLUDED.category,
                 sku = EXCLUDED.sku,
                 active = EXCLUDED.active,
                 created_at = EXCLUDED.created_at,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(&product.product_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.category)
        .bind(&product.sku)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(
        &self,
        product_id: &str,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 stock = COALESCE($5, stock),
                 category = COALESCE($6, category),
                 active = COALESCE($7, active),
                 updated_at = COALESCE($8, updated_at)
             WHERE product_id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id)
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.category.as_deref())
        .bind(patch.active)
        .bind(patch.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn delete(&self, product_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
