// src/store/memory.rs
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{decode_last_key, encode_last_key, ProductStore, ScanPage, StoreError};
use crate::models::product::{Product, ProductPatch};

/// In-memory store with the same contract as the Postgres backend.
/// A `BTreeMap` keeps records in primary-key order so scan pagination
/// behaves identically. Used by the test suite.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    items: RwLock<BTreeMap<String, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Product>> {
        self.items.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Product>> {
        self.items.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn scan(&self, limit: usize, start_after: Option<&str>) -> Result<ScanPage, StoreError> {
        let start = match start_after {
            Some(token) => Bound::Excluded(decode_last_key(token)?),
            None => Bound::Unbounded,
        };

        let items: Vec<Product> = self
            .read()
            .range((start, Bound::Unbounded))
            .take(limit)
            .map(|(_, p)| p.clone())
            .collect();

        // A full page may have more behind it; a short page is the end.
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
        Ok(self.read().get(product_id).cloned())
    }

    async fn put(&self, product: &Product) -> Result<(), StoreError> {
        self.write()
            .insert(product.product_id.clone(), product.clone());
        Ok(())
    }

    async fn update(
        &self,
        product_id: &str,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut items = self.write();
        let Some(product) = items.get_mut(product_id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            product.name = name.clone();
        }
        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(category) = &patch.category {
            product.category = category.clone();
        }
        if let Some(active) = patch.active {
            product.active = active;
        }
        if let Some(updated_at) = patch.updated_at {
            product.updated_at = Some(updated_at);
        }

        Ok(Some(product.clone()))
    }

    async fn delete(&self, product_id: &str) -> Result<(), StoreError> {
        self.write().remove(product_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn product(id: &str) -> Product {
        Product {
            product_id: id.to_string(),
            name: format!("product {id}"),
            description: String::new(),
            price: Decimal::from_str("5.00").unwrap(),
            stock: 10,
            category: String::new(),
            sku: String::new(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn scan_pages_visit_every_record_once() {
        let store = MemoryProductStore::new();
        for i in 0..25 {
            store.put(&product(&format!("p{i:03}"))).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = store.scan(10, token.as_deref()).await.unwrap();
            seen.extend(page.items.into_iter().map(|p| p.product_id));
            match page.last_key {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        assert_eq!(seen.len(), 25);
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, seen);
    }

    #[tokio::test]
    async fn scan_rejects_malformed_token() {
        let store = MemoryProductStore::new();
        let err = store.scan(10, Some("not json")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn put_replaces_existing_record() {
        let store = MemoryProductStore::new();
        store.put(&product("p1")).await.unwrap();

        let mut replacement = product("p1");
        replacement.name = "renamed".into();
        store.put(&replacement).await.unwrap();

        let fetched = store.get("p1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "renamed");
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let store = MemoryProductStore::new();
        store.put(&product("p1")).await.unwrap();

        let patch = ProductPatch {
            stock: Some(3),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        let updated = store.update("p1", &patch).await.unwrap().unwrap();

        assert_eq!(updated.stock, 3);
        assert_eq!(updated.name, "product p1");
        assert_eq!(updated.price, Decimal::from_str("5.00").unwrap());
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_missing_key_returns_none() {
        let store = MemoryProductStore::new();
        let patch = ProductPatch {
            stock: Some(3),
            ..Default::default()
        };
        assert!(store.update("ghost", &patch).await.unwrap().is_none());
    }
}
