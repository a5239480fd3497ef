// src/handlers/product.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, instrument};

use crate::dtos::product::{
    coerce_decimal, coerce_integer, CreateProductRequest, CreateProductResponse,
    ListProductsResponse, MessageResponse, ProductResponse, UpdateProductRequest,
    UpdateProductResponse,
};
use crate::error::AppError;
use crate::models::product::{Product, ProductPatch};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    #[serde(rename = "lastKey")]
    pub last_key: Option<String>,
}

/// `limit` arrives as a raw query string; unset, empty or zero fall
/// back to the default page size, anything above the cap clamps.
fn page_limit(raw: Option<&str>) -> Result<usize, AppError> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_PAGE_SIZE);
    };
    let parsed: usize = raw
        .parse()
        .map_err(|_| AppError::validation("limit must be an integer"))?;
    if parsed == 0 {
        Ok(DEFAULT_PAGE_SIZE)
    } else {
        Ok(parsed.min(MAX_PAGE_SIZE))
    }
}

// GET /products - List products with pagination
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListProductsResponse>, AppError> {
    let limit = page_limit(query.limit.as_deref())?;

    match state.store.scan(limit, query.last_key.as_deref()).await {
        Ok(page) => {
            let count = page.items.len();
            state.metrics.products_listed(count as u64);
            Ok(Json(ListProductsResponse {
                products: page.items.into_iter().map(ProductResponse::from).collect(),
                count,
                last_key: page.last_key,
            }))
        }
        Err(e) => {
            error!(?e, "Failed to list products");
            state.metrics.operation_error("list");
            Err(AppError::internal("Failed to list products"))
        }
    }
}

// GET /products/{product_id} - Get single product
#[instrument(skip(state))]
pub async fn get_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ProductResponse>, AppError> {
    if product_id.trim().is_empty() {
        return Err(AppError::validation("product_id is required"));
    }

    match state.store.get(&product_id).await {
        Ok(Some(product)) => {
            state.metrics.product_fetched();
            Ok(Json(ProductResponse::from(product)))
        }
        Ok(None) => {
            state.metrics.product_not_found();
            Err(AppError::not_found("Product not found"))
        }
        Err(e) => {
            error!(?e, "Failed to fetch product");
            state.metrics.operation_error("get");
            Err(AppError::internal("Failed to fetch product"))
        }
    }
}

// POST /products - Create new product
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<CreateProductResponse>), AppError> {
    let product_id = payload
        .product_id
        .ok_or_else(|| AppError::validation("product_id is required"))?;
    let name = payload
        .name
        .ok_or_else(|| AppError::validation("name is required"))?;
    let raw_price = payload
        .price
        .ok_or_else(|| AppError::validation("price is required"))?;
    let raw_stock = payload
        .stock
        .ok_or_else(|| AppError::validation("stock is required"))?;

    let price =
        coerce_decimal(&raw_price).ok_or_else(|| AppError::validation("Invalid product data"))?;
    let stock =
        coerce_integer(&raw_stock).ok_or_else(|| AppError::validation("Invalid product data"))?;

    let product = Product {
        product_id: product_id.clone(),
        name,
        description: payload.description.unwrap_or_default(),
        price,
        stock,
        category: payload.category.unwrap_or_default(),
        sku: payload.sku.unwrap_or_default(),
        active: true,
        created_at: Utc::now(),
        updated_at: None,
    };

    // Unconditional put: re-creating an existing id replaces the record.
    match state.store.put(&product).await {
        Ok(()) => {
            state.metrics.product_created();
            Ok((
                StatusCode::CREATED,
                Json(CreateProductResponse {
                    message: "Product created successfully".to_string(),
                    product_id,
                }),
            ))
        }
        Err(e) => {
            error!(?e, "Failed to create product");
            state.metrics.operation_error("create");
            Err(AppError::internal("Failed to create product"))
        }
    }
}

// PUT /products/{product_id} - Partial update
#[instrument(skip(state, payload))]
pub async fn update_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<UpdateProductResponse>, AppError> {
    if product_id.trim().is_empty() {
        return Err(AppError::validation("product_id is required"));
    }
    if payload.is_empty() {
        return Err(AppError::validation("Nothing to update"));
    }

    let price = match &payload.price {
        Some(raw) => {
            Some(coerce_decimal(raw).ok_or_else(|| AppError::validation("Invalid product data"))?)
        }
        None => None,
    };
    let stock = match &payload.stock {
        Some(raw) => {
            Some(coerce_integer(raw).ok_or_else(|| AppError::validation("Invalid product data"))?)
        }
        None => None,
    };

    let patch = ProductPatch {
        name: payload.name,
        description: payload.description,
        price,
        stock,
        category: payload.category,
        active: payload.active,
        updated_at: Some(Utc::now()),
    };

    match state.store.update(&product_id, &patch).await {
        Ok(Some(product)) => {
            state.metrics.product_updated();
            Ok(Json(UpdateProductResponse {
                message: "Product updated successfully".to_string(),
                product: ProductResponse::from(product),
            }))
        }
        Ok(None) => Err(AppError::not_found("Product not found")),
        Err(e) => {
            error!(?e, "Failed to update product");
            state.metrics.operation_error("update");
            Err(AppError::internal("Failed to update product"))
        }
    }
}

// DELETE /products/{product_id} - Delete product
#[instrument(skip(state))]
pub async fn delete_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    if product_id.trim().is_empty() {
        return Err(AppError::validation("product_id is required"));
    }

    // Existence check first; a missing record never reaches the delete
    // call.
    let existing = match state.store.get(&product_id).await {
        Ok(existing) => existing,
        Err(e) => {
            error!(?e, "Failed to fetch product before delete");
            state.metrics.operation_error("delete");
            return Err(AppError::internal("Failed to delete product"));
        }
    };
    if existing.is_none() {
        return Err(AppError::not_found("Product not found"));
    }

    match state.store.delete(&product_id).await {
        Ok(()) => {
            state.metrics.product_deleted();
            Ok(Json(MessageResponse {
                message: "Product deleted successfully".to_string(),
            }))
        }
        Err(e) => {
            error!(?e, "Failed to delete product");
            state.metrics.operation_error("delete");
            Err(AppError::internal("Failed to delete product"))
        }
    }
}
