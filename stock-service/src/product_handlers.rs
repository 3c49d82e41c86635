use crate::AppState;
use axum::extract::State;
use axum::Json;
use common_http_errors::ApiError;
use common_money::Minor;
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct InitialStock {
    pub warehouse_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price_minor: Minor,
    #[serde(default)]
    pub is_bundle: bool,
    pub threshold_qty: Option<i32>,
    #[serde(default)]
    pub initial_stock: Vec<InitialStock>,
}

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub price_minor: Minor,
    pub is_bundle: bool,
}

#[derive(Debug, Error)]
pub enum ProductValidationError {
    #[error("sku must not be empty")]
    EmptySku,
    #[error("name must not be empty")]
    EmptyName,
    #[error("price_minor must be >= 0")]
    NegativePrice,
    #[error("threshold_qty must be >= 0")]
    NegativeThreshold,
    #[error("initial_stock quantity must be >= 0 for warehouse {0}")]
    NegativeQuantity(Uuid),
    #[error("initial_stock lists warehouse {0} more than once")]
    DuplicateWarehouse(Uuid),
}

impl From<ProductValidationError> for ApiError {
    fn from(err: ProductValidationError) -> Self {
        use ProductValidationError::*;
        let (code, field) = match &err {
            EmptySku => ("invalid_sku", "sku"),
            EmptyName => ("invalid_name", "name"),
            NegativePrice => ("invalid_price", "price_minor"),
            NegativeThreshold => ("invalid_threshold", "threshold_qty"),
            NegativeQuantity(_) => ("invalid_quantity", "initial_stock"),
            DuplicateWarehouse(_) => ("duplicate_warehouse", "initial_stock"),
        };
        ApiError::invalid_field(code, field, err.to_string())
    }
}

/// Rejects a malformed payload before any store mutation happens.
fn validate(payload: &NewProduct) -> Result<(), ProductValidationError> {
    if payload.sku.trim().is_empty() {
        return Err(ProductValidationError::EmptySku);
    }
    if payload.name.trim().is_empty() {
        return Err(ProductValidationError::EmptyName);
    }
    if payload.price_minor.is_negative() {
        return Err(ProductValidationError::NegativePrice);
    }
    if payload.threshold_qty.is_some_and(|t| t < 0) {
        return Err(ProductValidationError::NegativeThreshold);
    }
    let mut seen = HashSet::new();
    for stock in &payload.initial_stock {
        if stock.quantity < 0 {
            return Err(ProductValidationError::NegativeQuantity(stock.warehouse_id));
        }
        if !seen.insert(stock.warehouse_id) {
            return Err(ProductValidationError::DuplicateWarehouse(stock.warehouse_id));
        }
    }
    Ok(())
}

/// POST /products. Inserts the product, its optional reorder policy and
/// every initial inventory row in one transaction, so inventory rows are
/// never orphaned from their product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<Json<Product>, ApiError> {
    validate(&payload)?;

    let product_id = Uuid::new_v4();
    let sku = payload.sku.trim();
    let name = payload.name.trim();

    let mut tx = state
        .db
        .begin()
        .await
        .map_err(|err| ApiError::internal(err, None))?;

    let product = query_as::<_, Product>(
        "INSERT INTO products (id, sku, name, price_minor, is_bundle) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, sku, name, price_minor, is_bundle",
    )
    .bind(product_id)
    .bind(sku)
    .bind(name)
    .bind(payload.price_minor)
    .bind(payload.is_bundle)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| map_sku_conflict(err, sku))?;

    if let Some(threshold_qty) = payload.threshold_qty {
        query("INSERT INTO reorder_policies (product_id, threshold_qty) VALUES ($1, $2)")
            .bind(product_id)
            .bind(threshold_qty)
            .execute(&mut *tx)
            .await
            .map_err(|err| ApiError::internal(err, None))?;
    }

    for stock in &payload.initial_stock {
        query(
            "INSERT INTO inventory (product_id, warehouse_id, quantity) VALUES ($1, $2, $3)",
        )
        .bind(product_id)
        .bind(stock.warehouse_id)
        .bind(stock.quantity)
        .execute(&mut *tx)
        .await
        .map_err(|err| ApiError::internal(err, None))?;
    }

    tx.commit().await.map_err(|err| ApiError::internal(err, None))?;

    tracing::info!(product_id = %product.id, sku = %product.sku, "product created");
    Ok(Json(product))
}

/// Unique violation on the sku column surfaces as a 409; the transaction
/// rolls back when the handler returns early.
fn map_sku_conflict(err: sqlx::Error, sku: &str) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ApiError::Conflict {
                code: "sku_exists",
                trace_id: None,
                message: Some(format!("sku '{sku}' already exists")),
            };
        }
    }
    ApiError::internal(err, None)
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = query_as::<_, Product>(
        "SELECT id, sku, name, price_minor, is_bundle FROM products ORDER BY sku",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::internal(e, None))?;

    Ok(Json(products))
}
