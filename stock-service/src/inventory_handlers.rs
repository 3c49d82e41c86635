use crate::{company_id_from_headers, AppState};
use axum::extract::State;
use axum::{http::HeaderMap, Json};
use common_http_errors::ApiError;
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, query_scalar, Row};
use uuid::Uuid;

pub(crate) const LIST_INVENTORY_SQL: &str =
    "SELECT i.product_id, i.warehouse_id, i.quantity, r.threshold_qty \
     FROM inventory i \
     JOIN warehouses w ON w.id = i.warehouse_id \
     LEFT JOIN reorder_policies r ON r.product_id = i.product_id \
     WHERE w.company_id = $1";

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct InventoryRecord {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i32,
    /// Absent for products with no reorder policy (not tracked for alerts).
    pub threshold_qty: Option<i32>,
}

pub async fn list_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<InventoryRecord>>, ApiError> {
    let company_id = company_id_from_headers(&headers)?;

    let records = query_as::<_, InventoryRecord>(LIST_INVENTORY_SQL)
        .bind(company_id)
        .fetch_all(&state.db)
        .await
        .map_err(|e| ApiError::internal(e, None))?;

    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct NewTransaction {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub delta: i32,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i32,
}

/// POST /inventory/transactions. Appends one row to the movement ledger
/// and applies its delta to the pair's inventory row in the same database
/// transaction. The first movement for a pair upserts the inventory row.
pub async fn record_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewTransaction>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let company_id = company_id_from_headers(&headers)?;

    if payload.delta == 0 {
        return Err(ApiError::invalid_field(
            "invalid_delta",
            "delta",
            "delta must be non-zero",
        ));
    }
    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::invalid_field(
            "invalid_reason",
            "reason",
            "reason must not be empty",
        ));
    }

    let mut tx = state
        .db
        .begin()
        .await
        .map_err(|err| ApiError::internal(err, None))?;

    let owner: Option<Uuid> = query_scalar("SELECT company_id FROM warehouses WHERE id = $1")
        .bind(payload.warehouse_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| ApiError::internal(err, None))?;
    match owner {
        Some(owner) if owner == company_id => {}
        _ => {
            return Err(ApiError::NotFound { code: "warehouse_not_found", trace_id: None });
        }
    }

    let transaction_id = Uuid::new_v4();
    query(
        "INSERT INTO inventory_transactions (id, product_id, warehouse_id, delta, reason) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(transaction_id)
    .bind(payload.product_id)
    .bind(payload.warehouse_id)
    .bind(payload.delta)
    .bind(reason)
    .execute(&mut *tx)
    .await
    .map_err(|err| ApiError::internal(err, None))?;

    let quantity: i32 = query(
        "INSERT INTO inventory (product_id, warehouse_id, quantity) VALUES ($1, $2, $3) \
         ON CONFLICT (product_id, warehouse_id) \
         DO UPDATE SET quantity = inventory.quantity + $3 \
         RETURNING quantity",
    )
    .bind(payload.product_id)
    .bind(payload.warehouse_id)
    .bind(payload.delta)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| ApiError::internal(err, None))?
    .get("quantity");

    tx.commit().await.map_err(|err| ApiError::internal(err, None))?;

    tracing::debug!(
        company_id = %company_id,
        product_id = %payload.product_id,
        warehouse_id = %payload.warehouse_id,
        delta = payload.delta,
        quantity,
        "inventory transaction recorded"
    );

    Ok(Json(TransactionResponse {
        transaction_id,
        product_id: payload.product_id,
        warehouse_id: payload.warehouse_id,
        quantity,
    }))
}
