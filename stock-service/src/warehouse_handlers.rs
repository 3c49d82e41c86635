use crate::{company_id_from_headers, AppState};
use axum::{extract::State, http::HeaderMap, Json};
use common_http_errors::ApiError;
use serde::Serialize;
use sqlx::query_as;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct WarehouseRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
}

pub async fn list_warehouses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WarehouseRecord>>, ApiError> {
    let company_id = company_id_from_headers(&headers)?;

    let rows = query_as::<_, WarehouseRecord>(
        "SELECT id, company_id, name FROM warehouses WHERE company_id = $1 ORDER BY name",
    )
    .bind(company_id)
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::internal(e, None))?;

    Ok(Json(rows))
}
