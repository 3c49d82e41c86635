pub mod alert_evaluator;
pub mod alert_handlers;
pub mod alert_store;
pub mod inventory_handlers;
pub mod product_handlers;
pub mod warehouse_handlers;

pub use crate::alert_evaluator::{evaluate, AlertContext, AlertParams, AlertReport};
pub use crate::alert_handlers::low_stock_alerts;
pub use crate::inventory_handlers::{list_inventory, record_transaction};
pub use crate::product_handlers::{create_product, list_products};
pub use crate::warehouse_handlers::list_warehouses;

use axum::http::HeaderMap;
use common_http_errors::ApiError;
use common_observability::StockMetrics;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_SALES_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_RESULT_LIMIT: usize = 100;
/// Ten years. Windows beyond this are rejected at the HTTP boundary; the
/// snapshot window arithmetic and the stockout estimate assume a bounded
/// number of days.
pub const MAX_SALES_WINDOW_DAYS: i64 = 3650;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub metrics: Arc<StockMetrics>,
    /// Default trailing window when the request does not name one.
    pub sales_window_days: i64,
    /// Default cap on returned alert entries.
    pub result_limit: usize,
}

/// Company scoping comes from the `X-Company-ID` header; auth is the
/// gateway's concern, not this service's.
pub fn company_id_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get("x-company-id")
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::BadRequest {
            code: "missing_company_header",
            field: None,
            trace_id: None,
            message: None,
        })?;
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest {
        code: "invalid_company_header",
        field: None,
        trace_id: None,
        message: None,
    })
}
