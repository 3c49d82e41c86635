use crate::alert_evaluator::{evaluate, AlertParams, AlertReport};
use crate::alert_store::load_alert_context;
use crate::{company_id_from_headers, AppState, MAX_SALES_WINDOW_DAYS};
use axum::extract::{Query, State};
use axum::{http::HeaderMap, Json};
use chrono::{DateTime, Utc};
use common_http_errors::ApiError;
use serde::Deserialize;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub window_days: Option<i64>,
    pub limit: Option<i64>,
    pub as_of: Option<DateTime<Utc>>,
}

/// GET /alerts/low-stock. Evaluates the low-stock report for the company
/// in `X-Company-ID` over a freshly loaded snapshot. `as_of` is injectable
/// for deterministic replay; it defaults to now.
pub async fn low_stock_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<AlertReport>, ApiError> {
    let company_id = company_id_from_headers(&headers)?;

    let window_days = query.window_days.unwrap_or(state.sales_window_days);
    if !(1..=MAX_SALES_WINDOW_DAYS).contains(&window_days) {
        return Err(ApiError::BadRequest {
            code: "invalid_window",
            field: Some("window_days"),
            trace_id: None,
            message: Some(format!(
                "window_days must be between 1 and {MAX_SALES_WINDOW_DAYS}, got {window_days}"
            )),
        });
    }
    let limit = query.limit.unwrap_or(state.result_limit as i64);
    if limit < 0 {
        return Err(ApiError::BadRequest {
            code: "invalid_limit",
            field: Some("limit"),
            trace_id: None,
            message: Some(format!("limit must be >= 0, got {limit}")),
        });
    }
    let as_of = query.as_of.unwrap_or_else(Utc::now);

    let started = Instant::now();
    let ctx = load_alert_context(&state.db, company_id, as_of, window_days)
        .await
        .map_err(|e| ApiError::internal(e, None))?;
    let report = evaluate(
        &ctx,
        AlertParams { sales_window_days: window_days, result_limit: limit as usize },
    );

    state.metrics.alert_evaluations_total.inc();
    state
        .metrics
        .alert_evaluation_duration_seconds
        .observe(started.elapsed().as_secs_f64());
    state
        .metrics
        .alert_entries_returned
        .observe(report.total_alerts as f64);
    tracing::debug!(
        company_id = %company_id,
        window_days,
        total_alerts = report.total_alerts,
        "low-stock evaluation complete"
    );

    Ok(Json(report))
}
