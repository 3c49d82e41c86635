use crate::alert_evaluator::{AlertCandidate, AlertContext, PairSales, SupplierOffer};
use chrono::{DateTime, Duration, Utc};
use sqlx::{query_as, PgPool};
use uuid::Uuid;

// Candidate pairs: one row per (product, warehouse) inventory entry in the
// company's warehouses, joined to its reorder policy. The inner join drops
// untracked products; the quantity filter keeps the snapshot small, the
// evaluator re-applies the same predicate.
pub(crate) const ALERT_CANDIDATES_SQL: &str =
    "SELECT p.id AS product_id, p.name AS product_name, p.sku, \
            w.id AS warehouse_id, w.name AS warehouse_name, \
            i.quantity, r.threshold_qty \
     FROM inventory i \
     JOIN warehouses w ON w.id = i.warehouse_id \
     JOIN products p ON p.id = i.product_id \
     JOIN reorder_policies r ON r.product_id = i.product_id \
     WHERE w.company_id = $1 AND i.quantity < r.threshold_qty";

// Sale movements are negative deltas; negating the sum yields units sold.
pub(crate) const PAIR_SALES_SQL: &str =
    "SELECT t.product_id, t.warehouse_id, SUM(-t.delta) AS units_sold \
     FROM inventory_transactions t \
     JOIN warehouses w ON w.id = t.warehouse_id \
     WHERE w.company_id = $1 AND t.reason = 'sale' \
       AND t.occurred_at >= $2 AND t.occurred_at <= $3 \
     GROUP BY t.product_id, t.warehouse_id";

pub(crate) const SUPPLIER_OFFERS_SQL: &str =
    "SELECT DISTINCT sp.supplier_id, sp.product_id, \
            s.name AS supplier_name, s.contact_email, sp.lead_time_days \
     FROM supplier_products sp \
     JOIN suppliers s ON s.id = sp.supplier_id \
     JOIN inventory i ON i.product_id = sp.product_id \
     JOIN warehouses w ON w.id = i.warehouse_id \
     WHERE w.company_id = $1";

/// Loads the evaluator's snapshot for one company as of a fixed instant.
/// Three read-only queries; no locks taken, isolation is the store's.
pub async fn load_alert_context(
    db: &PgPool,
    company_id: Uuid,
    as_of: DateTime<Utc>,
    sales_window_days: i64,
) -> Result<AlertContext, sqlx::Error> {
    let window_start = as_of - Duration::days(sales_window_days);

    let candidates = query_as::<_, AlertCandidate>(ALERT_CANDIDATES_SQL)
        .bind(company_id)
        .fetch_all(db)
        .await?;

    let sales = query_as::<_, PairSales>(PAIR_SALES_SQL)
        .bind(company_id)
        .bind(window_start)
        .bind(as_of)
        .fetch_all(db)
        .await?;

    let offers = query_as::<_, SupplierOffer>(SUPPLIER_OFFERS_SQL)
        .bind(company_id)
        .fetch_all(db)
        .await?;

    Ok(AlertContext { candidates, sales, offers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_query_scopes_by_company_parameter() {
        assert!(ALERT_CANDIDATES_SQL.contains("w.company_id = $1"));
        assert!(ALERT_CANDIDATES_SQL.contains("i.quantity < r.threshold_qty"));
        // Inner join: products without a reorder policy never become candidates.
        assert!(ALERT_CANDIDATES_SQL.contains("JOIN reorder_policies r ON r.product_id = i.product_id"));
    }

    #[test]
    fn sales_query_filters_sale_reason_and_window() {
        assert!(PAIR_SALES_SQL.contains("t.reason = 'sale'"));
        assert!(PAIR_SALES_SQL.contains("t.occurred_at >= $2"));
        assert!(PAIR_SALES_SQL.contains("t.occurred_at <= $3"));
    }
}
