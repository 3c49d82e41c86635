use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Inventory row joined to its product, warehouse and reorder policy.
/// Pairs without a reorder policy never reach the evaluator; absence of a
/// policy means the product is not tracked for alerts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertCandidate {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub quantity: i32,
    pub threshold_qty: i32,
}

/// Units sold for one (product, warehouse) pair over the trailing window.
/// Sale transactions carry negative deltas; `units_sold` is the negated sum.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PairSales {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub units_sold: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierOffer {
    pub supplier_id: Uuid,
    pub product_id: Uuid,
    pub supplier_name: String,
    pub contact_email: Option<String>,
    pub lead_time_days: i32,
}

/// Point-in-time snapshot the evaluator runs over. Loaded in one pass by
/// the store layer; tests build it directly from fixtures.
#[derive(Debug, Default)]
pub struct AlertContext {
    pub candidates: Vec<AlertCandidate>,
    pub sales: Vec<PairSales>,
    pub offers: Vec<SupplierOffer>,
}

#[derive(Debug, Clone, Copy)]
pub struct AlertParams {
    /// Trailing window used for the sales-velocity estimate. Must be >= 1;
    /// validated at the HTTP boundary.
    pub sales_window_days: i64,
    /// Hard cap on returned entries; excess entries are truncated.
    pub result_limit: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertEntry {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub current_stock: i32,
    pub threshold: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_stockout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<SupplierRef>,
}

#[derive(Debug, Serialize)]
pub struct AlertReport {
    pub alerts: Vec<AlertEntry>,
    pub total_alerts: usize,
}

/// Low-stock alert evaluation. Pure and side-effect-free: every invocation
/// over the same snapshot and params yields the same report.
///
/// A pair alerts only when `quantity < threshold_qty` (strict; a pair
/// sitting exactly at its threshold is not alerted). Entries come back
/// sorted by current stock ascending, most depleted first, truncated to
/// `result_limit`.
pub fn evaluate(ctx: &AlertContext, params: AlertParams) -> AlertReport {
    let sales: HashMap<(Uuid, Uuid), i64> = ctx
        .sales
        .iter()
        .map(|s| ((s.product_id, s.warehouse_id), s.units_sold))
        .collect();
    let preferred = preferred_suppliers(&ctx.offers);

    let mut alerts: Vec<AlertEntry> = ctx
        .candidates
        .iter()
        .filter(|c| c.quantity < c.threshold_qty)
        .map(|c| {
            let units_sold = sales
                .get(&(c.product_id, c.warehouse_id))
                .copied()
                .unwrap_or(0);
            AlertEntry {
                product_id: c.product_id,
                product_name: c.product_name.clone(),
                sku: c.sku.clone(),
                warehouse_id: c.warehouse_id,
                warehouse_name: c.warehouse_name.clone(),
                current_stock: c.quantity,
                threshold: c.threshold_qty,
                days_until_stockout: days_until_stockout(
                    c.quantity,
                    units_sold,
                    params.sales_window_days,
                ),
                supplier: preferred.get(&c.product_id).cloned(),
            }
        })
        .collect();

    alerts.sort_by(|a, b| a.current_stock.cmp(&b.current_stock));
    alerts.truncate(params.result_limit);
    let total_alerts = alerts.len();
    AlertReport { alerts, total_alerts }
}

/// Stockout estimate: current stock divided by average daily sales, rounded
/// up. Zero sales in the window means no velocity signal, so the estimate
/// is absent rather than zero or infinite. Oversold pairs (negative stock)
/// clamp to zero: the stockout is already here.
fn days_until_stockout(quantity: i32, units_sold: i64, window_days: i64) -> Option<i64> {
    if units_sold == 0 {
        return None;
    }
    let stock_days = i64::from(quantity).saturating_mul(window_days);
    let days = ceil_div(stock_days, units_sold);
    Some(days.max(0))
}

/// Ceiling division for any sign combination with a non-zero divisor.
fn ceil_div(numerator: i64, divisor: i64) -> i64 {
    let quotient = numerator / divisor;
    let remainder = numerator % divisor;
    if remainder != 0 && (remainder > 0) == (divisor > 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// Fastest supplier per product: minimum lead time, ties broken by lowest
/// supplier id so the selection is deterministic.
fn preferred_suppliers(offers: &[SupplierOffer]) -> HashMap<Uuid, SupplierRef> {
    let mut best: HashMap<Uuid, &SupplierOffer> = HashMap::new();
    for offer in offers {
        match best.get(&offer.product_id) {
            Some(current)
                if (current.lead_time_days, current.supplier_id)
                    <= (offer.lead_time_days, offer.supplier_id) => {}
            _ => {
                best.insert(offer.product_id, offer);
            }
        }
    }
    best.into_iter()
        .map(|(product_id, offer)| {
            (
                product_id,
                SupplierRef {
                    id: offer.supplier_id,
                    name: offer.supplier_name.clone(),
                    contact_email: offer.contact_email.clone(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(quantity: i32, threshold_qty: i32) -> AlertCandidate {
        AlertCandidate {
            product_id: Uuid::new_v4(),
            product_name: "Widget".into(),
            sku: "WID-1".into(),
            warehouse_id: Uuid::new_v4(),
            warehouse_name: "Main".into(),
            quantity,
            threshold_qty,
        }
    }

    fn params() -> AlertParams {
        AlertParams { sales_window_days: 30, result_limit: 100 }
    }

    #[test]
    fn at_or_above_threshold_is_not_alerted() {
        let ctx = AlertContext {
            candidates: vec![candidate(10, 10), candidate(20, 10)],
            ..Default::default()
        };
        let report = evaluate(&ctx, params());
        assert!(report.alerts.is_empty());
        assert_eq!(report.total_alerts, 0);
    }

    #[test]
    fn stockout_estimate_from_trailing_velocity() {
        // quantity=5, 30 units sold over 30 days -> 1/day -> ceil(5/1) = 5
        let c = candidate(5, 10);
        let ctx = AlertContext {
            sales: vec![PairSales {
                product_id: c.product_id,
                warehouse_id: c.warehouse_id,
                units_sold: 30,
            }],
            candidates: vec![c],
            offers: vec![],
        };
        let report = evaluate(&ctx, params());
        assert_eq!(report.alerts[0].days_until_stockout, Some(5));
    }

    #[test]
    fn stockout_estimate_rounds_up() {
        // 7 units at 30 sold / 30 days with a 28-day window: ceil(7*28/30) = 7
        let c = candidate(7, 10);
        let ctx = AlertContext {
            sales: vec![PairSales {
                product_id: c.product_id,
                warehouse_id: c.warehouse_id,
                units_sold: 30,
            }],
            candidates: vec![c],
            offers: vec![],
        };
        let report = evaluate(
            &ctx,
            AlertParams { sales_window_days: 28, result_limit: 100 },
        );
        assert_eq!(report.alerts[0].days_until_stockout, Some(7));
    }

    #[test]
    fn zero_sales_means_no_estimate() {
        let ctx = AlertContext { candidates: vec![candidate(5, 10)], ..Default::default() };
        let report = evaluate(&ctx, params());
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].days_until_stockout, None);
    }

    #[test]
    fn oversold_pair_clamps_to_zero_days() {
        let c = candidate(-3, 10);
        let ctx = AlertContext {
            sales: vec![PairSales {
                product_id: c.product_id,
                warehouse_id: c.warehouse_id,
                units_sold: 15,
            }],
            candidates: vec![c],
            offers: vec![],
        };
        let report = evaluate(&ctx, params());
        assert_eq!(report.alerts[0].days_until_stockout, Some(0));
    }

    #[test]
    fn fastest_supplier_wins() {
        let c = candidate(2, 10);
        let mk = |lead: i32| SupplierOffer {
            supplier_id: Uuid::new_v4(),
            product_id: c.product_id,
            supplier_name: format!("lead-{lead}"),
            contact_email: None,
            lead_time_days: lead,
        };
        let ctx = AlertContext {
            offers: vec![mk(7), mk(3), mk(10)],
            candidates: vec![c],
            sales: vec![],
        };
        let report = evaluate(&ctx, params());
        let supplier = report.alerts[0].supplier.as_ref().expect("supplier attached");
        assert_eq!(supplier.name, "lead-3");
    }

    #[test]
    fn supplier_tie_breaks_on_lowest_id() {
        let c = candidate(2, 10);
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let mk = |id: Uuid, name: &str| SupplierOffer {
            supplier_id: id,
            product_id: c.product_id,
            supplier_name: name.into(),
            contact_email: None,
            lead_time_days: 4,
        };
        // Same minimal lead time in both insertion orders.
        for offers in [
            vec![mk(high, "high"), mk(low, "low")],
            vec![mk(low, "low"), mk(high, "high")],
        ] {
            let ctx = AlertContext {
                offers,
                candidates: vec![c.clone()],
                sales: vec![],
            };
            let report = evaluate(&ctx, params());
            assert_eq!(report.alerts[0].supplier.as_ref().unwrap().id, low);
        }
    }

    #[test]
    fn no_supplier_rows_means_absent_supplier() {
        let ctx = AlertContext { candidates: vec![candidate(1, 10)], ..Default::default() };
        let report = evaluate(&ctx, params());
        assert_eq!(report.alerts[0].supplier, None);
    }

    #[test]
    fn ordering_is_most_depleted_first_with_truncation() {
        let ctx = AlertContext {
            candidates: vec![candidate(8, 10), candidate(-1, 10), candidate(3, 10)],
            ..Default::default()
        };
        let report = evaluate(
            &ctx,
            AlertParams { sales_window_days: 30, result_limit: 2 },
        );
        let stocks: Vec<i32> = report.alerts.iter().map(|a| a.current_stock).collect();
        assert_eq!(stocks, vec![-1, 3]);
        assert_eq!(report.total_alerts, 2);
    }

    #[test]
    fn result_limit_zero_yields_empty_report() {
        let ctx = AlertContext { candidates: vec![candidate(1, 10)], ..Default::default() };
        let report = evaluate(
            &ctx,
            AlertParams { sales_window_days: 30, result_limit: 0 },
        );
        assert!(report.alerts.is_empty());
        assert_eq!(report.total_alerts, 0);
    }

    #[test]
    fn extreme_window_saturates_instead_of_overflowing() {
        let c = candidate(5, 10);
        let ctx = AlertContext {
            sales: vec![PairSales {
                product_id: c.product_id,
                warehouse_id: c.warehouse_id,
                units_sold: 30,
            }],
            candidates: vec![c],
            offers: vec![],
        };
        let report = evaluate(
            &ctx,
            AlertParams { sales_window_days: i64::MAX, result_limit: 100 },
        );
        assert!(report.alerts[0].days_until_stockout.unwrap() > 0);
    }

    #[test]
    fn ceil_div_handles_signs() {
        assert_eq!(ceil_div(5, 1), 5);
        assert_eq!(ceil_div(7, 2), 4);
        assert_eq!(ceil_div(6, 2), 3);
        assert_eq!(ceil_div(-5, 3), -1);
        assert_eq!(ceil_div(5, -3), -1);
    }
}
