use stock_service::alert_evaluator::{
    evaluate, AlertCandidate, AlertContext, AlertParams, PairSales, SupplierOffer,
};
use uuid::Uuid;

fn context_with_one_alert(units_sold: i64, with_supplier: bool) -> AlertContext {
    let product_id = Uuid::new_v4();
    let warehouse_id = Uuid::new_v4();
    AlertContext {
        candidates: vec![AlertCandidate {
            product_id,
            product_name: "Widget".into(),
            sku: "WID-1".into(),
            warehouse_id,
            warehouse_name: "Main".into(),
            quantity: 5,
            threshold_qty: 10,
        }],
        sales: vec![PairSales { product_id, warehouse_id, units_sold }],
        offers: if with_supplier {
            vec![SupplierOffer {
                supplier_id: Uuid::new_v4(),
                product_id,
                supplier_name: "Acme Supply".into(),
                contact_email: Some("orders@acme.example".into()),
                lead_time_days: 3,
            }]
        } else {
            vec![]
        },
    }
}

#[test]
fn report_serializes_with_expected_field_names() {
    let ctx = context_with_one_alert(30, true);
    let report = evaluate(
        &ctx,
        AlertParams { sales_window_days: 30, result_limit: 100 },
    );
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["total_alerts"], 1);
    let entry = &value["alerts"][0];
    for key in [
        "product_id",
        "product_name",
        "sku",
        "warehouse_id",
        "warehouse_name",
        "current_stock",
        "threshold",
        "days_until_stockout",
        "supplier",
    ] {
        assert!(entry.get(key).is_some(), "missing field {key}");
    }
    assert_eq!(entry["current_stock"], 5);
    assert_eq!(entry["threshold"], 10);
    assert_eq!(entry["days_until_stockout"], 5);
    assert_eq!(entry["supplier"]["name"], "Acme Supply");
    assert_eq!(entry["supplier"]["contact_email"], "orders@acme.example");
}

#[test]
fn absent_values_are_omitted_not_null() {
    let ctx = context_with_one_alert(0, false);
    let report = evaluate(
        &ctx,
        AlertParams { sales_window_days: 30, result_limit: 100 },
    );
    let value = serde_json::to_value(&report).unwrap();

    let entry = &value["alerts"][0];
    assert!(entry.get("days_until_stockout").is_none());
    assert!(entry.get("supplier").is_none());
}

#[test]
fn empty_company_snapshot_yields_empty_report() {
    let report = evaluate(
        &AlertContext::default(),
        AlertParams { sales_window_days: 30, result_limit: 100 },
    );
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["total_alerts"], 0);
    assert_eq!(value["alerts"].as_array().unwrap().len(), 0);
}
