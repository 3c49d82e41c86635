use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use common_observability::StockMetrics;
use prometheus::{Encoder, TextEncoder};
use sqlx::PgPool;
use std::{env, net::SocketAddr, sync::Arc};
use stock_service::{
    create_product, list_inventory, list_products, list_warehouses, low_stock_alerts,
    record_transaction, AppState, DEFAULT_RESULT_LIMIT, DEFAULT_SALES_WINDOW_DAYS,
    MAX_SALES_WINDOW_DAYS,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

async fn metrics_endpoint(State(state): State<AppState>) -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let families = state.metrics.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buf) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8_lossy(&buf).to_string(),
    )
}

async fn health() -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db_pool = PgPool::connect(&database_url).await?;
    sqlx::migrate!().run(&db_pool).await?;

    let sales_window_days = env::var("ALERT_SALES_WINDOW_DAYS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| (1..=MAX_SALES_WINDOW_DAYS).contains(v))
        .unwrap_or(DEFAULT_SALES_WINDOW_DAYS);
    let result_limit = env::var("ALERT_RESULT_LIMIT")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_RESULT_LIMIT);

    let metrics = Arc::new(StockMetrics::new());
    let state = AppState {
        db: db_pool,
        metrics: metrics.clone(),
        sales_window_days,
        result_limit,
    };

    let allowed_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static("x-company-id"),
        ]);

    // Counts HTTP error responses by the X-Error-Code header ApiError sets.
    async fn error_metrics_mw(
        State(metrics): State<Arc<StockMetrics>>,
        req: axum::http::Request<Body>,
        next: middleware::Next,
    ) -> axum::response::Response {
        let resp = next.run(req).await;
        let status = resp.status();
        if status.as_u16() >= 400 {
            let code = resp
                .headers()
                .get("x-error-code")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            metrics
                .http_errors_total
                .with_label_values(&["stock-service", code, status.as_str()])
                .inc();
        }
        resp
    }

    let app = Router::new()
        .route("/healthz", get(health))
        .route("/alerts/low-stock", get(low_stock_alerts))
        .route("/products", post(create_product).get(list_products))
        .route("/inventory", get(list_inventory))
        .route("/inventory/transactions", post(record_transaction))
        .route("/warehouses", get(list_warehouses))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .layer(middleware::from_fn_with_state(metrics, error_metrics_mw))
        .layer(cors);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8086);
    let ip: std::net::IpAddr = host.parse()?;
    let addr = SocketAddr::from((ip, port));
    info!(%addr, "starting stock-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
