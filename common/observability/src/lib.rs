use prometheus::{Histogram, IntCounter, IntCounterVec, Registry};

#[derive(Clone)]
pub struct StockMetrics {
    pub registry: Registry,
    pub alert_evaluations_total: IntCounter,
    pub alert_evaluation_duration_seconds: Histogram,
    pub alert_entries_returned: Histogram,
    pub http_errors_total: IntCounterVec,
}

impl StockMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let alert_evaluations_total = IntCounter::new(
            "alert_evaluations_total",
            "Low-stock alert evaluations performed",
        ).unwrap();
        let alert_evaluation_duration_seconds = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "alert_evaluation_duration_seconds",
                "Duration of one low-stock evaluation including snapshot load"
            ).buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0])
        ).unwrap();
        let alert_entries_returned = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "alert_entries_returned",
                "Entries returned per low-stock evaluation, post truncation"
            ).buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0])
        ).unwrap();
        let http_errors_total = IntCounterVec::new(
            prometheus::Opts::new(
                "http_errors_total",
                "Count of HTTP error responses emitted (status >= 400)"
            ),
            &["service", "code", "status"]
        ).unwrap();
        let _ = registry.register(Box::new(alert_evaluations_total.clone()));
        let _ = registry.register(Box::new(alert_evaluation_duration_seconds.clone()));
        let _ = registry.register(Box::new(alert_entries_returned.clone()));
        let _ = registry.register(Box::new(http_errors_total.clone()));
        StockMetrics {
            registry,
            alert_evaluations_total,
            alert_evaluation_duration_seconds,
            alert_entries_returned,
            http_errors_total,
        }
    }
}

impl Default for StockMetrics {
    fn default() -> Self { Self::new() }
}
