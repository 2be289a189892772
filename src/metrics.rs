//! Prometheus metrics for the recommendation endpoints.
//!
//! Without an installed recorder (tests, tools) the macros are no-ops.

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "recommend_requests_total",
            "Recommendation requests by route."
        );
        describe_counter!(
            "recommend_empty_total",
            "Requests that produced no recommendations."
        );
        describe_histogram!(
            "recommend_latency_ms",
            "Pipeline latency in milliseconds."
        );
        describe_gauge!("catalog_records", "Records in the feature index.");
    });
}

pub fn record_catalog_size(records: usize) {
    gauge!("catalog_records").set(records as f64);
}

pub fn record_request(route: &'static str, results: usize, elapsed_ms: f64) {
    counter!("recommend_requests_total", "route" => route).increment(1);
    if results == 0 {
        counter!("recommend_empty_total", "route" => route).increment(1);
    }
    histogram!("recommend_latency_ms", "route" => route).record(elapsed_ms);
}
