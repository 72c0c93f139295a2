use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Register descriptions once per process; safe to call from hot paths.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "lookup_requests_total",
            "Adapter fetches by provider and outcome (ok or error kind)."
        );
        describe_counter!("lookup_cache_hits_total", "Fetches served from the TTL cache.");
        describe_counter!(
            "lookup_cache_misses_total",
            "Fetches that went to the upstream API."
        );
        describe_counter!(
            "lookup_schema_violations_total",
            "Upstream payloads rejected by schema validation."
        );
        describe_histogram!("lookup_upstream_ms", "Upstream call time in milliseconds.");
        describe_gauge!("lookup_cache_ttl_secs", "Configured cache TTL in seconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the cache TTL gauge.
    /// Fails if another recorder is already installed.
    pub fn init(ttl_secs: i64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        ensure_metrics_described();
        // Absolute TTL, no sliding refresh
        gauge!("lookup_cache_ttl_secs").set(ttl_secs as f64);

        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
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
