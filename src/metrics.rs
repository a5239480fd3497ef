// src/metrics.rs
//
// Usage counters for the catalog, one per CRUD outcome, exposed in
// Prometheus format when METRICS_ADDR is configured. Recording goes
// through the `metrics` facade and is fire-and-forget: without an
// installed recorder every call is a no-op, and nothing here can ever
// fail a request.
use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::warn;

/// Starts the Prometheus scrape endpoint. A failure to bind disables
/// exposition for the process lifetime but is never fatal.
pub fn init_exporter(addr: SocketAddr) {
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(%addr, error = %e, "Metrics exporter failed to start; counters disabled");
    }
}

/// Cloneable handle injected into handlers through application state.
#[derive(Debug, Clone, Default)]
pub struct Metrics;

impl Metrics {
    pub fn new() -> Self {
        Self
    }

    /// Items returned by a list call.
    pub fn products_listed(&self, count: u64) {
        counter!("catalog_products_listed_total").increment(count);
    }

    pub fn product_fetched(&self) {
        counter!("catalog_products_fetched_total").increment(1);
    }

    pub fn product_not_found(&self) {
        counter!("catalog_products_not_found_total").increment(1);
    }

    pub fn product_created(&self) {
        counter!("catalog_products_created_total").increment(1);
    }

    pub fn product_updated(&self) {
        counter!("catalog_products_updated_total").increment(1);
    }

    pub fn product_deleted(&self) {
        counter!("catalog_products_deleted_total").increment(1);
    }

    /// Store or serialization failure inside one of the operations.
    pub fn operation_error(&self, op: &'static str) {
        counter!("catalog_errors_total", "op" => op).increment(1);
    }
}
