//! Metrics collection and exposition.
//!
//! # Metrics
//! - `url_mapper_upserts_total` (counter)
//! - `url_mapper_removals_total` (counter)
//! - `url_mapper_lookups_total` (counter): labelled `result=hit|miss`
//! - `url_mapper_store_errors_total` (counter): labelled by store operation
//! - `url_mapper_mappings` (gauge): stored mapping count as last observed

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_upsert() {
    counter!("url_mapper_upserts_total").increment(1);
}

pub fn record_removal() {
    counter!("url_mapper_removals_total").increment(1);
}

pub fn record_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("url_mapper_lookups_total", "result" => result).increment(1);
}

pub fn record_store_error(op: &'static str) {
    counter!("url_mapper_store_errors_total", "op" => op).increment(1);
}

pub fn record_mapping_count(count: usize) {
    gauge!("url_mapper_mappings").set(count as f64);
}
