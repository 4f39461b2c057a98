//! Prometheus counters for the catalog API
//!
//! Counters go through the `metrics` facade, so they are no-ops until a recorder is
//! installed. The binary installs the Prometheus exporter via [`init_metrics`].

use std::net::SocketAddr;

use axum::http::StatusCode;
use ::metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

use crate::config::MetricsConfig;

/// Naming convention: quiz_catalog_{area}_{name}_total
macro_rules! catalog_counter {
    ($area:literal, $name:literal) => {
        concat!("quiz_catalog_", $area, "_", $name, "_total")
    };
}

/// Catalog entity kinds used as the `entity` label
pub const SUBJECT: &str = "subject";
pub const LECTURE: &str = "lecture";
pub const QUESTION: &str = "question";

pub struct CatalogMetrics;

impl CatalogMetrics {
    /// Record an accepted upload batch
    pub fn record_upload(questions: usize) {
        counter!(catalog_counter!("upload", "batches")).increment(1);
        counter!(catalog_counter!("upload", "questions")).increment(questions as u64);
    }

    pub fn record_upload_rejected() {
        counter!(catalog_counter!("upload", "rejected")).increment(1);
    }

    pub fn record_created(entity: &'static str) {
        counter!(catalog_counter!("catalog", "created"), "entity" => entity).increment(1);
    }

    pub fn record_deleted(entity: &'static str) {
        counter!(catalog_counter!("catalog", "deleted"), "entity" => entity).increment(1);
    }

    /// Wrong or missing admin secret
    pub fn record_admin_rejected() {
        counter!(catalog_counter!("admin", "rejected")).increment(1);
    }

    /// Count an error response by status class. Non-error statuses are ignored.
    pub fn record_error_response(status: StatusCode) {
        let class = if status.is_server_error() {
            "5xx"
        } else if status.is_client_error() {
            "4xx"
        } else {
            return;
        };
        counter!(catalog_counter!("http", "error_responses"), "class" => class).increment(1);
    }

    /// Pre-register every counter so it shows up on /metrics before first use
    pub fn register_metrics() {
        let _ = counter!(catalog_counter!("upload", "batches"));
        let _ = counter!(catalog_counter!("upload", "questions"));
        let _ = counter!(catalog_counter!("upload", "rejected"));
        for entity in [SUBJECT, LECTURE, QUESTION] {
            let _ = counter!(catalog_counter!("catalog", "created"), "entity" => entity);
            let _ = counter!(catalog_counter!("catalog", "deleted"), "entity" => entity);
        }
        let _ = counter!(catalog_counter!("admin", "rejected"));
        for class in ["4xx", "5xx"] {
            let _ = counter!(catalog_counter!("http", "error_responses"), "class" => class);
        }
    }
}

/// Install the Prometheus exporter and register the catalog counters.
///
/// Must run inside the tokio runtime: the exporter spawns its HTTP listener there.
/// Failures are logged and leave metrics disabled.
pub fn init_metrics(config: &MetricsConfig) {
    if !config.enabled {
        info!("Metrics disabled");
        return;
    }

    let addr: SocketAddr = match config.addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics addr '{}': {}; metrics disabled", config.addr, e);
            return;
        }
    };

    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            CatalogMetrics::register_metrics();
            info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            warn!("Failed to install Prometheus exporter: {}", e);
        }
    }
}
