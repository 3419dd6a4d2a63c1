use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{QueryData, QueryParams};

pub mod loki;
pub mod prometheus;

pub use loki::LokiClient;
pub use prometheus::PrometheusClient;

/// Anything that can evaluate PromQL.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn execute(&self, params: &QueryParams) -> Result<QueryData, ClientError>;
}

pub(crate) fn timeout_duration(timeout_secs: f64) -> std::time::Duration {
    if timeout_secs.is_finite() && timeout_secs > 0.0 {
        std::time::Duration::from_secs_f64(timeout_secs)
    } else {
        std::time::Duration::from_secs(30)
    }
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
