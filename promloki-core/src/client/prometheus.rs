use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{timeout_duration, trim_base_url, MetricsBackend};
use crate::error::ClientError;
use crate::models::{QueryData, QueryParams};
use crate::result::rewrite_data_timestamps;

#[derive(Debug, Deserialize)]
struct PrometheusResponse {
    status: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the Prometheus HTTP API (`/api/v1/query`, `/api/v1/query_range`).
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    client: Client,
    base_url: String,
    auth: Option<(String, String)>,
}

impl PrometheusClient {
    pub fn new(
        base_url: &str,
        username: Option<String>,
        password: Option<String>,
        timeout_secs: f64,
    ) -> Result<Self, ClientError> {
        let auth = match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        };
        let client = Client::builder()
            .timeout(timeout_duration(timeout_secs))
            .build()?;
        let base_url = trim_base_url(base_url);

        debug!(
            "Initialized PrometheusClient base_url={} timeout={}s auth={}",
            base_url,
            timeout_secs,
            if auth.is_some() { "yes" } else { "no" }
        );
        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_params(params: &QueryParams) -> Vec<(&'static str, String)> {
        let mut out = vec![("query", params.query.clone())];

        match (params.start, params.end, params.step.as_ref()) {
            (Some(start), Some(end), Some(step)) => {
                out.push(("start", start.to_string()));
                out.push(("end", end.to_string()));
                out.push(("step", step.clone()));
            }
            _ => {
                if let Some(time) = params.time {
                    out.push(("time", time.to_string()));
                }
            }
        }

        if let Some(timeout) = &params.timeout {
            out.push(("timeout", timeout.clone()));
        }
        if let Some(limit) = params.limit {
            out.push(("limit", limit.to_string()));
        }
        out
    }

    /// Run an instant or range query and return its `data` section, with
    /// sample timestamps rendered for display.
    pub async fn execute(&self, params: &QueryParams) -> Result<QueryData, ClientError> {
        let is_range = params.is_range();
        let endpoint = if is_range {
            "/api/v1/query_range"
        } else {
            "/api/v1/query"
        };
        let query_params = Self::build_params(params);
        debug!(
            "Executing {} query endpoint={} params={:?}",
            if is_range { "range" } else { "instant" },
            endpoint,
            query_params
        );

        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, endpoint))
            .query(&query_params);
        if let Some((username, password)) = &self.auth {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(|e| {
            error!("Prometheus request failed: {}", e);
            ClientError::Request(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Prometheus returned HTTP {}: {}", status, body);
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: PrometheusResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if body.status != "success" {
            let message = format!(
                "{}: {}",
                body.error_type.as_deref().unwrap_or("error"),
                body.error.as_deref().unwrap_or("unknown error")
            );
            error!("Prometheus returned non-success status: {}", message);
            return Err(ClientError::Backend(message));
        }

        let mut data = body.data.unwrap_or(Value::Null);
        rewrite_data_timestamps(&mut data);
        let data: QueryData = serde_json::from_value(data)
            .map_err(|e| ClientError::InvalidResponse(format!("Unexpected data section: {}", e)))?;

        let size = data.result.as_array().map_or(0, Vec::len);
        if size == 0 {
            warn!("Prometheus query returned no series: {}", params.query);
        }
        info!("Query finished type={} series={}", data.result_type, size);
        Ok(data)
    }
}

#[async_trait]
impl MetricsBackend for PrometheusClient {
    async fn execute(&self, params: &QueryParams) -> Result<QueryData, ClientError> {
        PrometheusClient::execute(self, params).await
    }
}
