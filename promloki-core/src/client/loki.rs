use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use super::{timeout_duration, trim_base_url};
use crate::error::ClientError;
use crate::result::rewrite_data_timestamps;

/// Client for the Loki range query API.
#[derive(Debug, Clone)]
pub struct LokiClient {
    client: Client,
    base_url: String,
}

impl LokiClient {
    pub fn new(base_url: &str, timeout_secs: f64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout_duration(timeout_secs))
            .build()?;
        let base_url = trim_base_url(base_url);
        debug!("Initialized LokiClient base_url={} timeout={}s", base_url, timeout_secs);
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `/loki/api/v1/query_range` with nanosecond bounds.
    ///
    /// Returns the full response body. Stream timestamps are rewritten to
    /// millisecond display strings; a non-success body is returned as-is so
    /// the caller sees Loki's own error.
    pub async fn query_range(
        &self,
        query: &str,
        start_ns: i64,
        end_ns: i64,
        limit: Option<u64>,
    ) -> Result<Value, ClientError> {
        let mut params = vec![
            ("query", query.to_string()),
            ("start", start_ns.to_string()),
            ("end", end_ns.to_string()),
        ];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let url = format!("{}/loki/api/v1/query_range", self.base_url);
        let preview: String = query.chars().take(120).collect();
        debug!("Loki range query url={} start={} end={} query={}", url, start_ns, end_ns, preview);

        let response = self.client.get(&url).query(&params).send().await.map_err(|e| {
            error!("Loki request failed: {}", e);
            ClientError::Request(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Loki returned HTTP {}: {}", status, body);
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if !body.is_object() {
            error!("Loki returned a non-object body");
            return Err(ClientError::InvalidResponse(
                "expected a JSON object".to_string(),
            ));
        }

        if body.get("status").and_then(Value::as_str) != Some("success") {
            error!("Loki returned non-success status: {}", body);
            return Ok(body);
        }

        let mut size = 0;
        let mut result_type = String::new();
        if let Some(data) = body.get_mut("data") {
            rewrite_data_timestamps(data);
            size = data.get("result").and_then(Value::as_array).map_or(0, Vec::len);
            result_type = data
                .get("resultType")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
        }
        info!("Loki query finished type={} streams={}", result_type, size);
        Ok(body)
    }
}
