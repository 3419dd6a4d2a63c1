use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameters of a single PromQL query.
///
/// When `start`, `end` and `step` are all set the query is a range query,
/// otherwise it is an instant query evaluated at `time` (or now).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl QueryParams {
    pub fn instant(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn range(query: impl Into<String>, start: i64, end: i64, step: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            start: Some(start),
            end: Some(end),
            step: Some(step.into()),
            ..Default::default()
        }
    }

    pub fn is_range(&self) -> bool {
        self.start.is_some() && self.end.is_some() && self.step.is_some()
    }
}

/// The `data` section of a Prometheus query response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryData {
    #[serde(rename = "resultType", default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<String>,
    pub interval: Option<String>,
}

impl AnalyzeRequest {
    pub fn is_range(&self) -> bool {
        self.start.is_some() && self.end.is_some() && self.step.is_some()
    }
}

/// One executed query template of an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub data: QueryData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub name: String,
    pub description: Option<String>,
    pub range_query: bool,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<String>,
    pub interval: Option<String>,
    pub result_data: Vec<MetricResult>,
}
