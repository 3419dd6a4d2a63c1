// Query result shapes returned by Prometheus and Loki, and display
// rewriting of the timestamps they carry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::timestamp::{render_display_timestamp, DisplayPrecision, EpochUnit};

/// The `resultType` tag of a query response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Vector,
    Matrix,
    Streams,
    Scalar,
    String,
}

impl FromStr for ResultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vector" => Ok(ResultKind::Vector),
            "matrix" => Ok(ResultKind::Matrix),
            "streams" => Ok(ResultKind::Streams),
            "scalar" => Ok(ResultKind::Scalar),
            "string" => Ok(ResultKind::String),
            _ => Err(format!("Unknown result type: {}", s)),
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultKind::Vector => "vector",
            ResultKind::Matrix => "matrix",
            ResultKind::Streams => "streams",
            ResultKind::Scalar => "scalar",
            ResultKind::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// Replace the leading timestamp of every sample pair in `result` with its
/// display form. Scalar and string results are left alone.
pub fn rewrite_result_timestamps(kind: ResultKind, result: &mut Value) {
    let Some(items) = result.as_array_mut() else {
        return;
    };

    match kind {
        ResultKind::Vector => {
            for series in items {
                rewrite_pair(series.get_mut("value"), metric_timestamp);
                rewrite_pair(series.get_mut("histogram"), metric_timestamp);
            }
        }
        ResultKind::Matrix => {
            for series in items {
                rewrite_pairs(series.get_mut("values"), metric_timestamp);
                rewrite_pairs(series.get_mut("histograms"), metric_timestamp);
            }
        }
        ResultKind::Streams => {
            for stream in items {
                rewrite_pairs(stream.get_mut("values"), log_timestamp);
            }
        }
        ResultKind::Scalar | ResultKind::String => {}
    }
}

/// Rewrite the `result` of a response `data` object according to its
/// `resultType`. Unknown or missing tags are a no-op.
pub fn rewrite_data_timestamps(data: &mut Value) {
    let kind = data
        .get("resultType")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<ResultKind>().ok());

    if let (Some(kind), Some(result)) = (kind, data.get_mut("result")) {
        rewrite_result_timestamps(kind, result);
    }
}

fn metric_timestamp(ts: &Value) -> String {
    render_display_timestamp(ts, EpochUnit::Seconds, DisplayPrecision::Seconds)
}

fn log_timestamp(ts: &Value) -> String {
    render_display_timestamp(ts, EpochUnit::Nanoseconds, DisplayPrecision::Millis)
}

fn rewrite_pair(pair: Option<&mut Value>, render: fn(&Value) -> String) {
    if let Some(first) = pair.and_then(Value::as_array_mut).and_then(|p| p.first_mut()) {
        *first = Value::String(render(first));
    }
}

fn rewrite_pairs(pairs: Option<&mut Value>, render: fn(&Value) -> String) {
    if let Some(pairs) = pairs.and_then(Value::as_array_mut) {
        for pair in pairs {
            rewrite_pair(Some(pair), render);
        }
    }
}
