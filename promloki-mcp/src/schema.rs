use rmcp::model::{JsonObject, Tool};
use serde_json::{json, Value};
use std::sync::Arc;

pub const RFC3339_NANO_HINT: &str = "RFC3339Nano string with a mandatory zone (Z or ±HH:MM), \
e.g. 2025-08-26T12:00:00.000000000Z (UTC) or 2025-08-26T20:00:00.000000000+08:00. \
Fractions shorter than 9 digits are right-padded with zeros.";

/// Names of every tool the server handles
pub const TOOL_NAMES: [&str; 7] = [
    "list_supported_analyze_type",
    "analyze",
    "prom_query",
    "prom_query_range",
    "loki_query_range",
    "current_timestamp",
    "subtract",
];

fn object(value: Value) -> Arc<JsonObject> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

/// JSON schema for tools without arguments
pub fn empty_schema() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

/// JSON schema for analyze tool
pub fn analyze_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "Analysis type name, as returned by list_supported_analyze_type"
            },
            "labels": {
                "type": "object",
                "additionalProperties": { "type": "string" },
                "description": "PromQL label filters, e.g. {\"cluster_name\":\"aicall-tj\"}; {} means no filter"
            },
            "start": { "type": "integer", "description": "Range start, unix seconds" },
            "end": { "type": "integer", "description": "Range end, unix seconds; must be greater than start" },
            "interval": {
                "type": "string",
                "description": "Range vector window substituted for {{interval}}; defaults to the configured defaultInterval"
            }
        },
        "required": ["name", "labels", "start", "end"]
    })
}

/// JSON schema for prom_query tool
pub fn prom_query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": "PromQL expression" },
            "time": { "type": "integer", "description": "Evaluation timestamp, unix seconds" },
            "timeout": { "type": "string", "description": "Query timeout such as 15s, 1m" },
            "limit": { "type": "integer", "minimum": 1, "description": "Maximum number of returned series" }
        },
        "required": ["query"]
    })
}

/// JSON schema for prom_query_range tool
pub fn prom_query_range_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": "PromQL expression, may contain {{interval}}" },
            "start": { "type": "integer", "description": "Range start, unix seconds" },
            "end": { "type": "integer", "description": "Range end, unix seconds" },
            "interval": { "type": "string", "description": "Window substituted for {{interval}}" },
            "timeout": { "type": "string", "description": "Query timeout such as 15s, 1m" },
            "limit": { "type": "integer", "minimum": 1, "description": "Maximum number of returned series" }
        },
        "required": ["query", "start", "end"]
    })
}

/// JSON schema for loki_query_range tool
pub fn loki_query_range_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "LogQL selector and pipeline, e.g. {job=\"mysql_logs\"}; no time range here"
            },
            "start": { "type": "string", "description": RFC3339_NANO_HINT },
            "end": { "type": "string", "description": RFC3339_NANO_HINT },
            "limit": { "type": "integer", "minimum": 1, "description": "Maximum number of log lines" }
        },
        "required": ["query", "start", "end"]
    })
}

/// JSON schema for subtract tool
pub fn subtract_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "minuend": { "type": "integer", "description": "Usually the end timestamp or the current timestamp" },
            "subtrahend": { "type": "integer", "description": "Seconds to subtract, e.g. 1800 for 30 minutes" }
        },
        "required": ["minuend", "subtrahend"]
    })
}

/// Every tool the server advertises
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "list_supported_analyze_type",
            "Call this first: lists every predefined analysis type (name and description).",
            object(empty_schema()),
        ),
        Tool::new(
            "analyze",
            "Run a predefined analysis as a range query. The step adapts to (end - start) and the configured point budget.",
            object(analyze_schema()),
        ),
        Tool::new(
            "prom_query",
            "Run an instant PromQL query.",
            object(prom_query_schema()),
        ),
        Tool::new(
            "prom_query_range",
            "Run a PromQL range query with an adaptive step.",
            object(prom_query_range_schema()),
        ),
        Tool::new(
            "loki_query_range",
            "Run a Loki LogQL range query. start/end are RFC3339Nano strings with a zone; returned log timestamps are rendered as UTC+8 with millisecond precision.",
            object(loki_query_range_schema()),
        ),
        Tool::new(
            "current_timestamp",
            "Current unix timestamp in seconds.",
            object(empty_schema()),
        ),
        Tool::new(
            "subtract",
            "Integer subtraction: minuend - subtrahend. Use it to compute 'last N minutes' start times instead of doing the arithmetic yourself.",
            object(subtract_schema()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_unique() {
        let tools = tool_definitions();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tools.len());
        assert_eq!(tools.len(), TOOL_NAMES.len());
        for tool in &tools {
            assert!(TOOL_NAMES.contains(&tool.name.as_ref()), "{}", tool.name);
        }
    }

    #[test]
    fn test_schemas_are_objects() {
        for tool in tool_definitions() {
            assert_eq!(tool.input_schema.get("type"), Some(&json!("object")), "{}", tool.name);
        }
    }
}
