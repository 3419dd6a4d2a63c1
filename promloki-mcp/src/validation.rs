use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

/// Validate input parameters against the expected schema
pub fn validate_tool_params(tool_name: &str, params: &Value) -> Result<()> {
    match tool_name {
        "list_supported_analyze_type" | "current_timestamp" => Ok(()),
        "analyze" => validate_analyze(params),
        "prom_query" => validate_prom_query(params),
        "prom_query_range" => validate_prom_query_range(params),
        "loki_query_range" => validate_loki_query_range(params),
        "subtract" => validate_subtract(params),
        _ => Err(anyhow!("Unknown tool: {}", tool_name)),
    }
}

fn as_object(params: &Value) -> Result<&Map<String, Value>> {
    params
        .as_object()
        .ok_or_else(|| anyhow!("Parameters must be an object"))
}

fn require_string(map: &Map<String, Value>, key: &str) -> Result<()> {
    let value = map.get(key).ok_or_else(|| anyhow!("{} is required", key))?;
    match value.as_str() {
        Some(s) if s.trim().is_empty() => Err(anyhow!("{} cannot be empty", key)),
        Some(_) => Ok(()),
        None => Err(anyhow!("{} must be a string", key)),
    }
}

fn require_integer(map: &Map<String, Value>, key: &str) -> Result<()> {
    let value = map.get(key).ok_or_else(|| anyhow!("{} is required", key))?;
    if value.as_i64().is_none() {
        return Err(anyhow!("{} must be an integer", key));
    }
    Ok(())
}

fn optional_string(map: &Map<String, Value>, key: &str) -> Result<()> {
    match map.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(anyhow!("{} must be a string", key)),
    }
}

fn optional_integer(map: &Map<String, Value>, key: &str) -> Result<()> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(v) if v.as_i64().is_some() => Ok(()),
        Some(_) => Err(anyhow!("{} must be an integer", key)),
    }
}

fn optional_limit(map: &Map<String, Value>) -> Result<()> {
    match map.get("limit") {
        None | Some(Value::Null) => Ok(()),
        Some(v) => match v.as_i64() {
            Some(n) if n >= 1 => Ok(()),
            Some(_) => Err(anyhow!("limit must be at least 1")),
            None => Err(anyhow!("limit must be an integer")),
        },
    }
}

fn validate_analyze(params: &Value) -> Result<()> {
    let map = as_object(params)?;
    require_string(map, "name")?;

    let labels = map.get("labels").ok_or_else(|| anyhow!("labels is required"))?;
    match labels {
        Value::Object(labels) => {
            for (key, value) in labels {
                if !value.is_string() {
                    return Err(anyhow!("labels.{} must be a string, found: {}", key, value));
                }
            }
        }
        Value::Null => {}
        _ => return Err(anyhow!("labels must be an object")),
    }

    require_integer(map, "start")?;
    require_integer(map, "end")?;
    optional_string(map, "interval")
}

fn validate_prom_query(params: &Value) -> Result<()> {
    let map = as_object(params)?;
    require_string(map, "query")?;
    optional_integer(map, "time")?;
    optional_string(map, "timeout")?;
    optional_limit(map)
}

fn validate_prom_query_range(params: &Value) -> Result<()> {
    let map = as_object(params)?;
    require_string(map, "query")?;
    require_integer(map, "start")?;
    require_integer(map, "end")?;
    optional_string(map, "interval")?;
    optional_string(map, "timeout")?;
    optional_limit(map)
}

fn validate_loki_query_range(params: &Value) -> Result<()> {
    let map = as_object(params)?;
    require_string(map, "query")?;
    require_string(map, "start")?;
    require_string(map, "end")?;
    optional_limit(map)
}

fn validate_subtract(params: &Value) -> Result<()> {
    let map = as_object(params)?;
    require_integer(map, "minuend")?;
    require_integer(map, "subtrahend")
}
