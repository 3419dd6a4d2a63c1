// Integration tests for the MCP tools
// A local axum app stands in for Prometheus and Loki.

use axum::{extract::Query, routing::get, Json, Router};
use promloki_core::GlobalConfig;
use promloki_mcp::{create_server, Config, McpServer, ToolError};
use serde_json::{json, Value};
use std::collections::HashMap;

async fn prom_query_range(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": {
            "resultType": "matrix",
            "result": [{
                "metric": { "query": params.get("query"), "step": params.get("step"), "limit": params.get("limit") },
                "values": [[1693000000, "1"]]
            }]
        }
    }))
}

async fn prom_query(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": {
            "resultType": "vector",
            "result": [{ "metric": { "limit": params.get("limit") }, "value": [1693000000, "3"] }]
        }
    }))
}

async fn loki_query_range(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": {
            "resultType": "streams",
            "result": [{
                "stream": { "start": params.get("start"), "end": params.get("end") },
                "values": [["1756209600123456789", "connection refused"]]
            }]
        }
    }))
}

/// Spawn the fake backends and return their base URL
async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/v1/query_range", get(prom_query_range))
        .route("/api/v1/query", get(prom_query))
        .route("/loki/api/v1/query_range", get(loki_query_range));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn setup_server(with_loki: bool) -> McpServer {
    let base = spawn_backend().await;
    let loki = if with_loki {
        format!(r#", "lokiConfig": {{ "baseUrl": "{}", "limit": 500 }}"#, base)
    } else {
        String::new()
    };
    let settings = GlobalConfig::from_json_str(&format!(
        r#"{{
            "appInstances": [{{
                "name": "mysql",
                "description": "MySQL health",
                "queryTemplates": [
                    {{ "metric": "qps", "template": "rate(mysql_global_status_queries{{{{labels}}}}[{{{{interval}}}}])" }}
                ]
            }}],
            "prometheusConfig": {{
                "baseUrl": "{}",
                "maxPoints": 60,
                "defaultInterval": "1m",
                "limit": 100
            }}
            {}
        }}"#,
        base, loki
    ))
    .unwrap();

    create_server(settings, Config::default()).unwrap()
}

#[tokio::test]
async fn test_list_supported_analyze_type() {
    let server = setup_server(false).await;
    let value = server
        .dispatch("list_supported_analyze_type", json!({}))
        .await
        .unwrap();
    assert_eq!(value, json!([{ "name": "mysql", "description": "MySQL health" }]));
}

#[tokio::test]
async fn test_analyze_uses_adaptive_step_and_labels() {
    let server = setup_server(false).await;
    let value = server
        .dispatch(
            "analyze",
            json!({ "name": "mysql", "labels": { "cluster": "tj" }, "start": 0, "end": 3600 }),
        )
        .await
        .unwrap();

    assert_eq!(value["step"], json!("1m"));
    assert_eq!(value["interval"], json!("1m"));
    assert_eq!(value["rangeQuery"], json!(true));

    let series = &value["resultData"][0]["result"][0];
    assert_eq!(
        series["metric"]["query"],
        json!(r#"rate(mysql_global_status_queries{cluster="tj"}[1m])"#)
    );
    assert_eq!(series["metric"]["step"], json!("1m"));
    assert_eq!(series["values"][0][0], json!("2023-08-26 05:46:40"));
}

#[tokio::test]
async fn test_analyze_rejects_inverted_range() {
    let server = setup_server(false).await;
    let err = server
        .dispatch(
            "analyze",
            json!({ "name": "mysql", "labels": {}, "start": 3600, "end": 0 }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Failed(_)));
    assert!(err.to_string().contains("must be greater than start"));
}

#[tokio::test]
async fn test_analyze_unknown_instance() {
    let server = setup_server(false).await;
    let err = server
        .dispatch(
            "analyze",
            json!({ "name": "redis", "labels": {}, "start": 0, "end": 3600 }),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("AppInstance not found: redis"));
}

#[tokio::test]
async fn test_prom_query_range_substitutes_interval() {
    let server = setup_server(false).await;
    let value = server
        .dispatch(
            "prom_query_range",
            json!({ "query": "rate(up[{{interval}}])", "start": 0, "end": 86400, "interval": "10m" }),
        )
        .await
        .unwrap();

    // 86400 / 60 points = 1440s -> 1800s on the ladder
    assert_eq!(value["step"], json!("30m"));
    assert_eq!(value["interval"], json!("10m"));
    assert_eq!(value["result"][0]["metric"]["query"], json!("rate(up[10m])"));
    assert_eq!(value["result"][0]["metric"]["limit"], json!("100"));
}

#[tokio::test]
async fn test_prom_query_instant() {
    let server = setup_server(false).await;
    let value = server
        .dispatch("prom_query", json!({ "query": "up", "limit": 5 }))
        .await
        .unwrap();
    assert_eq!(value["resultType"], json!("vector"));
    assert_eq!(value["result"][0]["metric"]["limit"], json!("5"));
    assert_eq!(value["result"][0]["value"], json!(["2023-08-26 05:46:40", "3"]));
}

#[tokio::test]
async fn test_loki_query_range_converts_bounds() {
    let server = setup_server(true).await;
    let value = server
        .dispatch(
            "loki_query_range",
            json!({
                "query": "{job=\"mysql_logs\"}",
                "start": "2025-08-26T20:00:00+08:00",
                "end": "2025-08-26T12:30:00.5Z"
            }),
        )
        .await
        .unwrap();

    let stream = &value["data"]["result"][0];
    assert_eq!(stream["stream"]["start"], json!("1756209600000000000"));
    assert_eq!(stream["stream"]["end"], json!("1756211400500000000"));
    assert_eq!(stream["values"][0][0], json!("2025-08-26 20:00:00.123"));
}

#[tokio::test]
async fn test_loki_query_range_errors() {
    let server = setup_server(false).await;

    let malformed = server
        .dispatch(
            "loki_query_range",
            json!({ "query": "{job=\"x\"}", "start": "2025-08-26T12:00:00", "end": "2025-08-26T12:30:00Z" }),
        )
        .await
        .unwrap_err();
    assert!(malformed.to_string().contains("malformed timestamp"));

    let inverted = server
        .dispatch(
            "loki_query_range",
            json!({ "query": "{job=\"x\"}", "start": "2025-08-26T12:30:00Z", "end": "2025-08-26T12:00:00Z" }),
        )
        .await
        .unwrap_err();
    assert!(inverted.to_string().contains("end must be greater than start"));

    let unconfigured = server
        .dispatch(
            "loki_query_range",
            json!({ "query": "{job=\"x\"}", "start": "2025-08-26T12:00:00Z", "end": "2025-08-26T12:30:00Z" }),
        )
        .await
        .unwrap_err();
    assert!(unconfigured.to_string().contains("lokiConfig.baseUrl is not configured"));
}

#[tokio::test]
async fn test_clock_tools() {
    let server = setup_server(false).await;
    let value = server
        .dispatch("subtract", json!({ "minuend": 1000, "subtrahend": 1800 }))
        .await
        .unwrap();
    assert_eq!(value, json!({ "result": -800 }));

    let now = server.dispatch("current_timestamp", json!({})).await.unwrap();
    assert!(now["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_validation_and_unknown_tool() {
    let server = setup_server(false).await;

    let err = server
        .dispatch("prom_query_range", json!({ "query": "up", "start": 0 }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
    assert_eq!(err.to_string(), "Validation error: end is required");

    let err = server.dispatch("drop_tables", json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "drop_tables"));
}
