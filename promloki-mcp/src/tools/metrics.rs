use anyhow::{Context, Result};
use promloki_core::template::INTERVAL_PLACEHOLDER;
use promloki_core::{
    apply_min_step, compute_adaptive_step, AnalyzeRequest, AnalyzeService, GlobalConfig,
    QueryParams,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::McpServer;

#[derive(Debug, Deserialize)]
struct AnalyzeArgs {
    name: String,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
    start: i64,
    end: i64,
    #[serde(default)]
    interval: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromQueryArgs {
    query: String,
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    timeout: Option<String>,
    #[serde(default)]
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PromQueryRangeArgs {
    query: String,
    start: i64,
    end: i64,
    #[serde(default)]
    interval: Option<String>,
    #[serde(default)]
    timeout: Option<String>,
    #[serde(default)]
    limit: Option<u64>,
}

/// Adaptive step for `[start, end]`, raised to the configured minimum step
pub fn resolve_step(settings: &GlobalConfig, start: i64, end: i64) -> Result<String> {
    let pcfg = &settings.prometheus_config;
    let step = compute_adaptive_step(start, end, pcfg.max_points, pcfg.default_step.as_deref())?;
    Ok(apply_min_step(&step, pcfg.min_step.as_deref()))
}

/// List the configured analysis types
pub async fn list_supported_analyze_type(server: &McpServer) -> Result<Value> {
    info!("Calling list_supported_analyze_type");
    let types: Vec<Value> = server
        .settings()
        .app_instances
        .iter()
        .map(|ai| {
            json!({
                "name": ai.name,
                "description": ai.description.clone().unwrap_or_default(),
            })
        })
        .collect();
    Ok(Value::Array(types))
}

/// Run a predefined analysis as a range query with an adaptive step
pub async fn analyze(server: &McpServer, args: Value) -> Result<Value> {
    let args: AnalyzeArgs = serde_json::from_value(args).context("Invalid analyze arguments")?;
    info!(
        "Calling analyze name={} start={} end={} interval={:?}",
        args.name, args.start, args.end, args.interval
    );

    let settings = server.settings();
    let step = resolve_step(&settings, args.start, args.end)?;
    let interval = settings.effective_interval(args.interval.as_deref());
    debug!("analyze step={} interval={}", step, interval);

    let service = AnalyzeService::new(settings.clone(), Arc::new(server.prometheus().clone()));
    let request = AnalyzeRequest {
        name: args.name,
        labels: args.labels.unwrap_or_default(),
        start: Some(args.start),
        end: Some(args.end),
        step: Some(step),
        interval: Some(interval),
    };
    let report = service.get_report(&request).await?;
    Ok(serde_json::to_value(report)?)
}

/// Run an instant PromQL query
pub async fn prom_query(server: &McpServer, args: Value) -> Result<Value> {
    let args: PromQueryArgs =
        serde_json::from_value(args).context("Invalid prom_query arguments")?;
    info!("Calling prom_query time={:?} limit={:?}", args.time, args.limit);

    let params = QueryParams {
        query: args.query,
        time: args.time,
        timeout: args.timeout,
        limit: args.limit.or(server.settings().prometheus_config.limit),
        ..Default::default()
    };
    let data = server.prometheus().execute(&params).await?;
    Ok(serde_json::to_value(data)?)
}

/// Run a PromQL range query; the step is derived from the range and the point budget
pub async fn prom_query_range(server: &McpServer, args: Value) -> Result<Value> {
    let args: PromQueryRangeArgs =
        serde_json::from_value(args).context("Invalid prom_query_range arguments")?;
    info!(
        "Calling prom_query_range start={} end={} interval={:?}",
        args.start, args.end, args.interval
    );

    let settings = server.settings();
    let step = resolve_step(&settings, args.start, args.end)?;
    let interval = settings.effective_interval(args.interval.as_deref());
    debug!("prom_query_range step={} interval={}", step, interval);

    let mut params = QueryParams::range(
        args.query.replace(INTERVAL_PLACEHOLDER, &interval),
        args.start,
        args.end,
        step.clone(),
    );
    params.timeout = args.timeout;
    params.limit = args.limit.or(settings.prometheus_config.limit);

    let data = server.prometheus().execute(&params).await?;
    let mut out = serde_json::to_value(data)?;
    out["step"] = json!(step);
    out["interval"] = json!(interval);
    Ok(out)
}
