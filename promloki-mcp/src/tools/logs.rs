use anyhow::{anyhow, bail, Context, Result};
use promloki_core::parse_rfc3339_nano_to_nanos;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::McpServer;

#[derive(Debug, Deserialize)]
struct LokiQueryRangeArgs {
    query: String,
    start: String,
    end: String,
    #[serde(default)]
    limit: Option<u64>,
}

/// Run a LogQL range query between two RFC3339Nano timestamps
pub async fn loki_query_range(server: &McpServer, args: Value) -> Result<Value> {
    let args: LokiQueryRangeArgs =
        serde_json::from_value(args).context("Invalid loki_query_range arguments")?;
    info!("Calling loki_query_range start={} end={}", args.start, args.end);

    let start_ns = parse_rfc3339_nano_to_nanos(&args.start)?;
    let end_ns = parse_rfc3339_nano_to_nanos(&args.end)?;
    if end_ns <= start_ns {
        bail!("end must be greater than start");
    }

    let client = server.loki().ok_or_else(|| {
        error!("lokiConfig.baseUrl is not configured");
        anyhow!("lokiConfig.baseUrl is not configured")
    })?;

    let limit = args
        .limit
        .or_else(|| server.settings().loki_config.as_ref().and_then(|l| l.limit));
    let body = client
        .query_range(&args.query, start_ns, end_ns, limit)
        .await
        .context("Loki query failed")?;
    Ok(body)
}
