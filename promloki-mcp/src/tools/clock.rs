use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
struct SubtractArgs {
    minuend: i64,
    subtrahend: i64,
}

/// Current unix timestamp in seconds
pub async fn current_timestamp() -> Result<Value> {
    let ts = chrono::Utc::now().timestamp();
    info!("Calling current_timestamp now={}", ts);
    Ok(json!({ "timestamp": ts }))
}

/// `minuend - subtrahend`, so clients never do time arithmetic themselves
pub async fn subtract(args: Value) -> Result<Value> {
    let args: SubtractArgs = serde_json::from_value(args).context("Invalid subtract arguments")?;
    let result = args
        .minuend
        .checked_sub(args.subtrahend)
        .ok_or_else(|| anyhow!("integer overflow in {} - {}", args.minuend, args.subtrahend))?;
    info!("Calling subtract {}-{}={}", args.minuend, args.subtrahend, result);
    Ok(json!({ "result": result }))
}
