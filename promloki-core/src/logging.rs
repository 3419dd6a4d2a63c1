// Tracing setup. Logs always go to stderr: stdout carries the MCP
// protocol when the stdio transport is used.

use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "PROM_LOG_LEVEL";

/// Build the filter: `RUST_LOG`, then `PROM_LOG_LEVEL`, then `default_level`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| default_level.to_string());

    EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(default_level))
        .with_target(true)
        .try_init();
}
