use std::sync::Arc;

use promloki_core::{GlobalConfig, LokiClient, PrometheusClient};

pub mod schema;
pub mod server;
pub mod tools;
pub mod transport;
pub mod validation;

/// Identity advertised to MCP clients
#[derive(Debug, Clone)]
pub struct Config {
    pub server_name: String,
    pub server_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: "prometheus-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Factory function to create MCP server from a loaded bridge configuration
pub fn create_server(settings: GlobalConfig, config: Config) -> anyhow::Result<McpServer> {
    let pcfg = &settings.prometheus_config;
    let prometheus = PrometheusClient::new(
        &pcfg.base_url,
        pcfg.username.clone(),
        pcfg.password.clone(),
        settings.query_timeout(),
    )?;

    let loki = match &settings.loki_config {
        Some(lcfg) if !lcfg.base_url.trim().is_empty() => {
            Some(LokiClient::new(&lcfg.base_url, lcfg.query_timeout())?)
        }
        _ => None,
    };

    Ok(McpServer::new(Arc::new(settings), prometheus, loki, config))
}

// Re-export the server struct
pub use server::{McpServer, PromlokiMcpHandler, ToolError};
