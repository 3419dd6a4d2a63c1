use std::sync::Arc;
use crate::server::PromlokiMcpHandler;

pub mod stdio;
pub mod http;

/// Transport types supported by the MCP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportType {
    Stdio,
    Http { port: u16 },
}

impl TransportType {
    /// Parse a transport name as given on the command line
    pub fn from_name(name: &str, port: u16) -> anyhow::Result<Self> {
        match name.to_lowercase().as_str() {
            "stdio" => Ok(TransportType::Stdio),
            "http" | "sse" => Ok(TransportType::Http { port }),
            other => Err(anyhow::anyhow!(
                "Unknown transport: {}. Must be 'stdio' or 'http'",
                other
            )),
        }
    }
}

/// Create a transport instance and run the server
pub async fn create_and_run_transport(
    transport_type: TransportType,
    handler: Arc<PromlokiMcpHandler>,
) -> anyhow::Result<()> {
    match transport_type {
        TransportType::Stdio => {
            stdio::run_stdio_server(handler).await?;
        }
        TransportType::Http { port } => {
            http::run_http_server(handler, port).await?;
        }
    }
    Ok(())
}
