use rmcp::{service::serve_server, transport::io::stdio};
use std::sync::Arc;
use crate::server::PromlokiMcpHandler;

pub async fn run_stdio_server(handler: Arc<PromlokiMcpHandler>) -> anyhow::Result<()> {
    // stdout carries JSON-RPC only; logs go to stderr
    let (stdin, stdout) = stdio();

    let handler_clone = (*handler).clone();
    let service = serve_server(handler_clone, (stdin, stdout)).await?;

    // Runs until the client closes the connection
    let reason = service.waiting().await?;
    tracing::info!("stdio MCP session ended: {:?}", reason);

    Ok(())
}
