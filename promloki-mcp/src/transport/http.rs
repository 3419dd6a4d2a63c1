use rmcp::transport::sse_server::SseServer;
use std::net::SocketAddr;
use std::sync::Arc;
use crate::server::PromlokiMcpHandler;

pub async fn run_http_server(handler: Arc<PromlokiMcpHandler>, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    tracing::info!("Starting SSE MCP server on {}", addr);

    let server_handler = handler.as_ref().clone();
    let server = SseServer::serve(addr)
        .await?
        .with_service_directly(move || server_handler.clone());

    tracing::info!("SSE MCP server listening on port {}", port);
    tracing::info!("Available endpoints: SSE /sse, messages /message");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down SSE MCP server...");
    server.cancel();

    Ok(())
}
