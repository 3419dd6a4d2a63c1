use promloki_core::{GlobalConfig, LokiClient, PrometheusClient};
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    ServerHandler,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::tools::{
    analyze, current_timestamp, list_supported_analyze_type, loki_query_range, prom_query,
    prom_query_range, subtract,
};
use crate::Config;

pub const INSTRUCTIONS: &str = "Prometheus and Loki query bridge. Always call \
list_supported_analyze_type first to discover predefined analyses. Use current_timestamp and \
subtract to compute time ranges (unix seconds) instead of doing the arithmetic yourself. \
loki_query_range takes RFC3339Nano bounds with an explicit zone; write Beijing time as +08:00, \
never as Z.";

/// Why a tool call did not produce a result
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Validation error: {0:#}")]
    Validation(anyhow::Error),
    #[error("Error: {0:#}")]
    Failed(anyhow::Error),
}

/// Main MCP server structure
#[derive(Clone)]
pub struct McpServer {
    pub settings: Arc<GlobalConfig>,
    pub prometheus: PrometheusClient,
    pub loki: Option<LokiClient>,
    pub config: Config,
}

impl McpServer {
    /// Create new MCP server instance
    pub fn new(
        settings: Arc<GlobalConfig>,
        prometheus: PrometheusClient,
        loki: Option<LokiClient>,
        config: Config,
    ) -> Self {
        Self {
            settings,
            prometheus,
            loki,
            config,
        }
    }

    pub fn settings(&self) -> Arc<GlobalConfig> {
        self.settings.clone()
    }

    pub fn prometheus(&self) -> &PrometheusClient {
        &self.prometheus
    }

    pub fn loki(&self) -> Option<&LokiClient> {
        self.loki.as_ref()
    }

    /// Get config reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate the arguments and run the named tool
    pub async fn dispatch(&self, tool_name: &str, arguments: Value) -> Result<Value, ToolError> {
        if !crate::schema::TOOL_NAMES.contains(&tool_name) {
            return Err(ToolError::UnknownTool(tool_name.to_string()));
        }
        crate::validation::validate_tool_params(tool_name, &arguments)
            .map_err(ToolError::Validation)?;

        let result = match tool_name {
            "list_supported_analyze_type" => list_supported_analyze_type(self).await,
            "analyze" => analyze(self, arguments).await,
            "prom_query" => prom_query(self, arguments).await,
            "prom_query_range" => prom_query_range(self, arguments).await,
            "loki_query_range" => loki_query_range(self, arguments).await,
            "current_timestamp" => current_timestamp().await,
            "subtract" => subtract(arguments).await,
            _ => return Err(ToolError::UnknownTool(tool_name.to_string())),
        };

        result.map_err(|e| {
            tracing::warn!("Tool {} failed: {:#}", tool_name, e);
            ToolError::Failed(e)
        })
    }

    /// Create a handler for this server
    pub fn create_handler(&self) -> PromlokiMcpHandler {
        PromlokiMcpHandler::new(Arc::new(self.clone()))
    }

    /// Start the MCP server with stdio transport
    /// IMPORTANT: nothing may be written to stdout besides JSON-RPC
    pub async fn start_stdio(&self) -> anyhow::Result<()> {
        use crate::transport::{create_and_run_transport, TransportType};

        let handler = Arc::new(self.create_handler());
        create_and_run_transport(TransportType::Stdio, handler).await
    }

    /// Start the MCP server with HTTP transport
    pub async fn start_http(&self, port: u16) -> anyhow::Result<()> {
        use crate::transport::{create_and_run_transport, TransportType};

        let handler = Arc::new(self.create_handler());

        tracing::info!("Starting MCP server with HTTP transport on port {}", port);
        tracing::info!("Server name: {}", self.config.server_name);
        tracing::info!("Server version: {}", self.config.server_version);
        tracing::info!("Prometheus: {}", self.prometheus.base_url());
        match &self.loki {
            Some(loki) => tracing::info!("Loki: {}", loki.base_url()),
            None => tracing::info!("Loki: not configured"),
        }

        create_and_run_transport(TransportType::Http { port }, handler).await
    }
}

/// MCP Server Handler implementing the RMCP ServerHandler trait
#[derive(Clone)]
pub struct PromlokiMcpHandler {
    pub server: Arc<McpServer>,
}

impl PromlokiMcpHandler {
    pub fn new(server: Arc<McpServer>) -> Self {
        Self { server }
    }
}

impl ServerHandler for PromlokiMcpHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.server.config.server_name.clone(),
                version: self.server.config.server_version.clone(),
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<ListToolsResult, rmcp::Error> {
        Ok(ListToolsResult {
            tools: crate::schema::tool_definitions(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let tool_name = request.name.as_ref();
        let arguments = Value::Object(request.arguments.unwrap_or_default());

        match self.server.dispatch(tool_name, arguments).await {
            Ok(value) => {
                let text = serde_json::to_string_pretty(&value).map_err(|e| {
                    rmcp::Error::internal_error(format!("Failed to serialize result: {}", e), None)
                })?;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(ToolError::UnknownTool(name)) => Err(rmcp::Error::invalid_request(
                format!("Unknown tool: {}", name),
                None,
            )),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}
