//! MCP Server implementation
//!
//! Parses one JSON-RPC message, dispatches it and wraps the outcome in a
//! JSON-RPC envelope. Nothing escapes: every failure becomes an `error`
//! envelope.

use serde_json::{json, Value};

use crate::error::{McpError, Result, WorkflowMcpError};
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "n8n-workflow-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for n8n workflow editing
pub struct McpServer {
    /// Tool registry
    tools: ToolRegistry,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Handle a raw request body and produce a raw response body
    pub async fn handle_raw(&self, body: &[u8]) -> String {
        let response = self.handle_body(body).await;
        serde_json::to_string(&response).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response: {}", e);
            json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": null,
                "error": { "code": SERVER_ERROR_CODE, "message": e.to_string() }
            })
            .to_string()
        })
    }

    /// Handle a raw request body
    pub async fn handle_body(&self, body: &[u8]) -> JsonRpcResponse {
        let request = match parse_request(body) {
            Ok(request) => request,
            Err((id, err)) => {
                tracing::debug!("Malformed request: {}", err);
                return error_response(id, &err);
            }
        };

        let id = request.id.clone();
        match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                tracing::warn!(method = %request.method, "Request failed: {}", err);
                error_response(id, &err)
            }
        }
    }

    /// Route a parsed request by method name
    async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value> {
        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request),
            methods::INITIALIZED | methods::PING => Ok(json!({})),
            methods::LIST_TOOLS => self.handle_list_tools(),
            methods::CALL_TOOL => self.handle_call_tool(request).await,
            other => Err(McpError::UnsupportedMethod {
                method: other.to_string(),
            }
            .into()),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: &JsonRpcRequest) -> Result<Value> {
        let params: InitializeParams = match &request.params {
            Some(Value::Null) | None => InitializeParams::default(),
            Some(p) => serde_json::from_value(p.clone()).map_err(malformed)?,
        };

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, "Client initialized");
        }

        let result = InitializeResult {
            protocol_version: params
                .protocol_version
                .unwrap_or_else(|| MCP_VERSION.to_string()),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> Result<Value> {
        let result = ListToolsResult {
            tools: self.tools.list_tools(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> Result<Value> {
        let params: CallToolParams = match &request.params {
            Some(p) => serde_json::from_value(p.clone()).map_err(malformed)?,
            None => {
                return Err(McpError::MalformedRequest {
                    message: "Missing tool parameters".to_string(),
                }
                .into())
            }
        };

        let result = self.tools.call_tool(&params.name, params.arguments).await?;
        Ok(serde_json::to_value(result)?)
    }
}

/// Parse a request body. On failure, return whatever ID could be recovered.
fn parse_request(
    body: &[u8],
) -> std::result::Result<JsonRpcRequest, (Option<RequestId>, WorkflowMcpError)> {
    let value: Value = serde_json::from_slice(body).map_err(|e| (None, malformed(e)))?;
    let id = value.get("id").and_then(RequestId::from_value);
    serde_json::from_value(value).map_err(|e| (id, malformed(e)))
}

fn malformed(err: serde_json::Error) -> WorkflowMcpError {
    McpError::MalformedRequest {
        message: err.to_string(),
    }
    .into()
}

fn error_response(id: Option<RequestId>, err: &WorkflowMcpError) -> JsonRpcResponse {
    JsonRpcResponse::error(
        id,
        JsonRpcError::server_error(err.to_string()).with_data(err.data()),
    )
}
