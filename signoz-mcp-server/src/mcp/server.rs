//! MCP Server implementation
//!
//! Transport-independent JSON-RPC handling. The HTTP and stdio
//! transports both feed requests through [`McpServer`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, info_span, warn, Instrument};

use signoz_mcp_protocol::{is_supported_protocol_version, PROTOCOL_VERSION};

use crate::config::SessionMode;

use super::error::McpError;
use super::handlers::ToolContext;
use super::params::ToolParams;
use super::protocol::{
    InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, Tool, ToolResult,
    ToolsListResult,
};
use super::tools::{get_tool_definitions, is_known_tool};

/// MCP Server
///
/// Shared by every connection. The only mutable state is the
/// `initialized` flag, and only [`SessionMode::Stateful`] reads it.
pub struct McpServer {
    tools: ToolContext,
    catalog: Vec<Tool>,
    session_mode: SessionMode,
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a server whose catalog is stamped with the current time
    pub fn new(tools: ToolContext, session_mode: SessionMode) -> Self {
        Self {
            tools,
            catalog: get_tool_definitions(Utc::now()),
            session_mode,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn session_mode(&self) -> SessionMode {
        self.session_mode
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn ready(&self) -> bool {
        self.session_mode == SessionMode::Stateless || self.is_initialized()
    }

    /// Handle one raw frame (an HTTP body or a stdio line)
    pub async fn handle_bytes(&self, raw: &[u8]) -> JsonRpcResponse {
        debug!(raw = %String::from_utf8_lossy(raw), "received envelope");
        match serde_json::from_slice::<Value>(raw) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                warn!(error = %e, "unparseable envelope");
                JsonRpcResponse::error(Value::Null, McpError::Parse(e.to_string()).into())
            }
        }
    }

    /// Handle a decoded JSON value that should be a request object
    pub async fn handle_value(&self, value: Value) -> JsonRpcResponse {
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        if !value.is_object() {
            return JsonRpcResponse::error(
                Value::Null,
                McpError::InvalidRequest("expected a JSON object".into()).into(),
            );
        }

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return JsonRpcResponse::error(id, McpError::InvalidRequest(e.to_string()).into());
            }
        };

        if request.jsonrpc != "2.0" {
            let mut error = JsonRpcError::from(McpError::InvalidRequest(
                "Invalid JSON-RPC version".into(),
            ));
            error.data = Some(json!({"expected": "2.0", "got": request.jsonrpc}));
            return JsonRpcResponse::error(request.id, error);
        }

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let started = Instant::now();
        let req_id = request.id.clone();
        let method = request.method.clone();
        info!(req_id = %req_id, method = %method, "request");

        let result = self.route(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                info!(req_id = %req_id, method = %method, elapsed_ms, "request complete");
                JsonRpcResponse::success(req_id, value)
            }
            Err(e) => {
                warn!(req_id = %req_id, method = %method, elapsed_ms, error = %e, "request failed");
                JsonRpcResponse::error(req_id, e.into())
            }
        }
    }

    async fn route(&self, request: JsonRpcRequest) -> Result<Value, McpError> {
        if request.is_notification() {
            debug!(method = %request.method, "notification acknowledged");
            return Ok(json!({}));
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            _ if !self.ready() => Err(McpError::NotInitialized),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            other => Err(McpError::MethodNotFound(other.into())),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: &Value) -> Result<Value, McpError> {
        let client = params.get("protocolVersion").and_then(Value::as_str);
        match client {
            Some(version) if is_supported_protocol_version(version) => {}
            _ => {
                return Err(McpError::UnsupportedProtocolVersion {
                    client: client.unwrap_or("none").into(),
                    server: PROTOCOL_VERSION.into(),
                })
            }
        }

        self.initialized.store(true, Ordering::Release);
        info!(client_version = client, "MCP session initialized");

        serde_json::to_value(InitializeResult::default()).map_err(|e| McpError::Internal(e.to_string()))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let result = ToolsListResult {
            tools: self.catalog.clone(),
        };
        serde_json::to_value(result).map_err(|e| McpError::Internal(e.to_string()))
    }

    /// Handle tools/call request
    ///
    /// Returns `Err(McpError)` for protocol-level errors (missing name,
    /// unknown tool, bad arguments). Upstream failures come back as a
    /// successful result whose text carries a `failed`/`error` outcome.
    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::InvalidParams("'name' is required for tool execution".into()))?;
        if !is_known_tool(name) {
            return Err(McpError::UnknownTool(name.into()));
        }

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        let call = ToolParams::parse(name, arguments)?;

        let tools = self.tools.clone();
        let span = info_span!("tool", tool = call.tool_name());
        let started = Instant::now();
        let outcome = tokio::spawn(async move { tools.dispatch(call, Utc::now()).await }.instrument(span))
            .await
            .map_err(|e| McpError::Internal(format!("Error executing tool: {e}")))?;
        debug!(
            tool = name,
            status = ?outcome.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tool finished"
        );

        let text = serde_json::to_string_pretty(&outcome).map_err(|e| McpError::Internal(e.to_string()))?;
        serde_json::to_value(ToolResult::text(text)).map_err(|e| McpError::Internal(e.to_string()))
    }
}
