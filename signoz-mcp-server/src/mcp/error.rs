//! MCP error types

use super::protocol::JsonRpcError;

/// MCP server errors
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Body was not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Valid JSON, but not a JSON-RPC request object
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Method not found
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Unknown tool
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// Method called before a successful `initialize`
    #[error("Server not initialized. Call initialize first.")]
    NotInitialized,

    /// Client protocol version outside the accepted family
    #[error("Unsupported protocol version: {client}. Server supports: {server}")]
    UnsupportedProtocolVersion { client: String, server: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<McpError> for JsonRpcError {
    fn from(err: McpError) -> Self {
        let code = match &err {
            McpError::Parse(_) => JsonRpcError::PARSE_ERROR,
            McpError::InvalidRequest(_) => JsonRpcError::INVALID_REQUEST,
            McpError::MethodNotFound(_) | McpError::UnknownTool(_) => JsonRpcError::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::UnsupportedProtocolVersion { .. } => {
                JsonRpcError::INVALID_PARAMS
            }
            McpError::NotInitialized => JsonRpcError::NOT_INITIALIZED,
            McpError::Internal(_) => JsonRpcError::INTERNAL_ERROR,
        };
        JsonRpcError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: McpError) -> i32 {
        JsonRpcError::from(err).code
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(code_of(McpError::Parse("x".into())), -32700);
        assert_eq!(code_of(McpError::InvalidRequest("x".into())), -32600);
        assert_eq!(code_of(McpError::MethodNotFound("x".into())), -32601);
        assert_eq!(code_of(McpError::UnknownTool("x".into())), -32601);
        assert_eq!(code_of(McpError::InvalidParams("x".into())), -32602);
        assert_eq!(code_of(McpError::NotInitialized), -32002);
        assert_eq!(code_of(McpError::Internal("x".into())), -32603);
    }

    #[test]
    fn test_unknown_tool_message() {
        let err = JsonRpcError::from(McpError::UnknownTool("nope".into()));
        assert_eq!(err.message, "Tool not found: nope");
    }

    #[test]
    fn test_protocol_version_message() {
        let err = JsonRpcError::from(McpError::UnsupportedProtocolVersion {
            client: "2024-11-05".into(),
            server: "2025-06-18".into(),
        });
        assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
        assert!(err.message.contains("2024-11-05"));
        assert!(err.message.contains("2025-06-18"));
    }
}
