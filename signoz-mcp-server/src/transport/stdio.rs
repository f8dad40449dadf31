//! Standard-stream transport
//!
//! One JSON-RPC request per input line, one response per output line.
//! Nothing else may be written to stdout.

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{info, warn};

use signoz_mcp_protocol::{CodecError, Frame, JsonLineCodec};
use signoz_mcp_utils::{GatewayError, Result};

use crate::mcp::{JsonRpcError, JsonRpcResponse, McpError, McpServer};

/// Serve MCP over stdin/stdout until EOF
pub async fn run_stdio_server(server: &McpServer) -> Result<()> {
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve MCP over any byte stream pair until `input` ends
pub async fn serve<R, W>(server: &McpServer, input: R, output: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_with_codec(server, input, output, JsonLineCodec::new()).await
}

async fn serve_with_codec<R, W>(server: &McpServer, input: R, output: W, codec: JsonLineCodec) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = FramedRead::new(input, codec.clone());
    let mut responses = FramedWrite::new(output, codec);

    info!("MCP stdio server starting");

    while let Some(frame) = lines.next().await {
        let response = match frame {
            Ok(Frame::Line(line)) => server.handle_bytes(line.as_bytes()).await,
            Ok(Frame::TooLarge { size, max }) => {
                warn!(size, max, "dropping oversized frame");
                JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::from(McpError::Parse(format!(
                        "Frame too large: {size} bytes (max {max})"
                    ))),
                )
            }
            Err(CodecError::Io(e)) => return Err(GatewayError::Io(e)),
            Err(e) => {
                warn!(error = %e, "dropping unreadable frame");
                JsonRpcResponse::error(Value::Null, JsonRpcError::from(McpError::Parse(e.to_string())))
            }
        };

        match responses.send(&response).await {
            Ok(()) => {}
            Err(CodecError::FrameTooLarge { size, max }) => {
                warn!(size, max, "response exceeds frame limit");
                let fallback = JsonRpcResponse::error(
                    response.id.clone(),
                    JsonRpcError::from(McpError::Internal(format!(
                        "Response too large: {size} bytes (max {max})"
                    ))),
                );
                responses.send(&fallback).await.map_err(write_failed)?;
            }
            Err(e) => return Err(write_failed(e)),
        }
    }

    info!("MCP stdio server shutting down");
    Ok(())
}

fn write_failed(err: CodecError) -> GatewayError {
    GatewayError::Transport(format!("failed to write response: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::config::{SessionMode, SignozConfig};
    use crate::mcp::ToolContext;
    use crate::signoz::stub::StubApi;

    fn server() -> McpServer {
        let tools = ToolContext::new(Arc::new(StubApi::default()), &SignozConfig::default());
        McpServer::new(tools, SessionMode::Stateless)
    }

    async fn run(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        serve(&server(), input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_per_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18"}}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\r\n",
        );
        let responses = run(input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
        assert!(responses[1]["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_line_does_not_stop_loop() {
        let input = concat!(
            "this is not json\n",
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"test_connection"}}"#,
        );
        let responses = run(input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["id"], 5);
        assert!(responses[1]["result"]["content"].is_array());
    }

    async fn run_limited(input: &str, max_frame: usize) -> Vec<Value> {
        let mut output = Vec::new();
        serve_with_codec(&server(), input.as_bytes(), &mut output, JsonLineCodec::with_max_frame(max_frame))
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_oversized_line_does_not_stop_loop() {
        let input = format!(
            "{}\n{}\n",
            "x".repeat(17 * 1024 * 1024),
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#
        );
        let responses = run(&input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["error"]["message"].as_str().unwrap().contains("Frame too large"));
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["id"], 2);
        assert!(responses[1]["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn test_oversized_response_becomes_internal_error() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
        );
        let responses = run_limited(input, 512).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["error"]["code"], -32603);
        assert!(responses[0]["error"]["message"].as_str().unwrap().contains("Response too large"));
        assert_eq!(responses[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(run("").await.is_empty());
    }

    #[tokio::test]
    async fn test_notification_gets_acknowledged() {
        let responses = run(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await;
        assert_eq!(responses[0]["result"], json!({}));
    }
}
