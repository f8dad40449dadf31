//! Transports carrying JSON-RPC to the [`McpServer`](crate::mcp::McpServer)

mod http;
mod stdio;

pub use http::run_http_server;
pub use stdio::run_stdio_server;
