//! MCP (Model Context Protocol) server implementation
//!
//! Exposes SigNoz dashboards, APM metrics, services and raw queries as
//! MCP tools. Every tool call is translated into one or more requests
//! against the SigNoz HTTP API.
//!
//! MCP Protocol: <https://modelcontextprotocol.io/>
//!
//! ## Session modes
//!
//! - **stateless** (default): every method works without `initialize`
//! - **stateful**: methods other than `initialize` fail until one succeeds

mod error;
mod handlers;
mod params;
mod protocol;
mod server;
mod tools;

#[cfg(test)]
mod tests;

pub use error::McpError;
pub use handlers::ToolContext;
pub use protocol::{JsonRpcError, JsonRpcResponse};
pub use server::McpServer;
