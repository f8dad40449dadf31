//! signoz-mcp-protocol: Wire types shared by the gateway
//!
//! This crate defines the payloads exchanged with the SigNoz query API,
//! the read models for dashboards, the uniform tool outcome envelope and
//! the newline-delimited frame codec used by the stdio transport.

pub mod codec;
pub mod types;

// Re-export main types at crate root
pub use codec::{CodecError, Frame, JsonLineCodec};
pub use types::{
    AttributeKey, BuilderEntry, BuilderQuery, ClickHouseQuery, CompositeQuery, DashboardDetails, DashboardList,
    DashboardMeta, DashboardSummary, FilterItem, FilterSet, PromQuery, QueryRangeRequest,
    QueryType, ToolOutcome, ToolStatus, Widget,
};

/// MCP protocol version this server speaks
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Client versions starting with this prefix are accepted
pub const PROTOCOL_VERSION_FAMILY: &str = "2025-";

/// Check a client-declared protocol version against the accepted family
pub fn is_supported_protocol_version(version: &str) -> bool {
    version.starts_with(PROTOCOL_VERSION_FAMILY)
}
