//! Uniform tool outcome envelope
//!
//! Every tool returns one of these, serialized as the JSON text inside
//! the MCP content array. Business failures live here, not in JSON-RPC
//! errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    /// Upstream answered, but not with what was asked for
    Failed,
    /// Upstream unreachable or the call could not be made
    Error,
    /// Nothing to do (e.g. a non-builder dashboard panel)
    Skipped,
}

/// Tool result envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Value>,
    /// Tool-specific top-level fields (e.g. `host`, `details`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolOutcome {
    pub fn new(status: ToolStatus) -> Self {
        Self {
            status,
            message: None,
            data: None,
            query_params: None,
            extra: Map::new(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToolStatus::Success).with_message(message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ToolStatus::Failed).with_message(message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToolStatus::Error).with_message(message)
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(ToolStatus::Skipped).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_query_params(mut self, params: Value) -> Self {
        self.query_params = Some(params);
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        let value = serde_json::to_value(ToolOutcome::skipped("x")).unwrap();
        assert_eq!(value["status"], "skipped");
        let value = serde_json::to_value(ToolOutcome::failed("x")).unwrap();
        assert_eq!(value["status"], "failed");
    }

    #[test]
    fn test_optional_fields_omitted() {
        let value = serde_json::to_value(ToolOutcome::success("ok")).unwrap();
        assert_eq!(value, json!({"status": "success", "message": "ok"}));
    }

    #[test]
    fn test_extra_fields_are_top_level() {
        let outcome = ToolOutcome::success("connected")
            .with_field("host", "http://signoz:8080")
            .with_field("ssl_verify", "true");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["host"], "http://signoz:8080");
        assert_eq!(value["ssl_verify"], "true");
    }

    #[test]
    fn test_data_and_query_params() {
        let outcome = ToolOutcome::success("ok")
            .with_data(json!({"result": []}))
            .with_query_params(json!({"service_name": "checkout"}));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["data"]["result"], json!([]));
        assert_eq!(value["query_params"]["service_name"], "checkout");
    }
}
