//! Upstream client errors

use std::time::Duration;

/// Failure talking to the SigNoz API
#[derive(Debug, thiserror::Error)]
pub enum SignozError {
    #[error("SigNoz host is not configured")]
    MissingHost,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Request to {endpoint} timed out after {}s", .after.as_secs())]
    Timeout { endpoint: String, after: Duration },

    #[error("SigNoz returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl SignozError {
    /// The upstream answered, just not with success
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}
