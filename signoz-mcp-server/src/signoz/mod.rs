//! SigNoz REST API access
//!
//! Handlers only see the [`SignozApi`] trait, so tests can swap the
//! network client for an in-process stub.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod stub;

pub use client::SignozClient;
pub use error::SignozError;

use async_trait::async_trait;
use serde_json::Value;
use signoz_mcp_protocol::QueryRangeRequest;

pub type SignozResult<T> = std::result::Result<T, SignozError>;

/// The slice of the SigNoz API the gateway uses
#[async_trait]
pub trait SignozApi: Send + Sync {
    /// `GET /api/v1/health`; Ok only on HTTP 200
    async fn health(&self) -> SignozResult<()>;

    /// `GET /api/v1/dashboards`, raw body
    async fn list_dashboards(&self) -> SignozResult<Value>;

    /// `GET /api/v1/dashboards/{id}`, with a top-level `data` unwrapped
    async fn dashboard_details(&self, id: &str) -> SignozResult<Value>;

    /// `POST /api/v4/query_range`
    async fn query_range(&self, request: &QueryRangeRequest) -> SignozResult<Value>;

    /// `POST /api/v1/services` over a nanosecond window
    async fn list_services(&self, start_ns: i64, end_ns: i64) -> SignozResult<Value>;
}
