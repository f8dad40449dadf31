//! In-process SigNoz stand-in for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use signoz_mcp_protocol::QueryRangeRequest;

use super::{SignozApi, SignozError, SignozResult};

/// Echoes every query-range payload back and records it
#[derive(Default)]
pub struct StubApi {
    pub unhealthy: bool,
    /// `None` answers the listing with HTTP 500
    pub dashboards: Option<Value>,
    pub details: HashMap<String, Value>,
    /// Query-range payloads whose JSON contains this fail with HTTP 500
    pub fail_when: Option<String>,
    /// Every call fails with this error before touching any state
    pub fail_with: Option<fn() -> SignozError>,
    pub queries: Mutex<Vec<QueryRangeRequest>>,
    pub service_windows: Mutex<Vec<(i64, i64)>>,
}

impl StubApi {
    pub fn with_dashboard(mut self, id: &str, title: &str, widgets: Value) -> Self {
        let mut listing = self.dashboards.take().unwrap_or_else(|| json!({"data": []}));
        listing["data"]
            .as_array_mut()
            .unwrap()
            .push(json!({"id": id, "data": {"title": title}}));
        self.dashboards = Some(listing);
        self.details.insert(
            id.to_string(),
            json!({"id": id, "data": {"title": title, "widgets": widgets}}),
        );
        self
    }

    /// A stub whose every call fails with `error`
    pub fn failing(error: fn() -> SignozError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    fn check(&self) -> SignozResult<()> {
        match self.fail_with {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    pub fn recorded(&self) -> Vec<QueryRangeRequest> {
        self.queries.lock().unwrap().clone()
    }
}

fn server_error() -> SignozError {
    SignozError::Status {
        status: 500,
        body: "stub failure".into(),
    }
}

#[async_trait]
impl SignozApi for StubApi {
    async fn health(&self) -> SignozResult<()> {
        self.check()?;
        if self.unhealthy {
            return Err(SignozError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }

    async fn list_dashboards(&self) -> SignozResult<Value> {
        self.check()?;
        self.dashboards.clone().ok_or_else(server_error)
    }

    async fn dashboard_details(&self, id: &str) -> SignozResult<Value> {
        self.check()?;
        self.details.get(id).cloned().ok_or(SignozError::Status {
            status: 404,
            body: format!("dashboard {id} not found"),
        })
    }

    async fn query_range(&self, request: &QueryRangeRequest) -> SignozResult<Value> {
        self.check()?;
        self.queries.lock().unwrap().push(request.clone());
        let echo = serde_json::to_value(request).unwrap();
        if let Some(marker) = &self.fail_when {
            if echo.to_string().contains(marker.as_str()) {
                return Err(server_error());
            }
        }
        Ok(echo)
    }

    async fn list_services(&self, start_ns: i64, end_ns: i64) -> SignozResult<Value> {
        self.check()?;
        self.service_windows.lock().unwrap().push((start_ns, end_ns));
        Ok(json!([{"serviceName": "checkout", "p99": 1.5}]))
    }
}
