//! reqwest-backed SigNoz client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use signoz_mcp_protocol::QueryRangeRequest;

use super::{SignozApi, SignozError, SignozResult};
use crate::config::SignozConfig;

pub const API_KEY_HEADER: &str = "SIGNOZ-API-KEY";

const HEALTH_TIMEOUT: Duration = Duration::from_secs(20);
const LIST_TIMEOUT: Duration = Duration::from_secs(60);
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one SigNoz instance
///
/// A client without a host is valid; every call then fails with
/// [`SignozError::MissingHost`].
pub struct SignozClient {
    base_url: Option<String>,
    http: reqwest::Client,
}

impl SignozClient {
    pub fn new(config: &SignozConfig) -> SignozResult<Self> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers(config.api_key.as_deref())?)
            .danger_accept_invalid_certs(!config.verify_tls())
            .build()
            .map_err(|e| SignozError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url().map(str::to_string),
            http,
        })
    }

    fn url(&self, path: &str) -> SignozResult<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{base}{path}"))
            .ok_or(SignozError::MissingHost)
    }

    async fn send(&self, path: &str, request: RequestBuilder, timeout: Duration) -> SignozResult<String> {
        let started = std::time::Instant::now();
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(path, timeout, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify(path, timeout, e))?;
        debug!(
            endpoint = path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "signoz response"
        );

        if status.is_success() {
            Ok(body)
        } else {
            warn!(endpoint = path, status = status.as_u16(), "signoz request failed");
            Err(SignozError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn get_json(&self, path: &str, timeout: Duration) -> SignozResult<Value> {
        let body = self.send(path, self.http.get(self.url(path)?), timeout).await?;
        decode(path, &body)
    }

    async fn post_json(&self, path: &str, payload: &impl serde::Serialize, timeout: Duration) -> SignozResult<Value> {
        let request = self.http.post(self.url(path)?).json(payload);
        let body = self.send(path, request, timeout).await?;
        decode(path, &body)
    }
}

#[async_trait]
impl SignozApi for SignozClient {
    async fn health(&self) -> SignozResult<()> {
        let path = "/api/v1/health";
        let response = self
            .http
            .get(self.url(path)?)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(path, HEALTH_TIMEOUT, e))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SignozError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn list_dashboards(&self) -> SignozResult<Value> {
        self.get_json("/api/v1/dashboards", LIST_TIMEOUT).await
    }

    async fn dashboard_details(&self, id: &str) -> SignozResult<Value> {
        let value = self
            .get_json(&format!("/api/v1/dashboards/{id}"), CALL_TIMEOUT)
            .await?;
        Ok(unwrap_data(value))
    }

    async fn query_range(&self, request: &QueryRangeRequest) -> SignozResult<Value> {
        self.post_json("/api/v4/query_range", request, CALL_TIMEOUT).await
    }

    async fn list_services(&self, start_ns: i64, end_ns: i64) -> SignozResult<Value> {
        self.post_json("/api/v1/services", &services_body(start_ns, end_ns), CALL_TIMEOUT)
            .await
    }
}

fn default_headers(api_key: Option<&str>) -> SignozResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        let mut value = HeaderValue::from_str(key)
            .map_err(|_| SignozError::Client("API key is not a valid header value".into()))?;
        value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, value);
    }

    Ok(headers)
}

fn classify(endpoint: &str, timeout: Duration, err: reqwest::Error) -> SignozError {
    if err.is_timeout() {
        SignozError::Timeout {
            endpoint: endpoint.into(),
            after: timeout,
        }
    } else if err.is_decode() {
        SignozError::Decode {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    } else {
        SignozError::Transport {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }
}

fn decode(endpoint: &str, body: &str) -> SignozResult<Value> {
    serde_json::from_str(body).map_err(|e| SignozError::Decode {
        endpoint: endpoint.into(),
        message: e.to_string(),
    })
}

/// Detail responses wrap the dashboard in `data`
fn unwrap_data(mut value: Value) -> Value {
    match value.get_mut("data").map(Value::take) {
        Some(inner) => inner,
        None => value,
    }
}

fn services_body(start_ns: i64, end_ns: i64) -> Value {
    json!({
        "start": start_ns.to_string(),
        "end": end_ns.to_string(),
        "tags": [],
    })
}
