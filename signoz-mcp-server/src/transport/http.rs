//! HTTP transport
//!
//! `POST /mcp` carries JSON-RPC, `GET /health` answers a static status.
//! The JSON-RPC error code decides the HTTP status of each response.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use signoz_mcp_utils::{GatewayError, Result};

use crate::mcp::{JsonRpcResponse, McpServer};

/// Path of the JSON-RPC endpoint
pub const MCP_PATH: &str = "/mcp";

const GET_GUIDANCE: &str =
    "This endpoint expects JSON-RPC POST requests. Use POST with application/json.";

/// Serve MCP over HTTP until Ctrl-C
pub async fn run_http_server(addr: SocketAddr, server: Arc<McpServer>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Transport(format!("failed to bind {addr}: {e}")))?;

    info!(
        "MCP server listening on http://{}{} ({:?} sessions)",
        addr,
        MCP_PATH,
        server.session_mode()
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                let (stream, remote_addr) = match accept_result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("HTTP accept error: {}", e);
                        continue;
                    }
                };

                let io = TokioIo::new(stream);
                let server = Arc::clone(&server);

                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let server = Arc::clone(&server);
                        async move { handle_request(req, server).await }
                    });

                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        // Clients hanging up mid-request is routine
                        if !e.is_incomplete_message() {
                            warn!("HTTP connection error from {}: {}", remote_addr, e);
                        }
                    }
                });
            }

            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("HTTP server shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Route an HTTP request
pub async fn handle_request<B>(
    req: Request<B>,
    server: Arc<McpServer>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    match (req.method(), req.uri().path()) {
        (&Method::POST, MCP_PATH) => Ok(serve_rpc(req, server).await),
        (&Method::GET, MCP_PATH) => Ok(json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({ "message": GET_GUIDANCE }),
        )),
        (&Method::GET, "/health") => Ok(serve_health()),
        _ => Ok(not_found()),
    }
}

async fn serve_rpc<B>(req: Request<B>, server: Arc<McpServer>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!("failed to read request body: {}", e);
            Bytes::new()
        }
    };

    let response = server.handle_bytes(&body).await;
    rpc_response(&response)
}

fn rpc_response(response: &JsonRpcResponse) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(response.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match serde_json::to_value(response) {
        Ok(body) => json_response(status, &body),
        Err(e) => {
            error!("failed to serialize JSON-RPC response: {}", e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({
                    "jsonrpc": "2.0",
                    "id": Value::Null,
                    "error": {"code": -32603, "message": "Internal error"}
                }),
            )
        }
    }
}

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

/// Serve the health check endpoint
fn serve_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &json!({"status": "ok"}))
}

/// Return 404 Not Found
fn not_found() -> Response<Full<Bytes>> {
    json_response(StatusCode::NOT_FOUND, &json!({"message": "Not Found"}))
}
