use std::sync::Arc;

use serde_json::{json, Value};

use signoz_mcp_protocol::PROTOCOL_VERSION;

use super::protocol::JsonRpcError;
use super::{JsonRpcResponse, McpServer, ToolContext};
use crate::config::{SessionMode, SignozConfig};
use crate::signoz::stub::StubApi;

fn server_with(api: StubApi, mode: SessionMode) -> (McpServer, Arc<StubApi>) {
    let api = Arc::new(api);
    let config = SignozConfig {
        host: Some("http://localhost:3301".into()),
        ..SignozConfig::default()
    };
    let tools = ToolContext::new(api.clone(), &config);
    (McpServer::new(tools, mode), api)
}

fn server() -> (McpServer, Arc<StubApi>) {
    server_with(StubApi::default(), SessionMode::Stateless)
}

async fn send(server: &McpServer, envelope: Value) -> JsonRpcResponse {
    server.handle_bytes(envelope.to_string().as_bytes()).await
}

fn initialize(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {"protocolVersion": PROTOCOL_VERSION, "capabilities": {}}
    })
}

fn call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

/// The outcome JSON carried in `content[0].text`
fn outcome(response: &JsonRpcResponse) -> Value {
    let result = response.result.as_ref().expect("tool call result");
    assert_eq!(result["content"][0]["type"], "text");
    serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
}

fn error_code(response: &JsonRpcResponse) -> i32 {
    response.error.as_ref().expect("error response").code
}

#[tokio::test]
async fn test_handshake_list_and_call() {
    let (server, _) = server();

    let response = send(&server, initialize(1)).await;
    assert_eq!(response.http_status(), 200);
    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(result["capabilities"]["tools"], json!({}));
    assert_eq!(response.id, json!(1));

    let response = send(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
    let test_connection = tools.iter().find(|t| t["name"] == "test_connection").unwrap();
    assert_eq!(test_connection["inputSchema"]["required"], json!([]));

    let response = send(&server, call(3, "test_connection", json!({}))).await;
    assert_eq!(response.http_status(), 200);
    let outcome = outcome(&response);
    assert_eq!(outcome["status"], "success");
    assert_eq!(outcome["host"], "http://localhost:3301");
}

#[tokio::test]
async fn test_apm_metrics_echoed_payload() {
    let (server, api) = server();

    let response = send(
        &server,
        call(7, "fetch_apm_metrics", json!({"service_name": "checkout", "duration": "2h"})),
    )
    .await;
    let outcome = outcome(&response);
    assert_eq!(outcome["status"], "success");

    let echoed = &outcome["data"];
    let names: Vec<&str> = echoed["compositeQuery"]["builderQueries"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(names, ["A", "B", "C", "C/D", "D"]);
    assert_eq!(echoed["step"], 60);
    assert_eq!(echoed["end"].as_i64().unwrap() - echoed["start"].as_i64().unwrap(), 7_200_000);
    assert_eq!(api.recorded().len(), 1);
}

#[tokio::test]
async fn test_unknown_tool_is_404() {
    let (server, _) = server();
    let response = send(&server, call(1, "fetch_everything", json!({}))).await;

    assert_eq!(error_code(&response), JsonRpcError::METHOD_NOT_FOUND);
    assert_eq!(response.http_status(), 404);
    assert_eq!(response.error.unwrap().message, "Tool not found: fetch_everything");
}

#[tokio::test]
async fn test_call_without_name_is_400() {
    let (server, _) = server();
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"arguments": {}}}),
    )
    .await;

    assert_eq!(error_code(&response), JsonRpcError::INVALID_PARAMS);
    assert_eq!(response.http_status(), 400);
    assert_eq!(
        response.error.unwrap().message,
        "Invalid params: 'name' is required for tool execution"
    );
}

#[tokio::test]
async fn test_bad_arguments_are_400() {
    let (server, api) = server();
    let response = send(&server, call(1, "fetch_apm_metrics", json!({"service": "checkout"}))).await;

    assert_eq!(error_code(&response), JsonRpcError::INVALID_PARAMS);
    assert!(api.recorded().is_empty());
}

#[tokio::test]
async fn test_unknown_method_is_404() {
    let (server, _) = server();
    let response = send(&server, json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"})).await;

    assert_eq!(response.http_status(), 404);
    assert_eq!(response.error.unwrap().message, "Method not found: resources/list");
}

#[tokio::test]
async fn test_notification_acknowledged() {
    let (server, _) = server_with(StubApi::default(), SessionMode::Stateful);
    let response = send(&server, json!({"jsonrpc": "2.0", "method": "notifications/initialized"})).await;

    assert_eq!(response.http_status(), 200);
    assert_eq!(response.result, Some(json!({})));
    assert!(response.id.is_null());
    assert!(!server.is_initialized());
}

#[tokio::test]
async fn test_protocol_version_family() {
    let (server, _) = server();

    let mut envelope = initialize(1);
    envelope["params"]["protocolVersion"] = json!("2025-03-26");
    assert!(send(&server, envelope).await.error.is_none());

    let mut envelope = initialize(2);
    envelope["params"]["protocolVersion"] = json!("2024-11-05");
    let response = send(&server, envelope).await;
    assert_eq!(error_code(&response), JsonRpcError::INVALID_PARAMS);
    assert_eq!(response.http_status(), 400);
    assert!(response.error.unwrap().message.contains("2024-11-05"));

    let mut envelope = initialize(3);
    envelope["params"] = json!({});
    assert!(send(&server, envelope).await.error.is_some());
}

#[tokio::test]
async fn test_stateful_requires_initialize() {
    let (server, _) = server_with(StubApi::default(), SessionMode::Stateful);

    let response = send(&server, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;
    assert_eq!(error_code(&response), JsonRpcError::NOT_INITIALIZED);
    assert_eq!(response.http_status(), 500);

    let mut rejected = initialize(2);
    rejected["params"]["protocolVersion"] = json!("2024-11-05");
    send(&server, rejected).await;
    assert!(!server.is_initialized());

    send(&server, initialize(3)).await;
    assert!(server.is_initialized());
    let response = send(&server, json!({"jsonrpc": "2.0", "id": 4, "method": "tools/list"})).await;
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_stateless_serves_without_initialize() {
    let (server, _) = server();
    let response = send(&server, call(1, "fetch_services", json!({}))).await;
    assert_eq!(outcome(&response)["status"], "success");
    assert!(!server.is_initialized());
}

#[tokio::test]
async fn test_malformed_envelopes() {
    let (server, _) = server();

    let response = server.handle_bytes(b"{not json").await;
    assert_eq!(error_code(&response), JsonRpcError::PARSE_ERROR);
    assert_eq!(response.http_status(), 400);
    assert!(response.id.is_null());

    let response = server.handle_bytes(b"").await;
    assert_eq!(error_code(&response), JsonRpcError::PARSE_ERROR);

    let response = send(&server, json!([1, 2, 3])).await;
    assert_eq!(error_code(&response), JsonRpcError::INVALID_REQUEST);

    let response = send(&server, json!({"jsonrpc": "2.0", "id": 9})).await;
    assert_eq!(error_code(&response), JsonRpcError::INVALID_REQUEST);
    assert_eq!(response.id, json!(9));

    let response = send(&server, json!({"jsonrpc": "1.0", "id": 10, "method": "tools/list"})).await;
    assert_eq!(error_code(&response), JsonRpcError::INVALID_REQUEST);
}

#[tokio::test]
async fn test_business_failure_is_http_200() {
    let (server, api) = server_with(
        StubApi::default().with_dashboard("1", "Overview", json!([])),
        SessionMode::Stateless,
    );
    let response = send(&server, call(1, "fetch_dashboard_data", json!({"dashboard_name": "Missing"}))).await;

    assert_eq!(response.http_status(), 200);
    let outcome = outcome(&response);
    assert_eq!(outcome["status"], "failed");
    assert!(outcome["message"].as_str().unwrap().contains("not found"));
    assert!(api.recorded().is_empty());
}

#[tokio::test]
async fn test_outcome_text_is_pretty_json() {
    let (server, _) = server();
    let response = send(&server, call(1, "test_connection", json!({}))).await;
    let text = response.result.unwrap()["content"][0]["text"].as_str().unwrap().to_string();
    assert!(text.contains("\n  \"status\": \"success\""));
}
