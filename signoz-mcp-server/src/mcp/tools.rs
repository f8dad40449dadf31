//! MCP tool definitions for the SigNoz gateway
//!
//! Defines the tools exposed to MCP clients. Descriptions of time-aware
//! tools embed the instant the catalog was built so a client can reason
//! about relative windows.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::protocol::Tool;

/// Every tool name, in catalog order
pub const TOOL_NAMES: [&str; 9] = [
    "test_connection",
    "fetch_dashboards",
    "fetch_dashboard_details",
    "fetch_dashboard_data",
    "fetch_apm_metrics",
    "fetch_services",
    "execute_clickhouse_query",
    "execute_promql_query",
    "execute_builder_query",
];

const TIME_HINT: &str =
    "in RFC3339 or relative string (e.g., 'now-2h', '2023-01-01T00:00:00Z') or duration string (e.g., '2h', '90m')";

const BUILDER_EXAMPLE: &str = r#"{"A": {"queryName": "A", "expression": "A", "dataSource": "metrics", "aggregateOperator": "rate", "aggregateAttribute": {"key": "signoz_calls_total", "dataType": "float64", "isColumn": true, "type": ""}, "timeAggregation": "rate", "spaceAggregation": "sum", "functions": [], "filters": {"items": [], "op": "AND"}, "disabled": false, "stepInterval": 60, "legend": "Calls Rate", "groupBy": [{"key": "service.name", "dataType": "string", "isColumn": false, "type": "resource"}] }}"#;

pub fn is_known_tool(name: &str) -> bool {
    TOOL_NAMES.contains(&name)
}

/// `start_time`, `end_time` and `duration` schema properties
fn time_properties(duration_note: &str) -> Value {
    json!({
        "start_time": {
            "type": "string",
            "description": format!("Start time {TIME_HINT}")
        },
        "end_time": {
            "type": "string",
            "description": format!("End time {TIME_HINT}")
        },
        "duration": {
            "type": "string",
            "description": format!("Duration string for the time window (e.g., '2h', '90m').{duration_note}")
        }
    })
}

fn object_schema(mut properties: Value, extra: Value, required: &[&str]) -> Value {
    if let (Some(props), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        props.extend(extra);
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Get all tool definitions, stamped with `now`
pub fn get_tool_definitions(now: DateTime<Utc>) -> Vec<Tool> {
    let now = now.to_rfc3339_opts(SecondsFormat::Secs, true);

    vec![
        Tool {
            name: "test_connection".into(),
            description: "Test connection to Signoz API to verify configuration and connectivity.".into(),
            input_schema: object_schema(json!({}), json!({}), &[]),
        },
        Tool {
            name: "fetch_dashboards".into(),
            description: "Fetch all available dashboards from Signoz.".into(),
            input_schema: object_schema(json!({}), json!({}), &[]),
        },
        Tool {
            name: "fetch_dashboard_details".into(),
            description: "Fetch detailed information about a specific dashboard by ID.".into(),
            input_schema: object_schema(
                json!({
                    "dashboard_id": {
                        "type": "string",
                        "description": "The ID of the dashboard to fetch details for"
                    }
                }),
                json!({}),
                &["dashboard_id"],
            ),
        },
        Tool {
            name: "fetch_dashboard_data".into(),
            description: format!(
                "Fetch all panel data for a given Signoz dashboard by name and time range. Current datetime is {now}"
            ),
            input_schema: object_schema(
                time_properties(""),
                json!({
                    "dashboard_name": {
                        "type": "string",
                        "description": "The name of the dashboard to fetch data for"
                    },
                    "step": {
                        "type": ["number", "string"],
                        "description": "Step interval for the query in seconds, or a string such as '5m' (default: 60)"
                    },
                    "variables_json": {
                        "type": "string",
                        "description": "Optional variable overrides as a JSON object"
                    }
                }),
                &["dashboard_name"],
            ),
        },
        Tool {
            name: "fetch_apm_metrics".into(),
            description: format!(
                "Fetch standard APM metrics (request rate, error rate, latency) for a given service and time range. Current datetime is {now}"
            ),
            input_schema: object_schema(
                time_properties(""),
                json!({
                    "service_name": {
                        "type": "string",
                        "description": "The name of the service to fetch APM metrics for"
                    },
                    "window": {
                        "type": "string",
                        "description": "Query window (e.g., '1m', '5m'). Default: '1m'",
                        "default": "1m"
                    },
                    "operation_names": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Restrict the metrics to these operations"
                    },
                    "metrics": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": ["request_rate", "error_rate", "latency_avg", "latency"]
                        },
                        "description": "Metrics to fetch (default: request_rate, error_rate, latency_avg)"
                    }
                }),
                &["service_name"],
            ),
        },
        Tool {
            name: "fetch_services".into(),
            description: "Fetch all instrumented services from SigNoz.".into(),
            input_schema: object_schema(
                time_properties(" Defaults to last 24 hours if not provided."),
                json!({}),
                &[],
            ),
        },
        Tool {
            name: "execute_clickhouse_query".into(),
            description: "Execute a Clickhouse SQL query via the Signoz API.".into(),
            input_schema: object_schema(
                time_properties(""),
                json!({
                    "query": {
                        "type": "string",
                        "description": "The Clickhouse SQL query to execute."
                    },
                    "panel_type": {
                        "type": "string",
                        "description": "Panel type (e.g., 'table', 'graph').",
                        "default": "table"
                    },
                    "fill_gaps": {
                        "type": "boolean",
                        "description": "Whether to fill gaps in the data.",
                        "default": false
                    },
                    "step": {
                        "type": ["number", "string"],
                        "description": "Step interval in seconds.",
                        "default": 60
                    }
                }),
                &["query"],
            ),
        },
        Tool {
            name: "execute_promql_query".into(),
            description: "Execute a PromQL query via the Signoz API.".into(),
            input_schema: object_schema(
                time_properties(""),
                json!({
                    "query": {
                        "type": "string",
                        "description": "The PromQL expression to evaluate."
                    },
                    "panel_type": {
                        "type": "string",
                        "description": "Panel type (e.g., 'table', 'graph').",
                        "default": "graph"
                    },
                    "step": {
                        "type": ["number", "string"],
                        "description": "Step interval in seconds.",
                        "default": 60
                    }
                }),
                &["query"],
            ),
        },
        Tool {
            name: "execute_builder_query".into(),
            description: format!(
                "Execute a Signoz builder query via the Signoz API. The 'builder_queries' parameter must be a \
                 dictionary with keys like 'A', 'B', etc., each mapping to a full builder query object as expected \
                 by the SigNoz API. Example: {BUILDER_EXAMPLE}. Each builder query object should include all \
                 required fields for a SigNoz builder query."
            ),
            input_schema: object_schema(
                time_properties(""),
                json!({
                    "builder_queries": {
                        "type": "object",
                        "description": "Dictionary of builder queries. Each key (e.g., 'A', 'B') must map to a full \
                            builder query object. IMPORTANT: groupBy must be an array of AttributeKey objects, not \
                            strings, e.g. [{\"key\": \"service.name\", \"dataType\": \"string\", \"isColumn\": false, \
                            \"type\": \"resource\"}]. A missing queryName or expression defaults to the key."
                    },
                    "panel_type": {
                        "type": "string",
                        "description": "Panel type (e.g., 'table', 'graph').",
                        "default": "table"
                    },
                    "step": {
                        "type": ["number", "string"],
                        "description": "Step interval in seconds.",
                        "default": 60
                    }
                }),
                &["builder_queries"],
            ),
        },
    ]
}
