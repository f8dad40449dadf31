//! Per-tool argument structs
//!
//! `tools/call` arguments are decoded into one of these before any
//! handler runs. Unknown fields, missing required fields and wrongly
//! typed fields are all INVALID_PARAMS.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use signoz_mcp_protocol::BuilderQuery;

use super::error::McpError;
use crate::query::step::StepArg;

/// Raw time window arguments shared by the query tools
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeArgs<'a> {
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub duration: Option<&'a str>,
}

macro_rules! time_args {
    ($($params:ty),+ $(,)?) => {
        $(impl $params {
            pub fn time_args(&self) -> TimeArgs<'_> {
                TimeArgs {
                    start_time: self.start_time.as_deref(),
                    end_time: self.end_time.as_deref(),
                    duration: self.duration.as_deref(),
                }
            }
        })+
    };
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardDetailsParams {
    pub dashboard_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardDataParams {
    pub dashboard_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub step: Option<StepArg>,
    pub variables_json: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApmMetricsParams {
    pub service_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub window: Option<String>,
    pub operation_names: Option<Vec<String>>,
    pub metrics: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesParams {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClickhouseParams {
    pub query: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub panel_type: Option<String>,
    pub fill_gaps: Option<bool>,
    pub step: Option<StepArg>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromqlParams {
    pub query: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub panel_type: Option<String>,
    pub step: Option<StepArg>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderParams {
    pub builder_queries: BTreeMap<String, Map<String, Value>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub panel_type: Option<String>,
    pub step: Option<StepArg>,
}

time_args!(
    DashboardDataParams,
    ApmMetricsParams,
    ServicesParams,
    ClickhouseParams,
    PromqlParams,
    BuilderParams,
);

impl BuilderParams {
    /// Read every entry as a builder query named after its key unless it
    /// names itself
    pub fn queries(&self) -> Result<BTreeMap<String, BuilderQuery>, McpError> {
        if self.builder_queries.is_empty() {
            return Err(McpError::InvalidParams("builder_queries must not be empty".into()));
        }

        let mut queries = BTreeMap::new();
        for (key, raw) in &self.builder_queries {
            let mut fields = raw.clone();
            for name in ["queryName", "expression"] {
                if !fields.get(name).is_some_and(Value::is_string) {
                    fields.insert(name.into(), Value::String(key.clone()));
                }
            }
            let query: BuilderQuery = serde_json::from_value(Value::Object(fields))
                .map_err(|e| McpError::InvalidParams(format!("builder query '{key}': {e}")))?;
            queries.insert(key.clone(), query);
        }
        Ok(queries)
    }
}

/// Validated arguments of one tool call
#[derive(Debug)]
pub enum ToolParams {
    TestConnection,
    FetchDashboards,
    FetchDashboardDetails(DashboardDetailsParams),
    FetchDashboardData(DashboardDataParams),
    FetchApmMetrics(ApmMetricsParams),
    FetchServices(ServicesParams),
    ExecuteClickhouse(ClickhouseParams),
    ExecutePromql(PromqlParams),
    ExecuteBuilder {
        params: BuilderParams,
        queries: BTreeMap<String, BuilderQuery>,
    },
}

fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, McpError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))
}

impl ToolParams {
    /// Decode `arguments` for tool `name`
    pub fn parse(name: &str, arguments: Value) -> Result<Self, McpError> {
        Ok(match name {
            "test_connection" => decode::<NoParams>(arguments).map(|_| Self::TestConnection)?,
            "fetch_dashboards" => decode::<NoParams>(arguments).map(|_| Self::FetchDashboards)?,
            "fetch_dashboard_details" => Self::FetchDashboardDetails(decode(arguments)?),
            "fetch_dashboard_data" => Self::FetchDashboardData(decode(arguments)?),
            "fetch_apm_metrics" => Self::FetchApmMetrics(decode(arguments)?),
            "fetch_services" => Self::FetchServices(decode(arguments)?),
            "execute_clickhouse_query" => Self::ExecuteClickhouse(decode(arguments)?),
            "execute_promql_query" => Self::ExecutePromql(decode(arguments)?),
            "execute_builder_query" => {
                let params: BuilderParams = decode(arguments)?;
                let queries = params.queries()?;
                Self::ExecuteBuilder { params, queries }
            }
            other => return Err(McpError::UnknownTool(other.into())),
        })
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::TestConnection => "test_connection",
            Self::FetchDashboards => "fetch_dashboards",
            Self::FetchDashboardDetails(_) => "fetch_dashboard_details",
            Self::FetchDashboardData(_) => "fetch_dashboard_data",
            Self::FetchApmMetrics(_) => "fetch_apm_metrics",
            Self::FetchServices(_) => "fetch_services",
            Self::ExecuteClickhouse(_) => "execute_clickhouse_query",
            Self::ExecutePromql(_) => "execute_promql_query",
            Self::ExecuteBuilder { .. } => "execute_builder_query",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::tools::TOOL_NAMES;
    use serde_json::json;

    fn invalid(result: Result<ToolParams, McpError>) -> String {
        match result {
            Err(McpError::InvalidParams(message)) => message,
            other => panic!("expected invalid params, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments_accepted_as_null_or_empty() {
        assert!(matches!(
            ToolParams::parse("test_connection", Value::Null),
            Ok(ToolParams::TestConnection)
        ));
        assert!(matches!(
            ToolParams::parse("fetch_services", json!({})),
            Ok(ToolParams::FetchServices(_))
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let message = invalid(ToolParams::parse("test_connection", json!({"verbose": true})));
        assert!(message.contains("verbose"));
    }

    #[test]
    fn test_missing_required_field() {
        let message = invalid(ToolParams::parse("fetch_apm_metrics", json!({})));
        assert!(message.contains("service_name"));
    }

    #[test]
    fn test_wrong_type() {
        invalid(ToolParams::parse("fetch_dashboard_details", json!({"dashboard_id": ["x"]})));
        invalid(ToolParams::parse("execute_clickhouse_query", json!({"query": "SELECT 1", "fill_gaps": "yes"})));
    }

    #[test]
    fn test_step_accepts_number_or_string() {
        let Ok(ToolParams::FetchDashboardData(params)) = ToolParams::parse(
            "fetch_dashboard_data",
            json!({"dashboard_name": "Overview", "step": "5m"}),
        ) else {
            panic!("expected dashboard params");
        };
        assert_eq!(params.step, Some(StepArg::Text("5m".into())));

        let Ok(ToolParams::ExecutePromql(params)) =
            ToolParams::parse("execute_promql_query", json!({"query": "up", "step": 30}))
        else {
            panic!("expected promql params");
        };
        assert_eq!(params.step, Some(StepArg::Int(30)));
    }

    #[test]
    fn test_time_args() {
        let Ok(ToolParams::FetchServices(params)) =
            ToolParams::parse("fetch_services", json!({"duration": "2h"}))
        else {
            panic!("expected services params");
        };
        let args = params.time_args();
        assert_eq!(args.duration, Some("2h"));
        assert!(args.start_time.is_none());
    }

    #[test]
    fn test_builder_queries_default_names_to_key() {
        let Ok(ToolParams::ExecuteBuilder { queries, .. }) = ToolParams::parse(
            "execute_builder_query",
            json!({"builder_queries": {
                "A": {"dataSource": "metrics"},
                "F1": {"queryName": "F1", "expression": "A*2"}
            }}),
        ) else {
            panic!("expected builder params");
        };
        assert_eq!(queries["A"].query_name, "A");
        assert_eq!(queries["A"].expression, "A");
        assert_eq!(queries["F1"].expression, "A*2");
    }

    #[test]
    fn test_builder_queries_validated() {
        let message = invalid(ToolParams::parse(
            "execute_builder_query",
            json!({"builder_queries": {"A": {"groupBy": ["service.name"]}}}),
        ));
        assert!(message.starts_with("builder query 'A'"));

        invalid(ToolParams::parse("execute_builder_query", json!({"builder_queries": {}})));
    }

    #[test]
    fn test_every_catalog_tool_parses() {
        for name in TOOL_NAMES {
            let result = ToolParams::parse(name, json!({}));
            if let Ok(params) = result {
                assert_eq!(params.tool_name(), name);
            }
        }
        assert!(matches!(
            ToolParams::parse("nope", json!({})),
            Err(McpError::UnknownTool(_))
        ));
    }
}
