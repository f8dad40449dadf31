//! MCP tool handlers
//!
//! Implements the business logic for each MCP tool. Handlers never fail:
//! upstream trouble becomes a `failed` or `error` outcome.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::{json, Map};
use tracing::{debug, warn};

use signoz_mcp_protocol::{BuilderQuery, CompositeQuery, QueryRangeRequest, ToolOutcome};

use crate::config::SignozConfig;
use crate::query::apm::{apm_payload, build_apm_queries, select_metrics, DEFAULT_WINDOW};
use crate::query::dashboard::{fetch_dashboard_data, parse_variables, DashboardError};
use crate::query::step::{parse_step, StepArg};
use crate::query::time::{
    resolve_time_range, TimeRange, DEFAULT_LOOKBACK_HOURS, SERVICES_LOOKBACK_HOURS,
};
use crate::signoz::{SignozApi, SignozError};

use super::params::{
    ApmMetricsParams, BuilderParams, ClickhouseParams, DashboardDataParams, PromqlParams,
    ServicesParams, TimeArgs, ToolParams,
};

/// Tool handler context
///
/// Cheap to clone; every call gets its own copy.
#[derive(Clone)]
pub struct ToolContext {
    api: Arc<dyn SignozApi>,
    host: Option<String>,
    ssl_verify: String,
}

fn lookback(hours: i64) -> TimeDelta {
    TimeDelta::try_hours(hours).unwrap_or(TimeDelta::zero())
}

fn window(args: TimeArgs<'_>, hours: i64, now: DateTime<Utc>) -> TimeRange {
    let resolved = resolve_time_range(args.start_time, args.end_time, args.duration, lookback(hours), now);
    if let Some(reason) = resolved.reason() {
        debug!(reason, "using default time window");
    }
    resolved.into_value()
}

fn step_secs(step: Option<&StepArg>) -> u64 {
    parse_step(step).into_value()
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `failed` when the upstream answered with an error status, `error`
/// when it could not be reached at all
fn upstream_failure(message: String, err: &SignozError) -> ToolOutcome {
    warn!(error = %err, "upstream call failed");
    if err.is_status() {
        ToolOutcome::failed(message)
    } else {
        ToolOutcome::error(message)
    }
}

impl ToolContext {
    pub fn new(api: Arc<dyn SignozApi>, config: &SignozConfig) -> Self {
        Self {
            api,
            host: config.host.clone(),
            ssl_verify: config.ssl_verify.clone(),
        }
    }

    /// Run one validated tool call
    pub async fn dispatch(&self, params: ToolParams, now: DateTime<Utc>) -> ToolOutcome {
        match params {
            ToolParams::TestConnection => self.test_connection().await,
            ToolParams::FetchDashboards => self.fetch_dashboards().await,
            ToolParams::FetchDashboardDetails(p) => self.fetch_dashboard_details(&p.dashboard_id).await,
            ToolParams::FetchDashboardData(p) => self.fetch_dashboard_data(&p, now).await,
            ToolParams::FetchApmMetrics(p) => self.fetch_apm_metrics(&p, now).await,
            ToolParams::FetchServices(p) => self.fetch_services(&p, now).await,
            ToolParams::ExecuteClickhouse(p) => self.execute_clickhouse(&p, now).await,
            ToolParams::ExecutePromql(p) => self.execute_promql(&p, now).await,
            ToolParams::ExecuteBuilder { params, queries } => {
                self.execute_builder(&params, queries, now).await
            }
        }
    }

    pub async fn test_connection(&self) -> ToolOutcome {
        match self.api.health().await {
            Ok(()) => ToolOutcome::success("Successfully connected to Signoz API")
                .with_field("host", self.host.clone())
                .with_field("ssl_verify", self.ssl_verify.clone()),
            Err(e) if e.is_status() => {
                warn!(error = %e, "health check rejected");
                ToolOutcome::failed("Failed to connect to Signoz API")
            }
            Err(e) => upstream_failure(format!("Connection test failed: {e}"), &e),
        }
    }

    pub async fn fetch_dashboards(&self) -> ToolOutcome {
        match self.api.list_dashboards().await {
            Ok(data) => ToolOutcome::success("Successfully fetched dashboards").with_data(data),
            Err(e) if e.is_status() => upstream_failure("Failed to fetch dashboards".into(), &e),
            Err(e) => upstream_failure(format!("Failed to fetch dashboards: {e}"), &e),
        }
    }

    pub async fn fetch_dashboard_details(&self, id: &str) -> ToolOutcome {
        match self.api.dashboard_details(id).await {
            Ok(data) => {
                ToolOutcome::success(format!("Successfully fetched dashboard details for ID: {id}"))
                    .with_data(data)
            }
            Err(e) if e.is_status() => {
                upstream_failure(format!("Failed to fetch dashboard details for ID: {id}"), &e)
            }
            Err(e) => upstream_failure(format!("Failed to fetch dashboard details: {e}"), &e),
        }
    }

    async fn fetch_dashboard_data(&self, params: &DashboardDataParams, now: DateTime<Utc>) -> ToolOutcome {
        let name = params.dashboard_name.as_str();
        let range = window(params.time_args(), DEFAULT_LOOKBACK_HOURS, now);
        let step = step_secs(params.step.as_ref());
        let variables = parse_variables(params.variables_json.as_deref()).into_value();

        match fetch_dashboard_data(self.api.as_ref(), name, &range, step, &variables).await {
            Ok(data) => match serde_json::to_value(&data) {
                Ok(data) => ToolOutcome::success(format!("Successfully fetched dashboard data for: {name}"))
                    .with_data(data),
                Err(e) => ToolOutcome::error(format!("Failed to fetch dashboard data: {e}")),
            },
            Err(DashboardError::Upstream(e)) => {
                upstream_failure(format!("Failed to fetch dashboard data: {e}"), &e)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(dashboard = name, %message, "dashboard not resolved");
                ToolOutcome::failed(message.clone())
                    .with_data(json!({"status": "error", "message": message}))
            }
        }
    }

    async fn fetch_apm_metrics(&self, params: &ApmMetricsParams, now: DateTime<Utc>) -> ToolOutcome {
        let service = params.service_name.as_str();
        let range = window(params.time_args(), DEFAULT_LOOKBACK_HOURS, now);
        let window_arg = params.window.as_deref().unwrap_or(DEFAULT_WINDOW);
        let step = step_secs(Some(&StepArg::from(window_arg)));

        let metrics = select_metrics(params.metrics.as_deref());
        if metrics.is_empty() {
            return ToolOutcome::failed("Failed to fetch APM metrics: no known metrics requested");
        }
        let queries = build_apm_queries(service, &metrics, params.operation_names.as_deref(), step);
        let payload = apm_payload(&range, step, queries);

        let query_params = json!({
            "service_name": service,
            "start_time": rfc3339(range.start),
            "end_time": rfc3339(range.end),
            "window": window_arg,
            "duration": params.duration,
        });

        match self.api.query_range(&payload).await {
            Ok(data) => ToolOutcome::success(format!("Fetched APM metrics for service: {service}"))
                .with_data(data)
                .with_query_params(query_params),
            Err(e) => upstream_failure(format!("Failed to fetch APM metrics: {e}"), &e)
                .with_query_params(query_params),
        }
    }

    async fn fetch_services(&self, params: &ServicesParams, now: DateTime<Utc>) -> ToolOutcome {
        let range = window(params.time_args(), SERVICES_LOOKBACK_HOURS, now);
        match self.api.list_services(range.start_ns(), range.end_ns()).await {
            Ok(data) => ToolOutcome::success("Successfully fetched services").with_data(data),
            Err(SignozError::Status { status, body }) => {
                warn!(status, "services listing rejected");
                ToolOutcome::failed(format!("Failed to fetch services: {status}")).with_field("details", body)
            }
            Err(e) => upstream_failure(format!("Failed to fetch services: {e}"), &e),
        }
    }

    async fn execute_clickhouse(&self, params: &ClickhouseParams, now: DateTime<Utc>) -> ToolOutcome {
        let range = window(params.time_args(), DEFAULT_LOOKBACK_HOURS, now);
        let panel_type = params.panel_type.as_deref().unwrap_or("table");
        let composite = CompositeQuery::clickhouse(panel_type, &params.query)
            .with_fill_gaps(params.fill_gaps.unwrap_or(false));
        let payload = request(&range, step_secs(params.step.as_ref()), Some(true), composite);

        match self.api.query_range(&payload).await {
            Ok(data) => ToolOutcome::success("Successfully executed Clickhouse query").with_data(data),
            Err(e) => upstream_failure(format!("Failed to execute Clickhouse query: {e}"), &e),
        }
    }

    async fn execute_promql(&self, params: &PromqlParams, now: DateTime<Utc>) -> ToolOutcome {
        let range = window(params.time_args(), DEFAULT_LOOKBACK_HOURS, now);
        let panel_type = params.panel_type.as_deref().unwrap_or("graph");
        let composite = CompositeQuery::promql(panel_type, &params.query);
        let payload = request(&range, step_secs(params.step.as_ref()), Some(false), composite);

        match self.api.query_range(&payload).await {
            Ok(data) => ToolOutcome::success("Successfully executed PromQL query").with_data(data),
            Err(e) => upstream_failure(format!("Failed to execute PromQL query: {e}"), &e),
        }
    }

    async fn execute_builder(
        &self,
        params: &BuilderParams,
        mut queries: BTreeMap<String, BuilderQuery>,
        now: DateTime<Utc>,
    ) -> ToolOutcome {
        let range = window(params.time_args(), DEFAULT_LOOKBACK_HOURS, now);
        let step = step_secs(params.step.as_ref());
        for query in queries.values_mut().filter(|q| q.step_interval == 0) {
            query.step_interval = step;
        }
        let panel_type = params.panel_type.as_deref().unwrap_or("table");
        let payload = request(&range, step, None, CompositeQuery::builder(panel_type, queries));

        match self.api.query_range(&payload).await {
            Ok(data) => ToolOutcome::success("Successfully executed builder query").with_data(data),
            Err(e) => upstream_failure(format!("Failed to execute builder query: {e}"), &e),
        }
    }
}

fn request(
    range: &TimeRange,
    step: u64,
    format_for_web: Option<bool>,
    composite_query: CompositeQuery,
) -> QueryRangeRequest {
    QueryRangeRequest {
        start: range.start_ms(),
        end: range.end_ms(),
        step,
        variables: Map::new(),
        format_for_web,
        composite_query,
    }
}
