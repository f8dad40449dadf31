//! Dashboard resolution
//!
//! Looks a dashboard up by title, then runs every builder-backed panel
//! through its own [`PayloadBuilder`]. Panels are resolved one after
//! another and a failing panel never aborts the rest.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use signoz_mcp_protocol::{DashboardDetails, DashboardList, ToolOutcome, ToolStatus, Widget};

use super::builder::PayloadBuilder;
use super::time::TimeRange;
use super::Resolved;
use crate::signoz::{SignozApi, SignozError};

/// Why a dashboard could not be resolved at all
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("No dashboards found")]
    NoDashboards,

    #[error("Dashboard '{0}' not found")]
    NotFound(String),

    #[error("Dashboard details not found for '{0}'")]
    DetailsNotFound(String),

    #[error("No panels found in dashboard '{0}'")]
    NoPanels(String),

    #[error(transparent)]
    Upstream(SignozError),
}

/// A resolved dashboard: one outcome per panel, keyed by panel title
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub status: ToolStatus,
    pub dashboard: String,
    pub results: BTreeMap<String, ToolOutcome>,
}

/// Decode `variables_json`; anything but a JSON object becomes `{}`
pub fn parse_variables(raw: Option<&str>) -> Resolved<Map<String, Value>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Resolved::defaulted(Map::new(), "no variables given");
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Resolved::Parsed(map),
        Ok(other) => {
            warn!(variables = raw, "variables are not a JSON object, ignoring");
            Resolved::defaulted(Map::new(), format!("expected a JSON object, got {other}"))
        }
        Err(e) => {
            warn!(variables = raw, error = %e, "could not parse variables, ignoring");
            Resolved::defaulted(Map::new(), format!("invalid variables JSON: {e}"))
        }
    }
}

/// Resolve `name` and query each of its panels over `range`
pub async fn fetch_dashboard_data(
    api: &dyn SignozApi,
    name: &str,
    range: &TimeRange,
    step: u64,
    variables: &Map<String, Value>,
) -> Result<DashboardData, DashboardError> {
    let listing = api.list_dashboards().await.map_err(|e| match e {
        SignozError::Status { .. } => DashboardError::NoDashboards,
        other => DashboardError::Upstream(other),
    })?;
    let listing: DashboardList =
        serde_json::from_value(listing).map_err(|_| DashboardError::NoDashboards)?;

    let summary = listing
        .find_by_title(name)
        .ok_or_else(|| DashboardError::NotFound(name.to_string()))?;
    debug!(dashboard = name, id = %summary.id, "matched dashboard");

    let details = api.dashboard_details(&summary.id).await.map_err(|e| match e {
        SignozError::Status { .. } => DashboardError::DetailsNotFound(name.to_string()),
        other => DashboardError::Upstream(other),
    })?;
    let details: DashboardDetails = match details {
        Value::Null => None,
        value => serde_json::from_value(value).ok(),
    }
    .ok_or_else(|| DashboardError::DetailsNotFound(name.to_string()))?;

    let widgets = details.widgets();
    if widgets.is_empty() {
        return Err(DashboardError::NoPanels(name.to_string()));
    }
    info!(dashboard = name, panels = widgets.len(), "resolving dashboard panels");

    let mut results = BTreeMap::new();
    for (index, raw) in widgets.iter().enumerate() {
        let (title, outcome) = match serde_json::from_value::<Widget>(raw.clone()) {
            Ok(widget) => {
                let title = widget.display_title();
                let outcome = resolve_panel(api, &widget, &title, range, step, variables).await;
                (title, outcome)
            }
            Err(e) => {
                warn!(panel = index, error = %e, "unreadable panel definition");
                (
                    format!("Panel_{index}"),
                    ToolOutcome::skipped(format!("Unreadable panel definition: {e}")),
                )
            }
        };
        results.insert(unique_title(&results, title), outcome);
    }

    Ok(DashboardData {
        status: ToolStatus::Success,
        dashboard: name.to_string(),
        results,
    })
}

async fn resolve_panel(
    api: &dyn SignozApi,
    widget: &Widget,
    title: &str,
    range: &TimeRange,
    step: u64,
    variables: &Map<String, Value>,
) -> ToolOutcome {
    let entries = widget.builder_query_data();
    if entries.is_empty() {
        debug!(panel = title, "panel has no builder queries");
        return ToolOutcome::skipped("No builder queries in panel");
    }

    let mut builder = PayloadBuilder::new(step, variables.clone());
    let mut queries = BTreeMap::new();
    for entry in entries {
        let Some(fields) = entry.as_object() else {
            debug!(panel = title, "skipping non-object sub-query");
            continue;
        };
        let (id, query) = builder.build_sub_query(fields);
        queries.insert(id.to_string(), query);
    }
    if queries.is_empty() {
        return ToolOutcome::skipped("No valid builder queries in panel");
    }

    let payload = builder.build_panel_payload(
        widget.panel_kind(),
        queries,
        range.start_ms() as f64,
        range.end_ms() as f64,
    );
    match api.query_range(&payload).await {
        Ok(data) => ToolOutcome::new(ToolStatus::Success).with_data(data),
        Err(e) => {
            warn!(panel = title, error = %e, "panel query failed");
            ToolOutcome::error(e.to_string())
        }
    }
}

fn unique_title(results: &BTreeMap<String, ToolOutcome>, title: String) -> String {
    if !results.contains_key(&title) {
        return title;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{title} ({n})");
        if !results.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
