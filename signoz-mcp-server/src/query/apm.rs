//! Standard APM metric queries
//!
//! Every call builds fresh templates; nothing here is shared or mutated
//! between requests.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::{json, Map, Value};
use tracing::warn;

use signoz_mcp_protocol::{
    AttributeKey, BuilderQuery, CompositeQuery, FilterItem, FilterSet, QueryRangeRequest,
};

use super::letters::{QueryId, QueryLetters};
use super::time::TimeRange;

/// Names of the latency triad; reserved whenever latency is requested
const LATENCY_SUM: &str = "C";
const LATENCY_COUNT: &str = "D";
const LATENCY_AVG: &str = "C/D";
const LATENCY_LETTERS: [char; 2] = ['C', 'D'];

/// Query window when the caller gives none; it doubles as the step
pub const DEFAULT_WINDOW: &str = "1m";

/// Metrics fetched when the caller names none
pub const DEFAULT_METRICS: [ApmMetric; 3] = [
    ApmMetric::RequestRate,
    ApmMetric::ErrorRate,
    ApmMetric::LatencyAvg,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApmMetric {
    RequestRate,
    ErrorRate,
    /// Sum, count and their ratio
    LatencyAvg,
}

impl FromStr for ApmMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "request_rate" => Ok(Self::RequestRate),
            "error_rate" => Ok(Self::ErrorRate),
            "latency_avg" | "latency" => Ok(Self::LatencyAvg),
            other => Err(format!("unknown APM metric '{other}'")),
        }
    }
}

/// Resolve metric names, dropping unknown ones and repeats
pub fn select_metrics(names: Option<&[String]>) -> Vec<ApmMetric> {
    let Some(names) = names.filter(|n| !n.is_empty()) else {
        return DEFAULT_METRICS.to_vec();
    };

    let mut selected = Vec::new();
    for name in names {
        match name.parse::<ApmMetric>() {
            Ok(metric) if !selected.contains(&metric) => selected.push(metric),
            Ok(_) => {}
            Err(e) => warn!("{e}, ignoring"),
        }
    }
    selected
}

fn template(attribute: &str, operator: &str, time_agg: &str, space_agg: &str, legend: &str) -> BuilderQuery {
    let mut extra = Map::new();
    extra.insert("functions".into(), json!([]));
    extra.insert("having".into(), json!([]));
    extra.insert("limit".into(), Value::Null);
    extra.insert("orderBy".into(), json!([]));
    extra.insert("reduceTo".into(), json!("avg"));

    BuilderQuery {
        query_name: String::new(),
        expression: String::new(),
        data_source: Some("metrics".into()),
        aggregate_operator: Some(operator.into()),
        aggregate_attribute: Some(AttributeKey::metric(attribute)),
        time_aggregation: Some(time_agg.into()),
        space_aggregation: Some(space_agg.into()),
        filters: None,
        group_by: Some(Vec::new()),
        step_interval: 0,
        disabled: false,
        legend: Some(legend.into()),
        page_size: None,
        extra,
    }
}

pub fn request_rate_template() -> BuilderQuery {
    template("signoz_latency.count", "sum_rate", "rate", "sum", "Request Rate")
}

pub fn error_rate_template() -> BuilderQuery {
    template("signoz_errors.count", "sum_rate", "rate", "sum", "Error Rate")
}

pub fn latency_sum_template() -> BuilderQuery {
    template("signoz_latency.sum", "sum", "sum", "sum", "Latency Sum")
}

pub fn latency_count_template() -> BuilderQuery {
    template("signoz_latency.count", "sum", "sum", "sum", "Latency Count")
}

pub fn latency_avg_template() -> BuilderQuery {
    template("signoz_latency.sum", "divide", "avg", "avg", "Latency Avg")
}

/// `service.name IN [service]`, plus `operation IN [...]` when given
pub fn service_filter(service: &str, operations: Option<&[String]>) -> FilterSet {
    let mut items = vec![FilterItem::is_in(
        AttributeKey::resource("service.name"),
        vec![service.to_string()],
    )];
    if let Some(ops) = operations.filter(|ops| !ops.is_empty()) {
        items.push(FilterItem::is_in(AttributeKey::tag("operation"), ops.to_vec()));
    }
    FilterSet::and(items)
}

/// Instantiate the requested metrics for one service
pub fn build_apm_queries(
    service: &str,
    metrics: &[ApmMetric],
    operations: Option<&[String]>,
    step: u64,
) -> BTreeMap<String, BuilderQuery> {
    let mut letters = if metrics.contains(&ApmMetric::LatencyAvg) {
        QueryLetters::skipping(&LATENCY_LETTERS)
    } else {
        QueryLetters::new()
    };

    let mut queries = BTreeMap::new();
    let mut insert = |id: QueryId, mut query: BuilderQuery, filtered: bool| {
        let name = id.to_string();
        query = query.named(&name);
        query.step_interval = step;
        if filtered {
            query.filters = Some(service_filter(service, operations));
        }
        queries.insert(name, query);
    };

    for metric in metrics {
        match metric {
            ApmMetric::RequestRate => {
                insert(QueryId::Allocated(letters.next_letter()), request_rate_template(), true)
            }
            ApmMetric::ErrorRate => {
                insert(QueryId::Allocated(letters.next_letter()), error_rate_template(), true)
            }
            ApmMetric::LatencyAvg => {
                insert(QueryId::Fixed(LATENCY_SUM), latency_sum_template(), true);
                insert(QueryId::Fixed(LATENCY_COUNT), latency_count_template(), true);
                insert(QueryId::Fixed(LATENCY_AVG), latency_avg_template(), false);
            }
        }
    }

    queries
}

/// The `graph` request for a set of APM queries
pub fn apm_payload(range: &TimeRange, step: u64, queries: BTreeMap<String, BuilderQuery>) -> QueryRangeRequest {
    QueryRangeRequest {
        start: range.start_ms(),
        end: range.end_ms(),
        step,
        variables: Map::new(),
        format_for_web: None,
        composite_query: CompositeQuery::builder("graph", queries),
    }
}
