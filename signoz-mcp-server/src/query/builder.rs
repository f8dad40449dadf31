//! Query-range payload assembly

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use signoz_mcp_protocol::{CompositeQuery, QueryRangeRequest};

use super::letters::{QueryId, QueryLetters};

/// Timestamps below this are taken to be seconds
pub const MILLIS_THRESHOLD: f64 = 1e12;

/// Page size forced onto metric sub-queries
pub const METRICS_PAGE_SIZE: u32 = 10;

/// Normalize an epoch timestamp to milliseconds
///
/// Values below 10^12 are multiplied by 1000, anything else passes
/// through truncated. Applying this twice to a small value multiplies
/// twice.
pub fn to_epoch_millis(ts: f64) -> i64 {
    if ts < MILLIS_THRESHOLD {
        (ts * 1000.0) as i64
    } else {
        ts as i64
    }
}

/// Builds the sub-queries of one panel
///
/// Step and variables are shared by every payload built here; letters
/// come from this builder's own allocator.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    step: u64,
    variables: Map<String, Value>,
    letters: QueryLetters,
}

impl PayloadBuilder {
    pub fn new(step: u64, variables: Map<String, Value>) -> Self {
        Self {
            step,
            variables,
            letters: QueryLetters::new(),
        }
    }

    /// Turn raw dashboard arguments into a named sub-query
    ///
    /// Every caller field is copied as is, nulls included. The legacy
    /// `step_interval` is dropped, `group_by` becomes `groupBy`,
    /// `stepInterval` is always the shared step and `queryName` equals
    /// `expression`. `disabled` defaults to false only when absent.
    pub fn build_sub_query(&mut self, raw: &Map<String, Value>) -> (QueryId, Map<String, Value>) {
        let id = QueryId::Allocated(self.letters.next_letter());
        let name = id.to_string();

        let mut fields = raw.clone();
        fields.remove("step_interval");
        fields.insert("stepInterval".into(), Value::from(self.step));
        if let Some(group_by) = fields.remove("group_by") {
            fields.insert("groupBy".into(), group_by);
        }
        fields.insert("queryName".into(), Value::from(name.as_str()));
        fields.insert("expression".into(), Value::from(name));
        fields.entry("disabled").or_insert(Value::Bool(false));
        if fields.get("dataSource").and_then(Value::as_str) == Some("metrics") {
            fields.insert("pageSize".into(), Value::from(METRICS_PAGE_SIZE));
        }

        (id, fields)
    }

    /// Wrap built sub-queries into a `builder` request
    pub fn build_panel_payload(
        &self,
        panel_type: &str,
        queries: BTreeMap<String, Map<String, Value>>,
        start: f64,
        end: f64,
    ) -> QueryRangeRequest {
        QueryRangeRequest {
            start: to_epoch_millis(start),
            end: to_epoch_millis(end),
            step: self.step,
            variables: self.variables.clone(),
            format_for_web: Some(false),
            composite_query: CompositeQuery::builder(panel_type, queries).with_fill_gaps(false),
        }
    }
}
