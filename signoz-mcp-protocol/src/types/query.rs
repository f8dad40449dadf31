//! Query-range payload types
//!
//! These mirror the body accepted by `POST /api/v4/query_range`. Fields
//! the gateway never inspects are carried in `extra` so a payload built
//! from dashboard data goes upstream unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Composite query flavour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Builder,
    Promql,
    ClickhouseSql,
}

/// Reference to a metric, resource attribute or tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeKey {
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_column: Option<bool>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttributeKey {
    fn with(key: &str, data_type: &str, is_column: bool, kind: &str) -> Self {
        Self {
            key: key.into(),
            data_type: Some(data_type.into()),
            is_column: Some(is_column),
            kind: Some(kind.into()),
            extra: Map::new(),
        }
    }

    /// A float64 metric column such as `signoz_latency.count`
    pub fn metric(key: &str) -> Self {
        Self::with(key, "float64", true, "")
    }

    /// A string resource attribute such as `service.name`
    pub fn resource(key: &str) -> Self {
        Self::with(key, "string", false, "resource")
    }

    /// A string span/metric tag such as `operation`
    pub fn tag(key: &str) -> Self {
        Self::with(key, "string", false, "tag")
    }
}

/// A single predicate in a filter group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterItem {
    #[serde(default)]
    pub key: AttributeKey,
    pub op: String,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FilterItem {
    /// `key IN [values...]`
    pub fn is_in(key: AttributeKey, values: Vec<String>) -> Self {
        Self {
            key,
            op: "IN".into(),
            value: Value::from(values),
            extra: Map::new(),
        }
    }
}

/// A group of predicates joined by `op` (AND / OR)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub items: Vec<FilterItem>,
    #[serde(default = "default_filter_op")]
    pub op: String,
}

fn default_filter_op() -> String {
    "AND".into()
}

impl FilterSet {
    pub fn and(items: Vec<FilterItem>) -> Self {
        Self {
            items,
            op: "AND".into(),
        }
    }
}

/// A named builder sub-query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderQuery {
    #[serde(default)]
    pub query_name: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_attribute: Option<AttributeKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<AttributeKey>>,
    #[serde(default)]
    pub step_interval: u64,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Everything else (functions, having, limit, orderBy, reduceTo, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuilderQuery {
    /// Set `queryName` and `expression` to the same identifier
    pub fn named(mut self, name: &str) -> Self {
        self.query_name = name.into();
        self.expression = name.into();
        self
    }
}

/// One entry of `builderQueries`
///
/// Queries the gateway assembles itself are typed. Queries lifted from a
/// dashboard stay raw JSON so every field, nulls included, goes upstream
/// exactly as the dashboard stored it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuilderEntry {
    Typed(BuilderQuery),
    Raw(Map<String, Value>),
}

impl BuilderEntry {
    /// Read one field as it will appear on the wire
    pub fn field(&self, key: &str) -> Option<Value> {
        match self {
            Self::Typed(query) => serde_json::to_value(query).ok()?.get(key).cloned(),
            Self::Raw(fields) => fields.get(key).cloned(),
        }
    }
}

impl From<BuilderQuery> for BuilderEntry {
    fn from(query: BuilderQuery) -> Self {
        Self::Typed(query)
    }
}

impl From<Map<String, Value>> for BuilderEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self::Raw(fields)
    }
}

/// A raw ClickHouse SQL sub-query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickHouseQuery {
    pub name: String,
    #[serde(default)]
    pub legend: String,
    #[serde(default)]
    pub disabled: bool,
    pub query: String,
}

/// A PromQL sub-query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromQuery {
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub legend: String,
    #[serde(default)]
    pub disabled: bool,
}

/// The `compositeQuery` object of a query-range request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeQuery {
    pub query_type: QueryType,
    pub panel_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_gaps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_queries: Option<BTreeMap<String, BuilderEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ch_queries: Option<BTreeMap<String, ClickHouseQuery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prom_queries: Option<BTreeMap<String, PromQuery>>,
}

impl CompositeQuery {
    fn empty(query_type: QueryType, panel_type: &str) -> Self {
        Self {
            query_type,
            panel_type: panel_type.into(),
            fill_gaps: None,
            builder_queries: None,
            ch_queries: None,
            prom_queries: None,
        }
    }

    /// Builder queries keyed by query name
    pub fn builder<Q: Into<BuilderEntry>>(panel_type: &str, queries: BTreeMap<String, Q>) -> Self {
        let queries = queries.into_iter().map(|(name, query)| (name, query.into())).collect();
        Self {
            builder_queries: Some(queries),
            ..Self::empty(QueryType::Builder, panel_type)
        }
    }

    /// A single ClickHouse SQL query named `A`
    pub fn clickhouse(panel_type: &str, sql: &str) -> Self {
        let query = ClickHouseQuery {
            name: "A".into(),
            legend: String::new(),
            disabled: false,
            query: sql.into(),
        };
        Self {
            ch_queries: Some(BTreeMap::from([("A".to_string(), query)])),
            ..Self::empty(QueryType::ClickhouseSql, panel_type)
        }
    }

    /// A single PromQL query named `A`
    pub fn promql(panel_type: &str, expr: &str) -> Self {
        let query = PromQuery {
            name: "A".into(),
            query: expr.into(),
            legend: String::new(),
            disabled: false,
        };
        Self {
            prom_queries: Some(BTreeMap::from([("A".to_string(), query)])),
            ..Self::empty(QueryType::Promql, panel_type)
        }
    }

    pub fn with_fill_gaps(mut self, fill_gaps: bool) -> Self {
        self.fill_gaps = Some(fill_gaps);
        self
    }
}

/// Body of `POST /api/v4/query_range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRangeRequest {
    /// Millisecond epoch
    pub start: i64,
    /// Millisecond epoch
    pub end: i64,
    /// Seconds
    pub step: u64,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_for_web: Option<bool>,
    pub composite_query: CompositeQuery,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_type_wire_names() {
        assert_eq!(serde_json::to_value(QueryType::Builder).unwrap(), "builder");
        assert_eq!(serde_json::to_value(QueryType::Promql).unwrap(), "promql");
        assert_eq!(
            serde_json::to_value(QueryType::ClickhouseSql).unwrap(),
            "clickhouse_sql"
        );
    }

    #[test]
    fn test_builder_query_keeps_unknown_fields() {
        let raw = json!({
            "queryName": "A",
            "expression": "A",
            "dataSource": "traces",
            "aggregateOperator": "count",
            "functions": [],
            "having": [],
            "limit": null,
            "orderBy": [{"columnName": "timestamp", "order": "desc"}],
            "reduceTo": "sum",
            "stepInterval": 60
        });

        let query: BuilderQuery = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(query.extra["reduceTo"], "sum");
        assert!(query.extra["limit"].is_null());

        let back = serde_json::to_value(&query).unwrap();
        for key in ["functions", "having", "limit", "orderBy", "reduceTo"] {
            assert_eq!(back[key], raw[key], "field {key} changed");
        }
    }

    #[test]
    fn test_raw_builder_entry_keeps_nulls() {
        let raw = json!({"dataSource": "logs", "filters": null, "groupBy": ["service.name"], "legend": null});
        let fields = match raw.clone() {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let composite = CompositeQuery::builder("graph", BTreeMap::from([("A".to_string(), fields)]));

        let value = serde_json::to_value(&composite).unwrap();
        assert_eq!(value["builderQueries"]["A"], raw);
    }

    #[test]
    fn test_builder_entry_field_reads_wire_names() {
        let query: BuilderQuery = serde_json::from_value(json!({})).unwrap();
        let typed = BuilderEntry::from(query.named("B"));
        assert_eq!(typed.field("queryName"), Some(json!("B")));
        assert_eq!(typed.field("stepInterval"), Some(json!(0)));
        assert_eq!(typed.field("pageSize"), None);
    }

    #[test]
    fn test_builder_query_named_sets_both_fields() {
        let query: BuilderQuery = serde_json::from_value(json!({})).unwrap();
        let query = query.named("Q");
        assert_eq!(query.query_name, "Q");
        assert_eq!(query.expression, "Q");
    }

    #[test]
    fn test_attribute_key_type_field() {
        let key = AttributeKey::resource("service.name");
        let value = serde_json::to_value(&key).unwrap();
        assert_eq!(
            value,
            json!({"key": "service.name", "dataType": "string", "isColumn": false, "type": "resource"})
        );
    }

    #[test]
    fn test_filter_item_in() {
        let item = FilterItem::is_in(AttributeKey::tag("operation"), vec!["GET /".into()]);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["op"], "IN");
        assert_eq!(value["value"], json!(["GET /"]));
        assert_eq!(value["key"]["type"], "tag");
    }

    #[test]
    fn test_clickhouse_composite_shape() {
        let composite = CompositeQuery::clickhouse("table", "SELECT 1").with_fill_gaps(false);
        let value = serde_json::to_value(&composite).unwrap();
        assert_eq!(value["queryType"], "clickhouse_sql");
        assert_eq!(value["fillGaps"], false);
        assert_eq!(value["chQueries"]["A"]["query"], "SELECT 1");
        assert!(value.get("builderQueries").is_none());
    }

    #[test]
    fn test_query_range_request_field_names() {
        let request = QueryRangeRequest {
            start: 1,
            end: 2,
            step: 60,
            variables: Map::new(),
            format_for_web: None,
            composite_query: CompositeQuery::promql("graph", "up"),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("compositeQuery").is_some());
        assert!(value.get("formatForWeb").is_none());
        assert_eq!(value["compositeQuery"]["promQueries"]["A"]["query"], "up");
    }
}
