//! Dashboard read models
//!
//! The gateway only reads dashboards. Widgets stay as raw JSON inside
//! [`DashboardMeta`] so that one malformed widget cannot hide the rest.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response of `GET /api/v1/dashboards`
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardList {
    pub data: Vec<DashboardSummary>,
}

impl DashboardList {
    /// First dashboard whose title matches exactly (case-sensitive)
    pub fn find_by_title(&self, title: &str) -> Option<&DashboardSummary> {
        self.data
            .iter()
            .find(|d| d.data.as_ref().and_then(|m| m.title.as_deref()) == Some(title))
    }
}

/// One entry of the dashboard listing
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub data: Option<DashboardMeta>,
}

/// Full dashboard as returned by `GET /api/v1/dashboards/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardDetails {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Option<DashboardMeta>,
}

impl DashboardDetails {
    pub fn widgets(&self) -> &[Value] {
        self.data.as_ref().map(|m| m.widgets.as_slice()).unwrap_or(&[])
    }
}

/// The `data` object of a dashboard
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub widgets: Vec<Value>,
}

/// A dashboard panel
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub panel_types: Option<String>,
    #[serde(default)]
    pub panel_type: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub query: Option<WidgetQuery>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetQuery {
    #[serde(default)]
    pub query_type: Option<String>,
    #[serde(default)]
    pub builder: Option<WidgetBuilder>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetBuilder {
    #[serde(default)]
    pub query_data: Vec<Value>,
}

impl Widget {
    /// `title`, falling back to `Panel_<id>`
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Panel_{}", self.id.as_deref().unwrap_or_default()),
        }
    }

    /// `panelTypes`, then `panelType`, then `type`, then `graph`
    pub fn panel_kind(&self) -> &str {
        [&self.panel_types, &self.panel_type, &self.kind]
            .into_iter()
            .find_map(|v| v.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("graph")
    }

    /// Raw sub-queries, only when the panel is builder-backed
    pub fn builder_query_data(&self) -> &[Value] {
        match &self.query {
            Some(WidgetQuery {
                query_type: Some(kind),
                builder: Some(builder),
            }) if kind == "builder" => &builder.query_data,
            _ => &[],
        }
    }
}

fn value_to_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(value).ok_or_else(|| serde::de::Error::custom("dashboard id must be a string or number"))
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_id(Value::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing() -> DashboardList {
        serde_json::from_value(json!({
            "data": [
                {"id": "a1", "data": {"title": "Checkout"}},
                {"id": 7, "data": {"title": "checkout"}},
                {"id": "a2", "data": {"title": "Checkout"}},
                {"id": "a3"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_find_by_title_first_match_wins() {
        let list = listing();
        assert_eq!(list.find_by_title("Checkout").unwrap().id, "a1");
    }

    #[test]
    fn test_find_by_title_is_case_sensitive() {
        let list = listing();
        assert_eq!(list.find_by_title("checkout").unwrap().id, "7");
        assert!(list.find_by_title("CHECKOUT").is_none());
    }

    #[test]
    fn test_listing_without_data_fails() {
        let result: Result<DashboardList, _> = serde_json::from_value(json!({"status": "ok"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_widget_title_fallback() {
        let widget: Widget = serde_json::from_value(json!({"id": "w-9"})).unwrap();
        assert_eq!(widget.display_title(), "Panel_w-9");

        let widget: Widget = serde_json::from_value(json!({"id": "w-9", "title": ""})).unwrap();
        assert_eq!(widget.display_title(), "Panel_w-9");
    }

    #[test]
    fn test_widget_panel_kind_precedence() {
        let widget: Widget =
            serde_json::from_value(json!({"panelTypes": "value", "panelType": "table"})).unwrap();
        assert_eq!(widget.panel_kind(), "value");

        let widget: Widget = serde_json::from_value(json!({"type": "bar"})).unwrap();
        assert_eq!(widget.panel_kind(), "bar");

        let widget = Widget::default();
        assert_eq!(widget.panel_kind(), "graph");
    }

    #[test]
    fn test_only_builder_queries_are_exposed() {
        let builder: Widget = serde_json::from_value(json!({
            "query": {"queryType": "builder", "builder": {"queryData": [{"dataSource": "metrics"}]}}
        }))
        .unwrap();
        assert_eq!(builder.builder_query_data().len(), 1);

        let sql: Widget = serde_json::from_value(json!({
            "query": {"queryType": "clickhouse_sql", "builder": {"queryData": [{"dataSource": "metrics"}]}}
        }))
        .unwrap();
        assert!(sql.builder_query_data().is_empty());
    }

    #[test]
    fn test_details_widgets() {
        let details: DashboardDetails = serde_json::from_value(json!({
            "id": "a1",
            "data": {"title": "Checkout", "widgets": [{"title": "p1"}, {"title": "p2"}]}
        }))
        .unwrap();
        assert_eq!(details.widgets().len(), 2);
        assert_eq!(details.id.as_deref(), Some("a1"));
    }
}
