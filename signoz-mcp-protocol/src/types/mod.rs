//! Shared data types

mod dashboard;
mod outcome;
mod query;

pub use dashboard::{DashboardDetails, DashboardList, DashboardMeta, DashboardSummary, Widget};
pub use outcome::{ToolOutcome, ToolStatus};
pub use query::{
    AttributeKey, BuilderEntry, BuilderQuery, ClickHouseQuery, CompositeQuery, FilterItem, FilterSet, PromQuery,
    QueryRangeRequest, QueryType,
};
