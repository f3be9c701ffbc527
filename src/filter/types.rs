use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query shape accepted by the record store: equality conditions, ordering, optional limit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub where_clause: Vec<FilterWhereInfo>,
    pub order: Vec<FilterOrderInfo>,
    pub limit: Option<i64>,
}

impl FilterData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column = value` condition
    pub fn where_eq(mut self, column: impl Into<String>, data: impl Into<Value>) -> Self {
        self.where_clause.push(FilterWhereInfo {
            column: column.into(),
            data: data.into(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, sort: SortDirection) -> Self {
        self.order.push(FilterOrderInfo {
            column: column.into(),
            sort,
        });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterWhereInfo {
    pub column: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
