use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, SqlResult};

/// A validated query against one table, renderable as SQL or applied to in-memory rows
pub struct Filter {
    table_name: String,
    data: FilterData,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            data: FilterData::default(),
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(limit) = data.limit {
            if limit < 0 {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
            }
        }
        self.data = data;
        Ok(self)
    }

    /// Rows are returned as a single `row` json column so the caller never maps columns by hand
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.data.where_clause, 0)?;
        let order_clause = FilterOrder::generate(&self.data.order)?;
        let limit_clause = self.data.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();

        let query = [
            format!("SELECT row_to_json(t) AS row FROM \"{}\" t", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.data.where_clause, 0)?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    /// Apply conditions, ordering and limit to rows held in memory
    pub fn apply<'a, I>(&self, rows: I) -> Vec<Map<String, Value>>
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let mut out: Vec<Map<String, Value>> = rows
            .into_iter()
            .filter(|r| FilterWhere::matches(&self.data.where_clause, r))
            .cloned()
            .collect();
        FilterOrder::sort(&self.data.order, &mut out);
        if let Some(limit) = self.data.limit {
            out.truncate(limit as usize);
        }
        out
    }

    pub fn count<'a, I>(&self, rows: I) -> i64
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        rows.into_iter()
            .filter(|r| FilterWhere::matches(&self.data.where_clause, r))
            .count() as i64
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }
}
