use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::FilterWhereInfo;

pub struct FilterWhere;

impl FilterWhere {
    /// Build `WHERE` conditions with placeholders starting after `starting_param_index`.
    ///
    /// Columns are compared through `to_jsonb` so a single JSON parameter binds
    /// against uuid, integer and text columns alike.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        let mut params = Vec::with_capacity(conditions.len());

        for (offset, condition) in conditions.iter().enumerate() {
            validate_column(&condition.column)?;
            sql_conditions.push(format!(
                "to_jsonb(\"{}\") = ${}::jsonb",
                condition.column,
                starting_param_index + offset + 1
            ));
            params.push(condition.data.clone());
        }

        Ok((sql_conditions.join(" AND "), params))
    }

    /// Evaluate the same conditions against an in-memory record
    pub fn matches(conditions: &[FilterWhereInfo], record: &Map<String, Value>) -> bool {
        conditions
            .iter()
            .all(|c| record.get(&c.column).unwrap_or(&Value::Null) == &c.data)
    }
}

pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
    let mut chars = column.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generates_numbered_placeholders() {
        let conditions = vec![
            FilterWhereInfo { column: "folder_id".into(), data: json!("abc") },
            FilterWhereInfo { column: "title".into(), data: json!("Intro") },
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(sql, "to_jsonb(\"folder_id\") = $1::jsonb AND to_jsonb(\"title\") = $2::jsonb");
        assert_eq!(params, vec![json!("abc"), json!("Intro")]);
    }

    #[test]
    fn rejects_injected_column() {
        let conditions = vec![FilterWhereInfo { column: "id; DROP TABLE".into(), data: json!(1) }];
        assert!(FilterWhere::generate(&conditions, 0).is_err());
    }

    #[test]
    fn matches_missing_column_as_null() {
        let record = json!({ "name": "Weddings" });
        let record = record.as_object().unwrap();
        let conditions = vec![FilterWhereInfo { column: "logo_url".into(), data: Value::Null }];
        assert!(FilterWhere::matches(&conditions, record));
    }
}
