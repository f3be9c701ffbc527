use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_where::validate_column;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() { return Ok(String::new()); }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            validate_column(&info.column)?;
            parts.push(format!("\"{}\" {}", info.column, info.sort.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    /// Stable in-memory sort matching the SQL ordering (nulls first on ascending)
    pub fn sort(infos: &[FilterOrderInfo], records: &mut [Map<String, Value>]) {
        if infos.is_empty() { return; }
        records.sort_by(|a, b| {
            for info in infos {
                let left = a.get(&info.column).unwrap_or(&Value::Null);
                let right = b.get(&info.column).unwrap_or(&Value::Null);
                let ord = compare_values(left, right);
                let ord = match info.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                if ord != Ordering::Equal { return ord; }
            }
            Ordering::Equal
        });
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => left.to_string().cmp(&right.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn quotes_reserved_column() {
        let infos = vec![FilterOrderInfo { column: "order".into(), sort: SortDirection::Asc }];
        assert_eq!(FilterOrder::generate(&infos).unwrap(), "ORDER BY \"order\" ASC");
    }

    #[test]
    fn sorts_numbers_not_strings() {
        let mut rows = vec![
            record(json!({ "name": "c", "order": 10 })),
            record(json!({ "name": "a", "order": 2 })),
            record(json!({ "name": "b", "order": 2 })),
        ];
        let infos = vec![FilterOrderInfo { column: "order".into(), sort: SortDirection::Asc }];
        FilterOrder::sort(&infos, &mut rows);
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        // equal keys keep insertion order
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
