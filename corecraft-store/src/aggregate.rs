//! Group-by aggregation over a table.

use corecraft_model::Entity;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::Store;

/// Statistics for one group.
///
/// `count` is always present. The numeric statistics appear only when a sum
/// field was requested and at least one entity in the group held a value
/// that parses as a number — a group with zero numeric contributions omits
/// them from the payload entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Groups a table's entities by `group_by` and computes per-group stats.
///
/// The group key is the field value rendered as a string; a missing field
/// (or JSON null) groups under the literal `"null"`. When `sum_field` is
/// given, only values parsing as numbers contribute to sum/avg/min/max;
/// strings holding numbers count too (legacy coercion).
#[must_use]
pub fn aggregate(
    store: &Store,
    table_key: &str,
    group_by: &str,
    sum_field: Option<&str>,
) -> BTreeMap<String, GroupStats> {
    let mut grouped: BTreeMap<String, Vec<Entity>> = BTreeMap::new();
    for entity in store.entities(table_key) {
        grouped
            .entry(group_key(entity.get(group_by)))
            .or_default()
            .push(entity);
    }

    grouped
        .into_iter()
        .map(|(key, members)| {
            let mut stats = GroupStats {
                count: members.len(),
                sum: None,
                avg: None,
                min: None,
                max: None,
            };
            if let Some(field) = sum_field {
                let values: Vec<f64> = members.iter().filter_map(|e| e.get_f64(field)).collect();
                if !values.is_empty() {
                    let sum: f64 = values.iter().sum();
                    stats.sum = Some(sum);
                    stats.avg = Some(sum / values.len() as f64);
                    stats.min = values.iter().copied().reduce(f64::min);
                    stats.max = values.iter().copied().reduce(f64::max);
                }
            }
            (key, stats)
        })
        .collect()
}

fn group_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(v: Value) -> Store {
        Store::from_value(v).unwrap()
    }

    #[test]
    fn counts_by_group() {
        let s = store(json!({"order": {
            "o1": {"id": "o1", "status": "paid"},
            "o2": {"id": "o2", "status": "paid"},
            "o3": {"id": "o3", "status": "pending"},
        }}));
        let agg = aggregate(&s, "order", "status", None);
        assert_eq!(agg["paid"].count, 2);
        assert_eq!(agg["pending"].count, 1);
        assert!(agg["paid"].sum.is_none());
    }

    #[test]
    fn missing_group_field_buckets_under_null() {
        let s = store(json!({"order": {
            "o1": {"id": "o1"},
            "o2": {"id": "o2", "status": null},
        }}));
        let agg = aggregate(&s, "order", "status", None);
        assert_eq!(agg["null"].count, 2);
    }

    #[test]
    fn numeric_stats_over_sum_field() {
        let s = store(json!({"payment": {
            "p1": {"id": "p1", "status": "completed", "amount": 100.0},
            "p2": {"id": "p2", "status": "completed", "amount": 50.0},
            "p3": {"id": "p3", "status": "completed", "amount": "not a number"},
        }}));
        let agg = aggregate(&s, "payment", "status", Some("amount"));
        let stats = &agg["completed"];
        assert_eq!(stats.count, 3);
        assert_eq!(stats.sum, Some(150.0));
        assert_eq!(stats.avg, Some(75.0));
        assert_eq!(stats.min, Some(50.0));
        assert_eq!(stats.max, Some(100.0));
    }

    #[test]
    fn group_without_numeric_values_keeps_only_count() {
        let s = store(json!({"payment": {
            "p1": {"id": "p1", "status": "failed", "amount": "n/a"},
        }}));
        let agg = aggregate(&s, "payment", "status", Some("amount"));
        let stats = &agg["failed"];
        assert_eq!(stats.count, 1);
        assert!(stats.sum.is_none());
        assert!(stats.avg.is_none());
        assert!(stats.min.is_none());
        assert!(stats.max.is_none());
    }

    #[test]
    fn numeric_strings_contribute() {
        let s = store(json!({"payment": {
            "p1": {"id": "p1", "status": "completed", "amount": "25.5"},
        }}));
        let agg = aggregate(&s, "payment", "status", Some("amount"));
        assert_eq!(agg["completed"].sum, Some(25.5));
    }
}
