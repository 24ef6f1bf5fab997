//! Structured filter evaluation over a table.
//!
//! A filter value is one of:
//! - a scalar — exact match, case-insensitive when both sides are strings
//! - a bare list — shorthand for `$in`
//! - an operator object — `$gte`, `$lte`, `$gt`, `$lt`, `$ne`, `$in`,
//!   `$contains`
//!
//! All supplied filters are ANDed. Range comparisons are numeric when both
//! sides are numbers and lexicographic when both are strings (ISO-8601
//! timestamps order correctly that way); incomparable types fail the
//! filter. `$ne` against a missing field matches. Unknown `$` operators are
//! ignored, matching the tolerant legacy evaluator.

use corecraft_model::Entity;
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::Store;

/// Rows returned when no limit is requested.
pub const DEFAULT_LIMIT: usize = 50;

/// Hard cap applied regardless of the requested limit.
pub const MAX_LIMIT: usize = 200;

/// One level of a deterministic sort.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    /// Ascending sort on a field.
    #[must_use]
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    /// Descending sort on a field.
    #[must_use]
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

/// Clamps a requested limit to `[1, MAX_LIMIT]`, with non-positive or
/// missing values falling back to [`DEFAULT_LIMIT`].
#[must_use]
pub fn effective_limit(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n > 0 => (n as usize).min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// Evaluates filters over a table and returns matching rows.
///
/// Result order is insertion/scan order unless `order_by` is non-empty, in
/// which case the supplied keys are applied with `id` ascending as the
/// final tie-break (the discipline every search-style tool follows).
#[must_use]
pub fn query(
    store: &Store,
    table_key: &str,
    filters: &Map<String, Value>,
    order_by: &[SortKey],
    limit: Option<i64>,
) -> Vec<Entity> {
    let mut results: Vec<Entity> = store
        .entities(table_key)
        .into_iter()
        .filter(|entity| matches_filters(entity, filters))
        .collect();
    if !order_by.is_empty() {
        sort_with_id_tiebreak(&mut results, order_by);
    }
    results.truncate(effective_limit(limit));
    results
}

/// Whether an entity satisfies every supplied filter.
#[must_use]
pub fn matches_filters(entity: &Entity, filters: &Map<String, Value>) -> bool {
    filters.iter().all(|(field, filter)| {
        let actual = entity.get(field);
        match filter {
            Value::Object(ops) => ops.iter().all(|(op, operand)| apply_op(actual, op, operand)),
            Value::Array(list) => actual.is_some_and(|v| list.iter().any(|item| loose_eq(v, item))),
            scalar => actual.is_some_and(|v| loose_eq(v, scalar)),
        }
    })
}

/// Sorts entities by the given keys, then by `id` ascending.
///
/// Missing sort fields order after present ones; incomparable values are
/// treated as equal and fall through to the tie-break.
pub fn sort_with_id_tiebreak(entities: &mut [Entity], keys: &[SortKey]) {
    entities.sort_by(|a, b| {
        for key in keys {
            let ord = match (a.get(&key.field), b.get(&key.field)) {
                (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id().unwrap_or("").cmp(b.id().unwrap_or(""))
    });
}

fn apply_op(actual: Option<&Value>, op: &str, operand: &Value) -> bool {
    match op {
        "$gte" => ordered(actual, operand, |o| o != Ordering::Less),
        "$lte" => ordered(actual, operand, |o| o != Ordering::Greater),
        "$gt" => ordered(actual, operand, |o| o == Ordering::Greater),
        "$lt" => ordered(actual, operand, |o| o == Ordering::Less),
        "$ne" => match actual {
            Some(v) => !loose_eq(v, operand),
            None => true,
        },
        "$in" => match (actual, operand) {
            (Some(v), Value::Array(list)) => list.iter().any(|item| loose_eq(v, item)),
            _ => false,
        },
        "$contains" => match (actual, operand) {
            (Some(Value::String(haystack)), Value::String(needle)) => {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        },
        // Unknown operators are ignored rather than failing the row.
        _ => true,
    }
}

fn ordered(actual: Option<&Value>, operand: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    match actual {
        Some(v) => compare_values(v, operand).is_some_and(accept),
        None => false,
    }
}

/// Equality with case-insensitive string comparison and numeric coercion
/// (`100` equals `100.0`). Other types fall back to strict JSON equality.
#[must_use]
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.eq_ignore_ascii_case(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => fx == fy,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Partial ordering for filter operands: numeric for number pairs,
/// lexicographic for string pairs, `None` otherwise.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(v: Value) -> Entity {
        Entity::from_value(&v).unwrap()
    }

    fn filters(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn effective_limit_defaults_and_caps() {
        assert_eq!(effective_limit(None), 50);
        assert_eq!(effective_limit(Some(0)), 50);
        assert_eq!(effective_limit(Some(-5)), 50);
        assert_eq!(effective_limit(Some(7)), 7);
        assert_eq!(effective_limit(Some(500)), 200);
    }

    #[test]
    fn scalar_string_match_is_case_insensitive() {
        let e = entity(json!({"status": "Open"}));
        assert!(matches_filters(&e, &filters(json!({"status": "open"}))));
    }

    #[test]
    fn scalar_numeric_match_coerces_representations() {
        let e = entity(json!({"amount": 100}));
        assert!(matches_filters(&e, &filters(json!({"amount": 100.0}))));
    }

    #[test]
    fn bare_list_is_in_shorthand() {
        let e = entity(json!({"status": "new"}));
        assert!(matches_filters(&e, &filters(json!({"status": ["open", "new"]}))));
        assert!(!matches_filters(&e, &filters(json!({"status": ["open", "closed"]}))));
    }

    #[test]
    fn range_operators_are_inclusive() {
        let f = filters(json!({"price": {"$gte": 100, "$lte": 500}}));
        assert!(matches_filters(&entity(json!({"price": 100})), &f));
        assert!(matches_filters(&entity(json!({"price": 500})), &f));
        assert!(!matches_filters(&entity(json!({"price": 99.99})), &f));
        assert!(!matches_filters(&entity(json!({"price": 500.01})), &f));
    }

    #[test]
    fn range_operator_on_missing_field_fails() {
        let f = filters(json!({"price": {"$gte": 1}}));
        assert!(!matches_filters(&entity(json!({})), &f));
    }

    #[test]
    fn string_ranges_compare_lexicographically() {
        let f = filters(json!({"createdAt": {"$gte": "2025-01-01T00:00:00Z"}}));
        assert!(matches_filters(&entity(json!({"createdAt": "2025-06-01T00:00:00Z"})), &f));
        assert!(!matches_filters(&entity(json!({"createdAt": "2024-12-31T23:59:59Z"})), &f));
    }

    #[test]
    fn ne_on_missing_field_matches() {
        let f = filters(json!({"status": {"$ne": "closed"}}));
        assert!(matches_filters(&entity(json!({})), &f));
        assert!(!matches_filters(&entity(json!({"status": "closed"})), &f));
    }

    #[test]
    fn contains_is_case_insensitive_and_string_only() {
        let f = filters(json!({"subject": {"$contains": "BOOT"}}));
        assert!(matches_filters(&entity(json!({"subject": "PC won't boot"})), &f));
        assert!(!matches_filters(&entity(json!({"subject": 42})), &f));
    }

    #[test]
    fn filters_are_anded() {
        let f = filters(json!({"status": "open", "priority": "high"}));
        assert!(matches_filters(&entity(json!({"status": "open", "priority": "high"})), &f));
        assert!(!matches_filters(&entity(json!({"status": "open", "priority": "low"})), &f));
    }

    #[test]
    fn unknown_operator_is_ignored() {
        let f = filters(json!({"status": {"$regex": ".*"}}));
        assert!(matches_filters(&entity(json!({"status": "open"})), &f));
    }

    #[test]
    fn sort_applies_id_tiebreak() {
        let mut rows = vec![
            entity(json!({"id": "b", "createdAt": "2025-01-01"})),
            entity(json!({"id": "a", "createdAt": "2025-01-01"})),
            entity(json!({"id": "c", "createdAt": "2025-02-01"})),
        ];
        sort_with_id_tiebreak(&mut rows, &[SortKey::desc("createdAt")]);
        let ids: Vec<_> = rows.iter().map(|e| e.id().unwrap().to_string()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
