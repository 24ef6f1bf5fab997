use corecraft_model::Entity;
use pretty_assertions::assert_eq;
use serde_json::json;

fn make_entity(value: serde_json::Value) -> Entity {
    Entity::from_value(&value).expect("object value")
}

// ── Construction & field access ──────────────────────────────────

#[test]
fn from_value_accepts_objects_only() {
    assert!(Entity::from_value(&json!({"id": "c1"})).is_some());
    assert!(Entity::from_value(&json!("not an object")).is_none());
    assert!(Entity::from_value(&json!([1, 2])).is_none());
    assert!(Entity::from_value(&json!(null)).is_none());
}

#[test]
fn id_reads_the_id_field() {
    let e = make_entity(json!({"id": "cust1", "name": "Ada"}));
    assert_eq!(e.id(), Some("cust1"));
}

#[test]
fn id_is_none_for_non_string_or_missing() {
    assert_eq!(make_entity(json!({"id": 42})).id(), None);
    assert_eq!(make_entity(json!({})).id(), None);
}

#[test]
fn get_str_returns_only_strings() {
    let e = make_entity(json!({"status": "open", "count": 3}));
    assert_eq!(e.get_str("status"), Some("open"));
    assert_eq!(e.get_str("count"), None);
    assert_eq!(e.get_str("missing"), None);
}

// ── Numeric access ───────────────────────────────────────────────

#[test]
fn get_f64_reads_numbers() {
    let e = make_entity(json!({"price": 19.99, "qty": 3}));
    assert_eq!(e.get_f64("price"), Some(19.99));
    assert_eq!(e.get_f64("qty"), Some(3.0));
}

#[test]
fn get_f64_parses_numeric_strings() {
    let e = make_entity(json!({"amount": "100.5"}));
    assert_eq!(e.get_f64("amount"), Some(100.5));
}

#[test]
fn get_f64_rejects_non_numeric() {
    let e = make_entity(json!({"amount": "lots", "flag": true}));
    assert_eq!(e.get_f64("amount"), None);
    assert_eq!(e.get_f64("flag"), None);
}

// ── Mutation ─────────────────────────────────────────────────────

#[test]
fn set_returns_old_value() {
    let mut e = make_entity(json!({"status": "open"}));
    let old = e.set("status", json!("closed"));
    assert_eq!(old, Some(json!("open")));
    assert_eq!(e.get_str("status"), Some("closed"));
}

#[test]
fn set_new_field_is_allowed() {
    let mut e = make_entity(json!({}));
    assert_eq!(e.set("escalationLevel", json!(2)), None);
    assert!(e.contains("escalationLevel"));
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn entity_serializes_transparently() {
    let e = make_entity(json!({"id": "x", "nested": {"a": [1, 2]}}));
    let round: Entity = serde_json::from_str(&serde_json::to_string(&e).unwrap()).unwrap();
    assert_eq!(round, e);
    assert_eq!(e.to_value(), json!({"id": "x", "nested": {"a": [1, 2]}}));
}
