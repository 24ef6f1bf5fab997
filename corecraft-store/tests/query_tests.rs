use corecraft_store::query::{query, SortKey};
use corecraft_store::Store;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn product_store(count: usize) -> Store {
    let mut products = Map::new();
    for i in 0..count {
        let id = format!("p{i:04}");
        products.insert(
            id.clone(),
            json!({"id": id, "name": format!("Part {i}"), "price": (i as f64) * 10.0}),
        );
    }
    Store::from_value(Value::Object(
        [("product".to_string(), Value::Object(products))].into_iter().collect(),
    ))
    .unwrap()
}

fn filters(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap()
}

#[test]
fn price_range_is_inclusive_on_both_bounds() {
    let s = product_store(100);
    let rows = query(&s, "product", &filters(json!({"price": {"$gte": 100, "$lte": 500}})), &[], Some(200));
    let prices: Vec<f64> = rows.iter().map(|e| e.get_f64("price").unwrap()).collect();
    assert!(prices.iter().all(|p| (100.0..=500.0).contains(p)));
    assert!(prices.contains(&100.0));
    assert!(prices.contains(&500.0));
    assert_eq!(prices.len(), 41);
}

#[test]
fn in_filter_returns_status_union() {
    let s = Store::from_value(json!({"support_ticket": {
        "t1": {"id": "t1", "status": "open"},
        "t2": {"id": "t2", "status": "new"},
        "t3": {"id": "t3", "status": "closed"},
    }}))
    .unwrap();
    let rows = query(&s, "support_ticket", &filters(json!({"status": {"$in": ["open", "new"]}})), &[], None);
    assert_eq!(rows.len(), 2);
}

#[test]
fn contains_filter_is_case_insensitive() {
    let s = Store::from_value(json!({"support_ticket": {
        "t1": {"id": "t1", "subject": "PC won't BOOT"},
        "t2": {"id": "t2", "subject": "slow fans"},
    }}))
    .unwrap();
    let rows = query(&s, "support_ticket", &filters(json!({"subject": {"$contains": "boot"}})), &[], None);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id(), Some("t1"));
}

#[test]
fn omitted_limit_returns_at_most_default() {
    let s = product_store(120);
    assert_eq!(query(&s, "product", &Map::new(), &[], None).len(), 50);
}

#[test]
fn oversized_limit_is_capped() {
    let s = product_store(300);
    assert_eq!(query(&s, "product", &Map::new(), &[], Some(500)).len(), 200);
}

#[test]
fn unsorted_query_preserves_scan_order() {
    let s = Store::from_value(json!({"order": {
        "z9": {"id": "z9"},
        "a1": {"id": "a1"},
    }}))
    .unwrap();
    let rows = query(&s, "order", &Map::new(), &[], None);
    let ids: Vec<_> = rows.iter().map(|e| e.id().unwrap()).collect();
    assert_eq!(ids, ["z9", "a1"]);
}

#[test]
fn two_level_sort_is_deterministic() {
    let s = Store::from_value(json!({"support_ticket": {
        "t2": {"id": "t2", "createdAt": "2025-06-01T00:00:00Z"},
        "t1": {"id": "t1", "createdAt": "2025-06-01T00:00:00Z"},
        "t3": {"id": "t3", "createdAt": "2025-07-01T00:00:00Z"},
    }}))
    .unwrap();
    let rows = query(&s, "support_ticket", &Map::new(), &[SortKey::desc("createdAt")], None);
    let ids: Vec<_> = rows.iter().map(|e| e.id().unwrap()).collect();
    assert_eq!(ids, ["t3", "t1", "t2"]);
}

proptest! {
    #[test]
    fn limit_cap_holds_for_any_request(requested in -1000i64..10_000) {
        let s = product_store(250);
        let rows = query(&s, "product", &Map::new(), &[], Some(requested));
        prop_assert!(rows.len() <= 200);
        if requested <= 0 {
            prop_assert!(rows.len() <= 50);
        }
    }
}
