use corecraft_store::related::{related, RelatedGroups};
use corecraft_store::{Error, Store};
use serde_json::json;

/// One customer with two orders, two tickets, two payments, one shipment,
/// one refund, one escalation, one resolution, and three distinct products
/// across the orders.
fn fixture() -> Store {
    Store::from_value(json!({
        "customer": {
            "cust1": {"id": "cust1", "name": "Ada"},
            "cust2": {"id": "cust2", "name": "Grace"},
        },
        "order": {
            "ord1": {"id": "ord1", "customerId": "cust1",
                     "lineItems": [{"productId": "cpu1", "qty": 1}, {"productId": "gpu1", "qty": 1}]},
            "ord2": {"id": "ord2", "customerId": "cust1",
                     "lineItems": [{"productId": "ram1", "qty": 2}]},
            "ord3": {"id": "ord3", "customerId": "cust2", "lineItems": []},
        },
        "support_ticket": {
            "tick1": {"id": "tick1", "customerId": "cust1"},
            "tick2": {"id": "tick2", "orderId": "ord2"},
            "tick3": {"id": "tick3", "customerId": "cust2"},
        },
        "payment": {
            "pay1": {"id": "pay1", "orderId": "ord1", "amount": 100.0},
            "pay2": {"id": "pay2", "orderId": "ord2", "amount": 50.0},
            "pay3": {"id": "pay3", "orderId": "ord3", "amount": 10.0},
        },
        "shipment": {
            "ship1": {"id": "ship1", "orderId": "ord1"},
        },
        "refund": {
            "ref1": {"id": "ref1", "paymentId": "pay1"},
            "ref2": {"id": "ref2", "paymentId": "pay3"},
        },
        "escalation": {
            "esc1": {"id": "esc1", "ticketId": "tick1"},
        },
        "resolution": {
            "res1": {"id": "res1", "ticketId": "tick2"},
        },
        "product": {
            "cpu1": {"id": "cpu1", "name": "CPU"},
            "gpu1": {"id": "gpu1", "name": "GPU"},
            "ram1": {"id": "ram1", "name": "RAM"},
        },
    }))
    .unwrap()
}

#[test]
fn customer_seed_collects_full_closure() {
    let walk = related(&fixture(), "cust1").unwrap();
    assert_eq!(walk.seed_type, "customer");
    let g = &walk.groups;
    assert_eq!(g.customers.len(), 1);
    assert_eq!(g.orders.len(), 2);
    assert_eq!(g.tickets.len(), 2);
    assert_eq!(g.payments.len(), 2);
    assert_eq!(g.shipments.len(), 1);
    assert_eq!(g.refunds.len(), 1);
    assert_eq!(g.escalations.len(), 1);
    assert_eq!(g.resolutions.len(), 1);
    assert_eq!(g.products.len(), 3);
}

#[test]
fn summary_reports_group_counts() {
    let walk = related(&fixture(), "cust1").unwrap();
    let summary = walk.groups.summary();
    assert_eq!(summary["orders"], 2);
    assert_eq!(summary["products"], 3);
    assert_eq!(summary["resolutions"], 1);
}

#[test]
fn order_seed_widens_through_its_customer() {
    let walk = related(&fixture(), "ord2").unwrap();
    assert_eq!(walk.seed_type, "order");
    let g = &walk.groups;
    assert_eq!(g.customers.len(), 1);
    // ord2 carries customerId=cust1, so the customer pivot wins and the walk
    // pulls the customer's whole order set, not just the seed order.
    assert_eq!(g.orders.len(), 2);
    assert_eq!(g.payments.len(), 2);
    assert_eq!(g.tickets.len(), 2);
    assert_eq!(g.products.len(), 3);
}

#[test]
fn customerless_order_seed_stays_on_the_single_order() {
    // Without a customerId the walk cannot widen; only the seed order's own
    // edges contribute.
    let store = Store::from_value(json!({
        "customer": {"c1": {"id": "c1"}},
        "order": {
            "o1": {"id": "o1", "lineItems": [{"productId": "cpu1", "qty": 1}]},
            "o2": {"id": "o2", "customerId": "c1"},
        },
        "payment": {"p1": {"id": "p1", "orderId": "o1"}},
        "product": {"cpu1": {"id": "cpu1"}},
    }))
    .unwrap();
    let walk = related(&store, "o1").unwrap();
    let g = &walk.groups;
    assert_eq!(g.orders.len(), 1);
    assert_eq!(g.customers.len(), 0);
    assert_eq!(g.payments.len(), 1);
    assert_eq!(g.products.len(), 1);
}

#[test]
fn ticket_seed_pivots_through_its_customer() {
    let walk = related(&fixture(), "tick1").unwrap();
    assert_eq!(walk.seed_type, "ticket");
    // tick1 carries customerId=cust1, so the walk widens to the customer's
    // whole order set.
    assert_eq!(walk.groups.orders.len(), 2);
    assert_eq!(walk.groups.tickets.len(), 2);
}

#[test]
fn refund_seed_keeps_its_payment() {
    let walk = related(&fixture(), "ref2").unwrap();
    assert_eq!(walk.seed_type, "refund");
    assert_eq!(walk.groups.payments.len(), 1);
    assert_eq!(walk.groups.payments[0].id(), Some("pay3"));
    assert_eq!(walk.groups.refunds.len(), 1);
}

#[test]
fn build_style_seed_contributes_its_product_list() {
    let mut store = fixture();
    // A product seed with componentIds exercises the seed-list edge.
    store.upsert(
        "product",
        "bundle1",
        corecraft_model::Entity::from_value(&json!({
            "id": "bundle1",
            "componentIds": ["cpu1", "ram1"],
        }))
        .unwrap(),
    );
    let walk = related(&store, "bundle1").unwrap();
    assert_eq!(walk.seed_type, "product");
    assert_eq!(walk.groups.products.len(), 2);
}

#[test]
fn ambiguous_id_resolves_to_earliest_priority_table() {
    let store = Store::from_value(json!({
        "customer": {"dup1": {"id": "dup1"}},
        "order": {"dup1": {"id": "dup1", "customerId": "nobody"}},
    }))
    .unwrap();
    let walk = related(&store, "dup1").unwrap();
    assert_eq!(walk.seed_type, "customer");
}

#[test]
fn unknown_seed_is_not_found_with_empty_groups_available() {
    let err = related(&fixture(), "ghost").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    // Callers emit the all-empty grouped structure alongside the error.
    let empty = RelatedGroups::default();
    assert_eq!(empty.summary()["customers"], 0);
    assert_eq!(empty.summary()["products"], 0);
}

#[test]
fn line_items_stored_as_json_strings_still_resolve() {
    let store = Store::from_value(json!({
        "customer": {"c1": {"id": "c1"}},
        "order": {"o1": {"id": "o1", "customerId": "c1",
                          "lineItems": "[{\"productId\": \"cpu1\", \"qty\": 1}]"}},
        "product": {"cpu1": {"id": "cpu1"}},
    }))
    .unwrap();
    let walk = related(&store, "c1").unwrap();
    assert_eq!(walk.groups.products.len(), 1);
}
