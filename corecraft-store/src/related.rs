//! Fixed-topology relationship traversal.
//!
//! Given any seed entity ID, walks the known foreign-key edges
//! (`customerId`, `orderId`, `paymentId`, `ticketId`, line-item and
//! component product references) and collects every transitively related
//! entity, grouped by type. Every group is always present in the output,
//! possibly empty — callers rely on the keys existing.

use corecraft_model::Entity;
use corecraft_types::Error;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::Store;

/// Seed lookup priority: the first table containing the ID determines the
/// seed type, so an ID colliding across tables resolves to the
/// earliest-priority type. This order is a tested contract.
pub const SEED_LOOKUP_ORDER: [(&str, &str); 9] = [
    ("customer", "customer"),
    ("order", "order"),
    ("ticket", "support_ticket"),
    ("payment", "payment"),
    ("shipment", "shipment"),
    ("product", "product"),
    ("refund", "refund"),
    ("escalation", "escalation"),
    ("resolution", "resolution"),
];

/// Related entities grouped by type. All groups serialize even when empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelatedGroups {
    pub customers: Vec<Entity>,
    pub orders: Vec<Entity>,
    pub tickets: Vec<Entity>,
    pub payments: Vec<Entity>,
    pub shipments: Vec<Entity>,
    pub refunds: Vec<Entity>,
    pub escalations: Vec<Entity>,
    pub resolutions: Vec<Entity>,
    pub products: Vec<Entity>,
}

impl RelatedGroups {
    /// Per-group entity counts.
    #[must_use]
    pub fn summary(&self) -> Value {
        json!({
            "customers": self.customers.len(),
            "orders": self.orders.len(),
            "tickets": self.tickets.len(),
            "payments": self.payments.len(),
            "shipments": self.shipments.len(),
            "refunds": self.refunds.len(),
            "escalations": self.escalations.len(),
            "resolutions": self.resolutions.len(),
            "products": self.products.len(),
        })
    }
}

/// A completed walk: the resolved seed type and the grouped closure.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedWalk {
    pub seed_id: String,
    pub seed_type: String,
    pub groups: RelatedGroups,
}

/// Collects all entities transitively related to `seed_id`.
///
/// # Errors
/// [`Error::NotFound`] when no table in [`SEED_LOOKUP_ORDER`] contains the
/// seed ID. Callers should still emit an all-empty [`RelatedGroups`]
/// alongside the error payload.
pub fn related(store: &Store, seed_id: &str) -> Result<RelatedWalk, Error> {
    let mut seed: Option<(&str, Entity)> = None;
    for (seed_type, table_key) in SEED_LOOKUP_ORDER {
        if let Some(entity) = store.get(table_key, seed_id) {
            seed = Some((seed_type, entity));
            break;
        }
    }
    let Some((seed_type, seed_entity)) = seed else {
        return Err(Error::NotFound(format!("Entity {seed_id}")));
    };

    let mut groups = RelatedGroups::default();

    // Pivots derived from the seed's own foreign keys; a customer or order
    // seed pivots on itself.
    let mut customer_id = seed_entity.get_str("customerId").map(str::to_string);
    let mut order_id = seed_entity.get_str("orderId").map(str::to_string);
    let payment_id = seed_entity.get_str("paymentId").map(str::to_string);
    let seed_ticket_id = seed_entity.get_str("ticketId").map(str::to_string);
    if seed_type == "customer" {
        customer_id = Some(seed_id.to_string());
    }
    if seed_type == "order" {
        order_id = Some(seed_id.to_string());
    }

    if let Some(cid) = &customer_id {
        if let Some(customer) = store.get("customer", cid) {
            groups.customers.push(customer);
        }
    }

    let mut order_ids: BTreeSet<String> = BTreeSet::new();
    if let Some(cid) = &customer_id {
        for (oid, order) in store.entries("order") {
            if order.get_str("customerId") == Some(cid.as_str()) {
                order_ids.insert(oid);
                groups.orders.push(order);
            }
        }
    } else if let Some(oid) = &order_id {
        if let Some(order) = store.get("order", oid) {
            // An order reached without a customer pivot still contributes
            // its owner to the closure.
            if let Some(cid) = order.get_str("customerId") {
                if let Some(customer) = store.get("customer", cid) {
                    groups.customers.push(customer);
                }
            }
            order_ids.insert(oid.clone());
            groups.orders.push(order);
        }
    }

    let mut ticket_ids: BTreeSet<String> = BTreeSet::new();
    for (tid, ticket) in store.entries("support_ticket") {
        let by_customer = customer_id
            .as_deref()
            .is_some_and(|cid| ticket.get_str("customerId") == Some(cid));
        let by_order = ticket
            .get_str("orderId")
            .is_some_and(|oid| order_ids.contains(oid));
        let is_seed_ticket = seed_ticket_id.as_deref() == Some(tid.as_str());
        if by_customer || by_order || is_seed_ticket {
            ticket_ids.insert(tid);
            groups.tickets.push(ticket);
        }
    }

    let mut payment_ids: BTreeSet<String> = BTreeSet::new();
    for (pid, payment) in store.entries("payment") {
        let by_order = payment
            .get_str("orderId")
            .is_some_and(|oid| order_ids.contains(oid));
        let is_seed_payment = payment_id.as_deref() == Some(pid.as_str());
        if by_order || is_seed_payment {
            payment_ids.insert(pid);
            groups.payments.push(payment);
        }
    }

    for shipment in store.entities("shipment") {
        if shipment
            .get_str("orderId")
            .is_some_and(|oid| order_ids.contains(oid))
        {
            groups.shipments.push(shipment);
        }
    }

    for refund in store.entities("refund") {
        if refund
            .get_str("paymentId")
            .is_some_and(|pid| payment_ids.contains(pid))
        {
            groups.refunds.push(refund);
        }
    }

    for escalation in store.entities("escalation") {
        if escalation
            .get_str("ticketId")
            .is_some_and(|tid| ticket_ids.contains(tid))
        {
            groups.escalations.push(escalation);
        }
    }

    for resolution in store.entities("resolution") {
        if resolution
            .get_str("ticketId")
            .is_some_and(|tid| ticket_ids.contains(tid))
        {
            groups.resolutions.push(resolution);
        }
    }

    // Products referenced by any collected order's line items, or by the
    // seed's own component/product list.
    let mut product_ids: BTreeSet<String> = BTreeSet::new();
    for order in &groups.orders {
        collect_line_item_products(order, &mut product_ids);
    }
    for list_field in ["productIds", "componentIds"] {
        if let Some(Value::Array(ids)) = seed_entity.get(list_field) {
            for id in ids {
                if let Some(pid) = id.as_str() {
                    product_ids.insert(pid.to_string());
                }
            }
        }
    }
    for pid in &product_ids {
        if let Some(product) = store.get("product", pid) {
            groups.products.push(product);
        }
    }

    Ok(RelatedWalk {
        seed_id: seed_id.to_string(),
        seed_type: seed_type.to_string(),
        groups,
    })
}

/// Extracts `lineItems[].productId` references. Line items may be stored as
/// a JSON array or as a serialized JSON string (legacy SQL rows).
fn collect_line_item_products(order: &Entity, out: &mut BTreeSet<String>) {
    let parsed;
    let items = match order.get("lineItems") {
        Some(Value::Array(items)) => items,
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => {
                parsed = items;
                &parsed
            }
            _ => return,
        },
        _ => return,
    };
    for item in items {
        if let Some(pid) = item.get("productId").and_then(Value::as_str) {
            out.insert(pid.to_string());
        }
    }
}
