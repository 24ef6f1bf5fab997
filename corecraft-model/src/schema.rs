//! Conventional field registry.
//!
//! The store has no fixed schema, so this registry is advisory: mutators
//! consult it to surface a non-fatal warning when a write targets a field
//! outside the type's conventional set. Lifecycle stamps (`resolvedAt`,
//! `completedAt`, `failedAt`, `deliveredAt`) are registered for the types
//! whose status transitions set them, so those writes do not advise.

/// The conventional field set for a canonical table, or `None` for an
/// unregistered key.
#[must_use]
pub fn fields(canonical: &str) -> Option<&'static [&'static str]> {
    let set: &'static [&'static str] = match canonical {
        "customer" => &[
            "id", "type", "name", "email", "phone", "loyaltyTier", "addresses",
            "createdAt", "updatedAt",
        ],
        "order" => &[
            "id", "type", "customerId", "buildId", "orderNumber", "lineItems",
            "status", "total", "currency", "createdAt", "updatedAt",
        ],
        "support_ticket" => &[
            "id", "type", "customerId", "orderId", "assignedEmployeeId",
            "subject", "body", "status", "priority", "ticketType", "createdAt",
            "updatedAt", "resolvedAt",
        ],
        "payment" => &[
            "id", "type", "orderId", "amount", "currency", "method", "status",
            "createdAt", "completedAt", "failedAt",
        ],
        "shipment" => &[
            "id", "type", "orderId", "carrier", "trackingNumber", "status",
            "createdAt", "updatedAt", "deliveredAt",
        ],
        "product" => &[
            "id", "type", "name", "category", "price", "currency", "stock",
            "specs", "createdAt", "updatedAt",
        ],
        "build" => &[
            "id", "type", "name", "customerId", "productIds", "createdAt",
            "updatedAt",
        ],
        "employee" => &["id", "type", "name", "email", "role", "team", "createdAt"],
        "refund" => &[
            "id", "type", "paymentId", "amount", "currency", "reason", "notes",
            "status", "lines", "createdAt", "processedAt",
        ],
        "escalation" => &[
            "id", "type", "ticketId", "escalationType", "destination", "notes",
            "createdAt", "resolvedAt",
        ],
        "resolution" => &[
            "id", "type", "ticketId", "outcome", "linkedRefundId",
            "resolvedById", "notes", "createdAt",
        ],
        "knowledge_base_article" => &["id", "type", "title", "body", "tags", "createdAt", "updatedAt"],
        "slack_channel" => &["id", "type", "name", "topic", "createdAt"],
        "slack_message" => &["id", "type", "channelId", "authorId", "text", "createdAt"],
        _ => return None,
    };
    Some(set)
}

/// Whether `field` belongs to the conventional set of `canonical`.
///
/// Unregistered table keys report `false` for everything; the caller decides
/// whether that warrants an advisory.
#[must_use]
pub fn is_known_field(canonical: &str, field: &str) -> bool {
    fields(canonical).is_some_and(|set| set.contains(&field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CANONICAL_TYPES;

    #[test]
    fn every_canonical_type_is_registered() {
        for name in CANONICAL_TYPES {
            assert!(fields(name).is_some(), "missing registry entry: {name}");
        }
    }

    #[test]
    fn every_registered_set_carries_id() {
        for name in CANONICAL_TYPES {
            assert!(is_known_field(name, "id"));
        }
    }

    #[test]
    fn lifecycle_stamps_are_registered_fields() {
        assert!(is_known_field("support_ticket", "resolvedAt"));
        assert!(is_known_field("payment", "completedAt"));
        assert!(is_known_field("payment", "failedAt"));
        assert!(is_known_field("shipment", "deliveredAt"));
    }

    #[test]
    fn payments_have_no_updated_at_convention() {
        assert!(!is_known_field("payment", "updatedAt"));
    }

    #[test]
    fn unknown_table_knows_nothing() {
        assert!(!is_known_field("invoice", "id"));
    }
}
