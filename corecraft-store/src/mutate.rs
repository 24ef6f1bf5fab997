//! Generic in-place mutators.
//!
//! Entities are updated field by field, never replaced wholesale. Both
//! mutators refresh `updatedAt` only when the entity already carries one —
//! types without that convention (payments) must not have it introduced.

use corecraft_model::{schema, Entity};
use corecraft_types::Error;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::Store;

/// Outcome of a single-field update.
#[derive(Debug, Clone, Serialize)]
pub struct FieldUpdate {
    pub old_value: Value,
    pub new_value: Value,
    /// Non-fatal schema-mismatch warning; the write still happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
    pub entity: Entity,
}

/// Sets one field on one entity, returning the displaced value.
///
/// Setting a field outside the type's conventional schema is allowed — the
/// store is schema-less — but surfaces an advisory so harnesses can flag
/// drift.
///
/// # Errors
/// [`Error::NotFound`] when the ID is absent from the table.
pub fn set_field(
    store: &mut Store,
    table_key: &str,
    id: &str,
    field: &str,
    value: Value,
) -> Result<FieldUpdate, Error> {
    let now = store.now();
    let Some(fields) = store.entity_mut(table_key, id) else {
        return Err(Error::NotFound(format!("{table_key} {id}")));
    };

    let advisory = if schema::is_known_field(table_key, field) {
        None
    } else {
        warn!(table = table_key, field, "write targets a field outside the conventional schema");
        Some(format!(
            "field '{field}' is not part of the conventional {table_key} schema"
        ))
    };

    let old_value = fields.insert(field.to_string(), value.clone()).unwrap_or(Value::Null);
    if field != "updatedAt" && fields.contains_key("updatedAt") {
        fields.insert("updatedAt".to_string(), Value::String(now));
    }

    Ok(FieldUpdate {
        old_value,
        new_value: value,
        advisory,
        entity: Entity::from(fields.clone()),
    })
}

/// One per-ID verdict from a bulk status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub id: String,
    pub old_status: Value,
    pub new_status: String,
}

/// Report-oriented result of a bulk status change: every ID is processed
/// independently, nothing is all-or-nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub updated: Vec<StatusChange>,
    pub not_found: Vec<String>,
    pub errors: Vec<Value>,
}

impl BulkReport {
    /// Overall success: at least one ID was updated.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.updated.is_empty()
    }

    /// The count summary attached to bulk-update payloads.
    #[must_use]
    pub fn summary(&self, total: usize) -> Value {
        json!({
            "total": total,
            "updated": self.updated.len(),
            "not_found": self.not_found.len(),
            "errors": self.errors.len(),
        })
    }
}

/// Applies a status to every listed entity, independently.
///
/// Status transitions also stamp the matching lifecycle timestamp when it
/// is not already set: tickets gain `resolvedAt` on resolved/closed,
/// payments `completedAt`/`failedAt`, shipments `deliveredAt`. Those stamps
/// are part of the registered schema for their types, so no advisory fires.
#[must_use]
pub fn bulk_set_status(
    store: &mut Store,
    table_key: &str,
    ids: &[String],
    status: &str,
) -> BulkReport {
    let now = store.now();
    store.normalize_table(table_key);
    let mut report = BulkReport::default();

    for id in ids {
        if !store.contains(table_key, id) {
            report.not_found.push(id.clone());
            continue;
        }
        let Some(fields) = store.entity_mut(table_key, id) else {
            report
                .errors
                .push(json!({"id": id, "error": "Invalid entity format"}));
            continue;
        };

        let old_status = fields
            .insert("status".to_string(), Value::String(status.to_string()))
            .unwrap_or(Value::Null);
        if fields.contains_key("updatedAt") {
            fields.insert("updatedAt".to_string(), Value::String(now.clone()));
        }
        stamp_lifecycle(fields, table_key, status, &now);

        report.updated.push(StatusChange {
            id: id.clone(),
            old_status,
            new_status: status.to_string(),
        });
    }
    report
}

fn stamp_lifecycle(
    fields: &mut serde_json::Map<String, Value>,
    table_key: &str,
    status: &str,
    now: &str,
) {
    let stamp = match (table_key, status) {
        ("support_ticket", "resolved" | "closed") => Some("resolvedAt"),
        ("payment", "completed") => Some("completedAt"),
        ("payment", "failed") => Some("failedAt"),
        ("shipment", "delivered") => Some("deliveredAt"),
        _ => None,
    };
    if let Some(field) = stamp {
        let unset = matches!(fields.get(field), None | Some(Value::Null));
        if unset {
            fields.insert(field.to_string(), Value::String(now.to_string()));
        }
    }
}
