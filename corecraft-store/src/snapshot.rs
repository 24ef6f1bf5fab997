//! Normalized store dump for the legacy SQL bridge.
//!
//! A subset of read tools re-execute older SQL implementations against an
//! ephemeral relational copy of the store. The core owes that collaborator a
//! complete, consistent dump of current state — one normalized row list per
//! top-level key plus the CamelCase table name its queries expect — and
//! nothing more. SQL execution and the connection handle stay with the
//! collaborator (injected explicitly, never swapped in via shared module
//! state).

use corecraft_model::Entity;
use serde::Serialize;
use serde_json::Value;

use crate::Store;

/// One table of the dump.
#[derive(Debug, Clone, Serialize)]
pub struct TableDump {
    /// The store's own key, e.g. `support_ticket`.
    pub key: String,
    /// The table name legacy SQL expects, e.g. `SupportTicket`.
    pub sql_name: String,
    pub rows: Vec<Entity>,
}

/// Dumps every top-level store key with at least one object row.
///
/// Dict-form rows missing an `id` field have their map key injected as
/// `id`, so the relational copy always has a usable key column. Scalar
/// housekeeping keys (the injected clock) carry no rows and are skipped.
#[must_use]
pub fn dump(store: &Store) -> Vec<TableDump> {
    let mut tables = Vec::new();
    for (key, value) in store.doc() {
        let rows = normalized_rows(value);
        if rows.is_empty() {
            continue;
        }
        tables.push(TableDump {
            key: key.clone(),
            sql_name: sql_table_name(key),
            rows,
        });
    }
    tables
}

fn normalized_rows(table: &Value) -> Vec<Entity> {
    match table {
        Value::Object(map) => map
            .iter()
            .filter_map(|(id, row)| {
                let mut entity = Entity::from_value(row)?;
                if !entity.contains("id") {
                    entity.set("id", Value::String(id.clone()));
                }
                Some(entity)
            })
            .collect(),
        Value::Array(rows) => rows.iter().filter_map(Entity::from_value).collect(),
        _ => Vec::new(),
    }
}

/// Maps a store key to the table name expected by legacy SQL.
///
/// Known keys use a fixed table (some, like `LinkedInProfile`, are not
/// derivable by capitalization); unknown keys fall back to CamelCasing the
/// snake_case parts.
#[must_use]
pub fn sql_table_name(key: &str) -> String {
    match key {
        "order" => "Order".to_string(),
        "payment" => "Payment".to_string(),
        "product" => "Product".to_string(),
        "customer" => "Customer".to_string(),
        "support_ticket" => "SupportTicket".to_string(),
        "shipment" => "Shipment".to_string(),
        "build" => "Build".to_string(),
        "refund" => "Refund".to_string(),
        "resolution" => "Resolution".to_string(),
        "escalation" => "Escalation".to_string(),
        "bundle" => "Bundle".to_string(),
        "compatibility_rule" => "CompatibilityRule".to_string(),
        "employee" => "Employee".to_string(),
        "knowledge_base_article" => "KnowledgeBaseArticle".to_string(),
        "linkedin_profile" => "LinkedInProfile".to_string(),
        "slack_channel" => "SlackChannel".to_string(),
        "slack_message" => "SlackMessage".to_string(),
        other => other
            .split('_')
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sql_names_cover_irregular_tables() {
        assert_eq!(sql_table_name("support_ticket"), "SupportTicket");
        assert_eq!(sql_table_name("linkedin_profile"), "LinkedInProfile");
        assert_eq!(sql_table_name("warranty_claim"), "WarrantyClaim");
    }

    #[test]
    fn dump_injects_dict_keys_as_ids() {
        let store = Store::from_value(json!({
            "customer": {"c1": {"name": "Ada"}},
            "__now": "2025-01-01T00:00:00Z",
        }))
        .unwrap();
        let tables = dump(&store);
        assert_eq!(tables.len(), 1); // clock key carries no rows
        assert_eq!(tables[0].sql_name, "Customer");
        assert_eq!(tables[0].rows[0].id(), Some("c1"));
    }

    #[test]
    fn dump_keeps_list_form_rows() {
        let store = Store::from_value(json!({
            "escalation": [{"id": "e1"}, "junk", {"id": "e2"}],
        }))
        .unwrap();
        let tables = dump(&store);
        assert_eq!(tables[0].rows.len(), 2);
    }
}
