//! Canonical table names, aliases, and legacy table-name probing.
//!
//! Two resolution paths exist, deliberately kept separate:
//!
//! - [`resolve`] — strict canonicalization for the generic tools: lower-case,
//!   alias map, membership in the canonical set, structured error otherwise.
//! - [`table_key_candidates`] — the broader legacy accommodation used by the
//!   simple per-entity lookups: probes naming-convention variants of a base
//!   name in a fixed order and treats a total miss as an empty table, not an
//!   error. The probe order is a documented, testable contract.

use corecraft_types::Error;
use serde_json::{json, Value};

/// The canonical table name set.
pub const CANONICAL_TYPES: [&str; 14] = [
    "customer",
    "order",
    "support_ticket",
    "payment",
    "shipment",
    "product",
    "build",
    "employee",
    "refund",
    "escalation",
    "resolution",
    "knowledge_base_article",
    "slack_channel",
    "slack_message",
];

/// Accepted aliases, mapped to their canonical name.
pub const ALIASES: [(&str, &str); 1] = [("ticket", "support_ticket")];

/// Resolves an entity-type name (case-insensitive, alias-aware) to its
/// canonical table key.
///
/// # Errors
/// [`Error::UnknownEntityType`] when the name is neither an alias nor a
/// canonical type. Pair with [`invalid_entity_type_payload`] to report the
/// valid set to the caller.
pub fn resolve(entity_type: &str) -> Result<&'static str, Error> {
    let lower = entity_type.to_lowercase();
    for (alias, target) in ALIASES {
        if lower == alias {
            return Ok(target);
        }
    }
    for canonical in CANONICAL_TYPES {
        if lower == canonical {
            return Ok(canonical);
        }
    }
    Err(Error::UnknownEntityType(entity_type.to_string()))
}

/// The structured payload for an unknown entity type: the provided name,
/// the sorted valid-type list, and the alias map.
#[must_use]
pub fn invalid_entity_type_payload(provided: &str) -> Value {
    let mut valid: Vec<&str> = CANONICAL_TYPES.to_vec();
    valid.sort_unstable();
    let aliases: serde_json::Map<String, Value> = ALIASES
        .iter()
        .map(|(a, t)| ((*a).to_string(), json!(t)))
        .collect();
    json!({
        "error": format!("Unknown entity type: '{provided}'"),
        "provided_type": provided,
        "valid_types": valid,
        "aliases": aliases,
    })
}

/// Ordered table-key variants probed by the legacy broad lookup.
///
/// For a base name, in this exact order: exact key, lower-cased key,
/// capitalized key, pluralized key (`+s`, or `y→ies`), capitalized
/// pluralized key, camelCase→snake_case transliteration. Duplicate
/// candidates are dropped while preserving first occurrence.
#[must_use]
pub fn table_key_candidates(base: &str) -> Vec<String> {
    let lower = base.to_lowercase();
    let capitalized = capitalize(base);
    let plural = pluralize(base);
    let capitalized_plural = capitalize(&plural);
    let snake = camel_to_snake(base);

    let mut candidates = Vec::with_capacity(6);
    for key in [
        base.to_string(),
        lower,
        capitalized,
        plural,
        capitalized_plural,
        snake,
    ] {
        if !candidates.contains(&key) {
            candidates.push(key);
        }
    }
    candidates
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn pluralize(s: &str) -> String {
    if let Some(stem) = s.strip_suffix('y') {
        format!("{stem}ies")
    } else {
        format!("{s}s")
    }
}

/// camelCase → snake_case: an underscore is inserted before each internal
/// uppercase letter and the whole string is lower-cased.
#[must_use]
pub fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        for lower in c.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resolves_before_canonical_set() {
        assert_eq!(resolve("ticket").unwrap(), "support_ticket");
        assert_eq!(resolve("TICKET").unwrap(), "support_ticket");
    }

    #[test]
    fn canonical_names_resolve_to_themselves() {
        for name in CANONICAL_TYPES {
            assert_eq!(resolve(name).unwrap(), name);
        }
    }

    #[test]
    fn unknown_type_is_a_structured_error() {
        let err = resolve("invoice").unwrap_err();
        assert!(matches!(err, Error::UnknownEntityType(_)));
        let payload = invalid_entity_type_payload("invoice");
        assert_eq!(payload["provided_type"], "invoice");
        assert!(payload["valid_types"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("support_ticket")));
        assert_eq!(payload["aliases"]["ticket"], "support_ticket");
    }

    #[test]
    fn candidate_order_is_the_documented_contract() {
        assert_eq!(
            table_key_candidates("supportTicket"),
            vec![
                "supportTicket",
                "supportticket",
                "SupportTicket",
                "supportTickets",
                "SupportTickets",
                "support_ticket",
            ]
        );
    }

    #[test]
    fn y_pluralizes_to_ies() {
        let candidates = table_key_candidates("category");
        assert!(candidates.contains(&"categories".to_string()));
    }

    #[test]
    fn camel_to_snake_handles_multiple_humps() {
        assert_eq!(camel_to_snake("knowledgeBaseArticle"), "knowledge_base_article");
        assert_eq!(camel_to_snake("order"), "order");
    }
}
