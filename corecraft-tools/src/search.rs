//! Domain search tools with validated enum filters and the two-level
//! deterministic sort contract.

use chrono::{DateTime, Utc};
use corecraft_model::Entity;
use corecraft_store::query::effective_limit;
use corecraft_store::Store;
use corecraft_types::clock::parse_iso;
use serde_json::{json, Map, Value};

use crate::{
    error_payload, optional_i64, optional_str, validate_enum, Tool, ToolDescriptor,
};

pub(crate) const TICKET_STATUSES: [&str; 5] =
    ["new", "open", "pending_customer", "resolved", "closed"];
pub(crate) const TICKET_PRIORITIES: [&str; 3] = ["low", "normal", "high"];
pub(crate) const TICKET_TYPES: [&str; 7] = [
    "return",
    "troubleshooting",
    "recommendation",
    "order_issue",
    "shipping",
    "billing",
    "other",
];
pub(crate) const LOYALTY_TIERS: [&str; 4] = ["none", "silver", "gold", "platinum"];

/// Parses a date filter argument. A present-but-unparseable value is a
/// caller mistake and comes back as a structured validation error rather
/// than silently matching everything.
fn parse_date_arg(
    args: &Map<String, Value>,
    name: &str,
) -> Result<Option<DateTime<Utc>>, Value> {
    match optional_str(args, name) {
        None => Ok(None),
        Some(raw) => parse_iso(raw).map(Some).ok_or_else(|| {
            error_payload(format!("invalid {name} '{raw}'; expected ISO 8601 datetime"))
        }),
    }
}

/// Entity date fields stay permissive: missing or unparseable values pass
/// every range check, matching how legacy fixtures with sparse timestamps
/// behave.
fn date_in_range(
    entity: &Entity,
    field: &str,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> bool {
    let Some(value) = entity.get_str(field).and_then(parse_iso) else {
        return true;
    };
    if after.is_some_and(|a| value < a) {
        return false;
    }
    !before.is_some_and(|b| value > b)
}

fn text_in_fields(entity: &Entity, fields: &[&str], text: &str) -> bool {
    let needle = text.to_lowercase();
    fields
        .iter()
        .any(|f| entity.get_str(f).is_some_and(|v| v.to_lowercase().contains(&needle)))
}

/// Optional exact-match string filter.
fn eq_filter(entity: &Entity, field: &str, wanted: Option<&str>) -> bool {
    wanted.map_or(true, |w| entity.get_str(field) == Some(w))
}

// ── search_tickets ───────────────────────────────────────────────

/// Filtered support-ticket search with a priority-first deterministic sort.
pub struct SearchTickets;

impl SearchTickets {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let status = optional_str(args, "status");
        let priority = optional_str(args, "priority");
        let ticket_type = optional_str(args, "ticket_type");
        validate_enum(status, &TICKET_STATUSES, "status")?;
        validate_enum(priority, &TICKET_PRIORITIES, "priority")?;
        validate_enum(ticket_type, &TICKET_TYPES, "ticket_type")?;

        let ticket_id = optional_str(args, "ticket_id");
        let customer_id = optional_str(args, "customer_id");
        let assigned_employee_id = optional_str(args, "assigned_employee_id");
        let text = optional_str(args, "text");
        let created_after = parse_date_arg(args, "created_after")?;
        let created_before = parse_date_arg(args, "created_before")?;
        let resolved_after = parse_date_arg(args, "resolved_after")?;
        let resolved_before = parse_date_arg(args, "resolved_before")?;

        let mut results: Vec<Entity> = store
            .entities_by_probe("support_ticket")
            .into_iter()
            .filter(|t| eq_filter(t, "id", ticket_id))
            .filter(|t| eq_filter(t, "customerId", customer_id))
            .filter(|t| eq_filter(t, "assignedEmployeeId", assigned_employee_id))
            .filter(|t| eq_filter(t, "status", status))
            .filter(|t| eq_filter(t, "priority", priority))
            .filter(|t| eq_filter(t, "ticketType", ticket_type))
            .filter(|t| text.map_or(true, |needle| text_in_fields(t, &["subject", "body"], needle)))
            .filter(|t| date_in_range(t, "createdAt", created_after, created_before))
            // Resolution range checks go against updatedAt: closing a ticket
            // is the last write it sees.
            .filter(|t| date_in_range(t, "updatedAt", resolved_after, resolved_before))
            .collect();

        results.sort_by(|a, b| {
            priority_rank(a)
                .cmp(&priority_rank(b))
                .then_with(|| created_at(b).cmp(&created_at(a)))
                .then_with(|| a.id().unwrap_or("").cmp(b.id().unwrap_or("")))
        });
        results.truncate(effective_limit(optional_i64(args, "limit")));

        let rows: Vec<Value> = results.into_iter().map(Entity::into_value).collect();
        Ok(Value::Array(rows))
    }
}

fn priority_rank(ticket: &Entity) -> u8 {
    match ticket.get_str("priority").unwrap_or("normal") {
        "high" => 1,
        "normal" => 2,
        "low" => 3,
        _ => 4,
    }
}

fn created_at<'a>(ticket: &'a Entity) -> &'a str {
    ticket.get_str("createdAt").unwrap_or("")
}

impl Tool for SearchTickets {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "search_tickets",
            description: "Search for support tickets with various filters. Returns an array of \
                          support ticket records matching the criteria, sorted by priority (high \
                          to low) and then by creation date (newest first).",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "ticket_id": {"type": "string", "description": "Specific ticket ID to find."},
                    "customer_id": {"type": "string", "description": "Customer ID to filter by."},
                    "assigned_employee_id": {"type": "string", "description": "Employee ID to filter by."},
                    "status": {
                        "type": "string",
                        "enum": TICKET_STATUSES,
                        "description": "Ticket status to filter by.",
                    },
                    "priority": {
                        "type": "string",
                        "enum": TICKET_PRIORITIES,
                        "description": "Ticket priority to filter by.",
                    },
                    "ticket_type": {
                        "type": "string",
                        "enum": TICKET_TYPES,
                        "description": "Ticket type to filter by.",
                    },
                    "text": {
                        "type": "string",
                        "description": "Text to search in subject and body (case insensitive).",
                    },
                    "created_after": {
                        "type": "string",
                        "description": "Filter tickets created after this date (ISO 8601, e.g. \"2025-08-01T00:00:00Z\").",
                    },
                    "created_before": {
                        "type": "string",
                        "description": "Filter tickets created before this date (ISO 8601).",
                    },
                    "resolved_after": {
                        "type": "string",
                        "description": "Filter tickets resolved after this date (ISO 8601).",
                    },
                    "resolved_before": {
                        "type": "string",
                        "description": "Filter tickets resolved before this date (ISO 8601).",
                    },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of results (default 50, max 200).",
                    },
                },
            }),
            required_params: vec![],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── search_customers ─────────────────────────────────────────────

/// Filtered customer search sorted by name then ID.
pub struct SearchCustomers;

impl SearchCustomers {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let loyalty_tier = optional_str(args, "loyalty_tier");
        validate_enum(loyalty_tier, &LOYALTY_TIERS, "loyalty_tier")?;

        let customer_id = optional_str(args, "customer_id");
        let name = optional_str(args, "name");
        let email = optional_str(args, "email");
        let phone = optional_str(args, "phone");
        let address_text = optional_str(args, "address_text");
        let created_after = parse_date_arg(args, "created_after")?;
        let created_before = parse_date_arg(args, "created_before")?;

        let mut results: Vec<Entity> = store
            .entities_by_probe("customer")
            .into_iter()
            .filter(|c| eq_filter(c, "id", customer_id))
            .filter(|c| eq_filter(c, "email", email))
            .filter(|c| eq_filter(c, "phone", phone))
            .filter(|c| eq_filter(c, "loyaltyTier", loyalty_tier))
            .filter(|c| {
                name.map_or(true, |needle| {
                    c.get_str("name")
                        .is_some_and(|n| n.to_lowercase().contains(&needle.to_lowercase()))
                })
            })
            .filter(|c| address_text.map_or(true, |needle| address_matches(c, needle)))
            .filter(|c| date_in_range(c, "createdAt", created_after, created_before))
            .map(parse_addresses)
            .collect();

        results.sort_by(|a, b| {
            a.get_str("name")
                .unwrap_or("")
                .cmp(b.get_str("name").unwrap_or(""))
                .then_with(|| a.id().unwrap_or("").cmp(b.id().unwrap_or("")))
        });
        results.truncate(effective_limit(optional_i64(args, "limit")));

        let rows: Vec<Value> = results.into_iter().map(Entity::into_value).collect();
        Ok(Value::Array(rows))
    }
}

/// Address search covers the field however it is stored: a structured value
/// is serialized to JSON text and searched, a JSON string is searched as-is.
fn address_matches(customer: &Entity, text: &str) -> bool {
    let needle = text.to_lowercase();
    match customer.get("addresses") {
        Some(Value::String(raw)) => raw.to_lowercase().contains(&needle),
        Some(other) => other.to_string().to_lowercase().contains(&needle),
        None => false,
    }
}

/// Legacy fixtures sometimes store `addresses` as a JSON string; decode it
/// for the result payload so callers always see structured data.
fn parse_addresses(mut customer: Entity) -> Entity {
    let parsed = match customer.get("addresses") {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
        _ => None,
    };
    if let Some(parsed) = parsed {
        customer.set("addresses", parsed);
    }
    customer
}

impl Tool for SearchCustomers {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "search_customers",
            description: "Search for customers with various filters. Returns an array of customer \
                          records matching the criteria.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "customer_id": {"type": "string", "description": "Exact customer ID match."},
                    "name": {"type": "string", "description": "Partial name search (case insensitive)."},
                    "email": {"type": "string", "description": "Exact email address match."},
                    "phone": {"type": "string", "description": "Exact phone number match."},
                    "loyalty_tier": {
                        "type": "string",
                        "enum": LOYALTY_TIERS,
                        "description": "Customer loyalty tier to filter by.",
                    },
                    "address_text": {
                        "type": "string",
                        "description": "Text search across all address fields (city, region, postal code, street address, etc.).",
                    },
                    "created_after": {
                        "type": "string",
                        "description": "Filter customers created after this date (ISO 8601).",
                    },
                    "created_before": {
                        "type": "string",
                        "description": "Filter customers created before this date (ISO 8601).",
                    },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of results (default 50, max 200).",
                    },
                },
            }),
            required_params: vec![],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}
