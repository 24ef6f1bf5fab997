//! The generic tools: the handlers that work over any entity type by
//! delegating to the canonicalizer, query engine, walker, aggregator, and
//! mutators.

use corecraft_model::{canonical, schema};
use corecraft_store::mutate::{bulk_set_status, set_field};
use corecraft_store::query::query;
use corecraft_store::related::{related, RelatedGroups};
use corecraft_store::{aggregate, Store};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

use crate::{
    engine_error_payload, error_payload, optional_i64, optional_object, require_str,
    require_str_vec, Tool, ToolDescriptor,
};

fn entity_type_schema() -> Value {
    json!({
        "type": "string",
        "description": "Type of entity.",
        "enum": canonical::CANONICAL_TYPES,
    })
}

// ── query_by_criteria ────────────────────────────────────────────

/// Flexible filter query over any entity type.
pub struct QueryByCriteria;

impl QueryByCriteria {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let entity_type = require_str(args, "entity_type")?;
        let table_key = canonical::resolve(entity_type).map_err(|e| engine_error_payload(&e))?;
        let empty = Map::new();
        let filters = optional_object(args, "filters")?.unwrap_or(&empty);
        let limit = optional_i64(args, "limit");

        let results: Vec<Value> = query(store, table_key, filters, &[], limit)
            .into_iter()
            .map(corecraft_model::Entity::into_value)
            .collect();
        let count = results.len();
        Ok(json!({"results": results, "count": count}))
    }
}

impl Tool for QueryByCriteria {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_by_criteria",
            description: "Flexible query tool to search any entity type with complex filters. \
                          Supports exact match, ranges ($gte, $lte, $gt, $lt), inequality ($ne), \
                          inclusion ($in), and text search ($contains).",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": entity_type_schema(),
                    "filters": {
                        "type": "object",
                        "description": "Filter criteria as key-value pairs. Scalars match exactly, \
                                        lists mean 'in', operator objects support $gte/$lte/$gt/$lt/$ne/$in/$contains.",
                    },
                    "limit": {"type": "integer", "description": "Maximum number of results to return."},
                },
            }),
            required_params: vec!["entity_type"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── find_related_entities ────────────────────────────────────────

/// Foreign-key closure from any seed entity ID.
pub struct FindRelatedEntities;

impl FindRelatedEntities {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let entity_id = require_str(args, "entity_id")?;
        match related(store, entity_id) {
            Ok(walk) => {
                let summary = walk.groups.summary();
                Ok(json!({
                    "source_entity_id": walk.seed_id,
                    "source_entity_type": walk.seed_type,
                    "results": walk.groups,
                    "summary": summary,
                }))
            }
            // Unknown seed still ships the all-empty grouped structure so
            // callers never special-case a missing results field.
            Err(err) => {
                let empty = RelatedGroups::default();
                let summary = empty.summary();
                Ok(json!({
                    "error": err.to_string(),
                    "results": empty,
                    "summary": summary,
                }))
            }
        }
    }
}

impl Tool for FindRelatedEntities {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "find_related_entities",
            description: "Given any entity ID, traverse relationships to find all connected \
                          entities (customers, orders, tickets, payments, shipments, refunds, \
                          escalations, resolutions, products).",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "entity_id": {
                        "type": "string",
                        "description": "ID of any entity (customer, order, ticket, payment, product, etc.).",
                    },
                },
            }),
            required_params: vec!["entity_id"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── aggregate_by_field ───────────────────────────────────────────

/// Group-by aggregation over any entity type.
pub struct AggregateByField;

impl AggregateByField {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let entity_type = require_str(args, "entity_type")?;
        let table_key = canonical::resolve(entity_type).map_err(|e| engine_error_payload(&e))?;
        let group_by = require_str(args, "group_by_field")?;
        let sum_field = crate::optional_str(args, "sum_field");

        let aggregations = aggregate::aggregate(store, table_key, group_by, sum_field);
        let total: usize = aggregations.values().map(|s| s.count).sum();
        let unique = aggregations.len();
        Ok(json!({
            "entity_type": entity_type,
            "grouped_by": group_by,
            "aggregations": aggregations,
            "total_entities": total,
            "unique_groups": unique,
        }))
    }
}

impl Tool for AggregateByField {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "aggregate_by_field",
            description: "Group entities by a field value and count them. Optionally \
                          sum/average/min/max another numeric field.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": entity_type_schema(),
                    "group_by_field": {
                        "type": "string",
                        "description": "Field name to group by (e.g., 'status', 'priority', 'loyaltyTier').",
                    },
                    "sum_field": {
                        "type": "string",
                        "description": "Optional numeric field to sum/average (e.g., 'amount', 'total').",
                    },
                },
            }),
            required_params: vec!["entity_type", "group_by_field"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── get_entity_field ─────────────────────────────────────────────

/// Reads specific field(s) from any entity.
pub struct GetEntityField;

impl GetEntityField {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let entity_type = require_str(args, "entity_type")?;
        let table_key = canonical::resolve(entity_type).map_err(|e| engine_error_payload(&e))?;
        let entity_id = require_str(args, "entity_id")?;
        let entity = store
            .get(table_key, entity_id)
            .ok_or_else(|| error_payload(format!("{entity_type} {entity_id} not found")))?;

        let fields = match args.get("fields") {
            Some(Value::Array(_)) => {
                let names = require_str_vec(args, "fields")?;
                let mut picked = Map::new();
                for name in names {
                    picked.insert(
                        name.clone(),
                        entity.get(&name).cloned().unwrap_or(Value::Null),
                    );
                }
                Value::Object(picked)
            }
            _ => entity.to_value(),
        };
        Ok(json!({
            "entity_id": entity_id,
            "entity_type": entity_type,
            "fields": fields,
        }))
    }
}

impl Tool for GetEntityField {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_entity_field",
            description: "Get specific field(s) from any entity type. Returns just the requested \
                          field values. If no fields specified, returns the entire entity.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": entity_type_schema(),
                    "entity_id": {"type": "string", "description": "ID of the entity."},
                    "fields": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Field names to retrieve. If omitted, returns all fields.",
                    },
                },
            }),
            required_params: vec!["entity_type", "entity_id"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── update_entity_field ──────────────────────────────────────────

/// Generic single-field updater.
pub struct UpdateEntityField;

impl UpdateEntityField {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let entity_type = require_str(args, "entity_type")?;
        let table_key = canonical::resolve(entity_type).map_err(|e| engine_error_payload(&e))?;
        let entity_id = require_str(args, "entity_id")?;
        let field_name = require_str(args, "field_name")?;
        let field_value = args
            .get("field_value")
            .cloned()
            .ok_or_else(|| error_payload("missing required parameter: field_value"))?;

        let update = set_field(store, table_key, entity_id, field_name, field_value)
            .map_err(|e| engine_error_payload(&e))?;
        let mut payload = json!({
            "success": true,
            "entity_type": entity_type,
            "entity_id": entity_id,
            "field_name": field_name,
            "old_value": update.old_value,
            "new_value": update.new_value,
            "updated_entity": update.entity,
        });
        if let Some(advisory) = update.advisory {
            payload["schema_advisory"] = json!(advisory);
        }
        Ok(payload)
    }
}

impl Tool for UpdateEntityField {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "update_entity_field",
            description: "Generic field updater: update any single field on any entity type. \
                          More granular than entity-specific update tools.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": entity_type_schema(),
                    "entity_id": {"type": "string", "description": "ID of the entity to update."},
                    "field_name": {
                        "type": "string",
                        "description": "Name of the field to update (e.g., 'status', 'priority', 'amount').",
                    },
                    "field_value": {
                        "description": "New value for the field (string, number, boolean, object, or array).",
                    },
                },
            }),
            required_params: vec!["entity_type", "entity_id", "field_name", "field_value"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── bulk_status_update ───────────────────────────────────────────

/// Entity types accepted by the bulk status mutator.
const BULK_TYPES: [&str; 4] = ["order", "support_ticket", "payment", "shipment"];

/// Independent per-ID status changes with a report payload.
pub struct BulkStatusUpdate;

impl BulkStatusUpdate {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let entity_type = require_str(args, "entity_type")?;
        let table_key = canonical::resolve(entity_type).map_err(|e| engine_error_payload(&e))?;
        if !BULK_TYPES.contains(&table_key) {
            return Err(error_payload(format!(
                "bulk status update does not support entity type '{entity_type}'"
            )));
        }
        let entity_ids = require_str_vec(args, "entity_ids")?;
        let status = require_str(args, "status")?;

        let report = bulk_set_status(store, table_key, &entity_ids, status);
        let success = report.success();
        let summary = report.summary(entity_ids.len());
        Ok(json!({
            "success": success,
            "entity_type": entity_type,
            "status": status,
            "results": report,
            "summary": summary,
        }))
    }
}

impl Tool for BulkStatusUpdate {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "bulk_status_update",
            description: "Bulk update status for multiple entities (orders, tickets, payments, \
                          shipments) at once. Each ID is processed independently.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": {
                        "type": "string",
                        "description": "Type of entity: order, ticket, payment, or shipment.",
                    },
                    "entity_ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "List of entity IDs to update.",
                    },
                    "status": {"type": "string", "description": "New status to set for all entities."},
                },
            }),
            required_params: vec!["entity_type", "entity_ids", "status"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── get_entity_schema ────────────────────────────────────────────

/// Observed-schema introspection for an entity type.
pub struct GetEntitySchema;

impl GetEntitySchema {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let entity_type = require_str(args, "entity_type")?;
        let table_key = canonical::resolve(entity_type).map_err(|e| engine_error_payload(&e))?;

        let entities = store.entities(table_key);
        let mut all_fields: BTreeSet<String> = BTreeSet::new();
        for entity in &entities {
            all_fields.extend(entity.fields().keys().cloned());
        }

        let mut system = Vec::new();
        let mut timestamps = Vec::new();
        let mut references = Vec::new();
        let mut data = Vec::new();
        for field in &all_fields {
            if field == "id" || field == "type" {
                system.push(field.clone());
            } else if field.ends_with("At") {
                timestamps.push(field.clone());
            } else if field.ends_with("Id") {
                references.push(field.clone());
            } else {
                data.push(field.clone());
            }
        }

        // Field types are sampled from the first entity, like the legacy
        // introspector.
        let mut field_types = Map::new();
        if let Some(sample) = entities.first() {
            for field in &all_fields {
                let ty = match sample.get(field) {
                    None | Some(Value::Null) => "null",
                    Some(Value::Bool(_)) => "boolean",
                    Some(Value::Number(n)) if n.is_i64() || n.is_u64() => "integer",
                    Some(Value::Number(_)) => "number",
                    Some(Value::String(_)) => "string",
                    Some(Value::Array(_)) => "array",
                    Some(Value::Object(_)) => "object",
                };
                field_types.insert(field.clone(), json!(ty));
            }
        }

        let total_entities = entities.len();
        let field_count = all_fields.len();
        Ok(json!({
            "entity_type": entity_type,
            "data_key": table_key,
            "total_entities": total_entities,
            "fields": {
                "all": all_fields,
                "system": system,
                "timestamps": timestamps,
                "references": references,
                "data": data,
            },
            "field_types": field_types,
            "field_count": field_count,
            "conventional_fields": schema::fields(table_key),
        }))
    }
}

impl Tool for GetEntitySchema {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_entity_schema",
            description: "Get the schema (all field names and types) for a given entity type by \
                          examining existing entities. Fields are categorized as system (id, type), \
                          timestamps (*At), references (*Id), and data fields. Use before \
                          update_entity_field to discover valid field names.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": entity_type_schema(),
                },
            }),
            required_params: vec!["entity_type"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── lookup_by_reference ──────────────────────────────────────────

/// Cross-type lookup by email, phone, order number, name, or ID.
pub struct LookupByReference;

impl LookupByReference {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let reference = require_str(args, "reference")?;
        let needle = reference.to_lowercase();

        let mut customers = Vec::new();
        for customer in store.entities("customer") {
            let hit = contains_ci(&customer, "email", &needle)
                || contains_ci(&customer, "phone", &needle)
                || contains_ci(&customer, "name", &needle)
                || customer.id() == Some(reference);
            if hit {
                customers.push(customer.into_value());
            }
        }

        let mut orders = Vec::new();
        for order in store.entities("order") {
            let number = order
                .get("orderNumber")
                .map(value_as_search_text)
                .unwrap_or_default();
            let hit = order
                .id()
                .is_some_and(|id| id.to_lowercase().contains(&needle))
                || number.to_lowercase().contains(&needle);
            if hit {
                orders.push(order.into_value());
            }
        }

        let mut tickets = Vec::new();
        for ticket in store.entities("support_ticket") {
            let hit = ticket
                .id()
                .is_some_and(|id| id.to_lowercase().contains(&needle))
                || contains_ci(&ticket, "subject", &needle);
            if hit {
                tickets.push(ticket.into_value());
            }
        }

        let mut employees = Vec::new();
        for employee in store.entities("employee") {
            let hit = contains_ci(&employee, "email", &needle)
                || contains_ci(&employee, "name", &needle)
                || employee.id() == Some(reference);
            if hit {
                employees.push(employee.into_value());
            }
        }

        let total = customers.len() + orders.len() + tickets.len() + employees.len();
        Ok(json!({
            "results": {
                "customers": customers,
                "orders": orders,
                "tickets": tickets,
                "employees": employees,
            },
            "total_count": total,
            "query": reference,
        }))
    }
}

fn contains_ci(entity: &corecraft_model::Entity, field: &str, needle_lower: &str) -> bool {
    entity
        .get_str(field)
        .is_some_and(|v| v.to_lowercase().contains(needle_lower))
}

fn value_as_search_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Tool for LookupByReference {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "lookup_by_reference",
            description: "Search across multiple entity types using a reference identifier \
                          (email, phone number, order number, name, ID, etc.).",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "reference": {
                        "type": "string",
                        "description": "Reference identifier to search for.",
                    },
                },
            }),
            required_params: vec!["reference"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}
