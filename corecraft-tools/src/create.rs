//! Entity creation tools.
//!
//! Every creator derives its row ID deterministically from the canonicalized
//! arguments (see [`corecraft_types::ids`]), so repeating a call with the
//! same inputs lands on the same row instead of minting a duplicate. When
//! the derived ID already exists, the stored row comes back unchanged.

use corecraft_model::Entity;
use corecraft_store::Store;
use corecraft_types::ids::{canonical_set, deterministic_id};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::{
    error_payload, optional_str, require_f64, require_str, require_str_vec, validate_enum, Tool,
    ToolDescriptor,
};

const ORDER_STATUSES: [&str; 8] = [
    "pending",
    "paid",
    "fulfilled",
    "cancelled",
    "backorder",
    "refunded",
    "partially_refunded",
    "refund_requested",
];

/// Stable text form of a monetary amount for ID derivation.
fn amount_key(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.1}")
    } else {
        format!("{amount}")
    }
}

/// Returns the existing row when a derived ID is already present, making the
/// second identical creation call a no-op read.
fn existing_row(store: &Store, table: &str, id: &str) -> Option<Value> {
    store.get(table, id).map(Entity::into_value)
}

// ── create_build ─────────────────────────────────────────────────

/// Saves a named PC build configuration for a customer.
pub struct CreateBuild;

impl CreateBuild {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let name = require_str(args, "name")?;
        let customer_id = require_str(args, "customer_id")?;
        let product_ids = require_str_vec(args, "product_ids")?;

        if !store.contains("customer", customer_id) {
            return Err(error_payload(format!("Customer {customer_id} not found")));
        }
        for product_id in &product_ids {
            if !store.contains("product", product_id) {
                return Err(error_payload(format!("Product {product_id} not found")));
            }
        }

        let mut sorted_ids = product_ids;
        sorted_ids.sort_unstable();
        let build_id = deterministic_id(
            "build_",
            &[name, customer_id, &canonical_set(&sorted_ids)],
        );
        if let Some(row) = existing_row(store, "build", &build_id) {
            return Ok(row);
        }

        let now = store.now();
        let row = json!({
            "id": build_id,
            "name": name,
            "customerId": customer_id,
            "productIds": sorted_ids,
            "createdAt": now,
            "updatedAt": now,
        });
        store.upsert("build", &build_id, Entity::from_value(&row).unwrap_or_default());
        debug!(id = %build_id, customer = customer_id, "created build");
        Ok(row)
    }
}

impl Tool for CreateBuild {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "create_build",
            description: "Create a new PC build configuration for a customer. A build is a saved \
                          collection of compatible PC components.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name for the build configuration (e.g., 'Gaming PC', 'Workstation Build').",
                    },
                    "customer_id": {"type": "string", "description": "Customer ID who owns this build."},
                    "product_ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "List of product IDs to include in the build.",
                    },
                },
            }),
            required_params: vec!["name", "customer_id", "product_ids"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── create_order ─────────────────────────────────────────────────

/// Places an order of line items for a customer.
pub struct CreateOrder;

impl CreateOrder {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let customer_id = require_str(args, "customer_id")?;
        let status = optional_str(args, "status").unwrap_or("pending");
        validate_enum(Some(status), &ORDER_STATUSES, "status")?;
        let build_id = optional_str(args, "build_id");

        if !store.contains("customer", customer_id) {
            return Err(error_payload(format!("Customer {customer_id} not found")));
        }

        let items = match args.get("line_items") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            Some(Value::Array(_)) => {
                return Err(error_payload("Order must have at least one line item"))
            }
            Some(_) => return Err(error_payload("line_items must be an array of objects")),
            None => return Err(error_payload("missing required parameter: line_items")),
        };

        // Accept both productId/product_id and qty/quantity spellings, then
        // normalize before persisting.
        let mut normalized: Vec<(String, i64)> = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item = item
                .as_object()
                .ok_or_else(|| error_payload(format!("Line item {i} must be an object")))?;
            let product_id = item
                .get("productId")
                .or_else(|| item.get("product_id"))
                .and_then(Value::as_str)
                .ok_or_else(|| error_payload(format!("Line item {i} missing productId")))?;
            let qty = item
                .get("qty")
                .or_else(|| item.get("quantity"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            if qty < 1 {
                return Err(error_payload(format!("Line item {i} must have qty >= 1")));
            }
            if !store.contains("product", product_id) {
                return Err(error_payload(format!("Products not found: {product_id}")));
            }
            normalized.push((product_id.to_string(), qty));
        }

        if let Some(build_id) = build_id {
            if !store.contains("build", build_id) {
                return Err(error_payload(format!("Build {build_id} not found")));
            }
        }

        let mut item_keys: Vec<String> = normalized
            .iter()
            .map(|(pid, qty)| format!("{pid}:{qty}"))
            .collect();
        item_keys.sort_unstable();
        let items_key = item_keys.join("|");
        let order_id = deterministic_id("ord_", &[customer_id, &items_key, status]);
        if let Some(row) = existing_row(store, "order", &order_id) {
            return Ok(row);
        }

        let line_items: Vec<Value> = normalized
            .iter()
            .map(|(pid, qty)| json!({"productId": pid, "qty": qty}))
            .collect();
        let now = store.now();
        let mut row = json!({
            "id": order_id,
            "customerId": customer_id,
            "lineItems": line_items,
            "status": status,
            "createdAt": now,
            "updatedAt": now,
        });
        if let Some(build_id) = build_id {
            row["buildId"] = json!(build_id);
        }
        store.upsert("order", &order_id, Entity::from_value(&row).unwrap_or_default());
        debug!(id = %order_id, customer = customer_id, "created order");
        Ok(row)
    }
}

impl Tool for CreateOrder {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "create_order",
            description: "Create a new order for a customer. An order contains line items \
                          (products and quantities) and a status.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "customer_id": {
                        "type": "string",
                        "description": "The ID of the customer placing the order.",
                    },
                    "line_items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "productId": {"type": "string", "description": "The product ID."},
                                "qty": {"type": "integer", "description": "The quantity ordered."},
                            },
                            "required": ["productId", "qty"],
                        },
                        "description": "List of products and quantities in the order.",
                    },
                    "status": {
                        "type": "string",
                        "enum": ORDER_STATUSES,
                        "description": "The order status (default: pending).",
                    },
                    "build_id": {
                        "type": "string",
                        "description": "Optional reference to a custom build configuration.",
                    },
                },
            }),
            required_params: vec!["customer_id", "line_items"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── create_refund ────────────────────────────────────────────────

/// Records a refund against an existing payment.
pub struct CreateRefund;

impl CreateRefund {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let payment_id = require_str(args, "payment_id")?;
        let amount = require_f64(args, "amount")?;
        let currency = require_str(args, "currency")?;
        let reason = require_str(args, "reason")?;
        let notes = optional_str(args, "notes");
        let status = optional_str(args, "status").unwrap_or("pending");
        let lines = args.get("lines").cloned().unwrap_or_else(|| json!([]));

        if store.get_by_probe("payment", payment_id).is_none() {
            return Err(error_payload(format!("Payment {payment_id} not found")));
        }

        let refund_id = deterministic_id(
            "refund_",
            &[payment_id, &amount_key(amount), currency, reason, status],
        );
        if let Some(row) = existing_row(store, "refund", &refund_id) {
            return Ok(row);
        }

        let row = json!({
            "id": refund_id,
            "type": "refund",
            "paymentId": payment_id,
            "amount": amount,
            "currency": currency,
            "reason": reason,
            "notes": notes,
            "status": status,
            "lines": lines,
            "createdAt": store.now(),
            "processedAt": Value::Null,
        });
        store.upsert("refund", &refund_id, Entity::from_value(&row).unwrap_or_default());
        debug!(id = %refund_id, payment = payment_id, "created refund");
        Ok(row)
    }
}

impl Tool for CreateRefund {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "create_refund",
            description: "Create a refund record associated with a payment.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "payment_id": {"type": "string", "description": "Payment ID to refund."},
                    "amount": {"type": "number", "description": "Refund amount."},
                    "currency": {"type": "string", "description": "Currency code, e.g. USD."},
                    "reason": {
                        "type": "string",
                        "description": "Reason for refund (e.g. customer_remorse, defective, incompatible, shipping_issue, other).",
                    },
                    "notes": {"type": "string", "description": "Optional notes."},
                    "status": {"type": "string", "description": "Refund status (default: pending)."},
                    "lines": {
                        "type": "array",
                        "items": {"type": "object"},
                        "description": "Optional line items / breakdown for the refund.",
                    },
                },
            }),
            required_params: vec!["payment_id", "amount", "currency", "reason"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── create_escalation ────────────────────────────────────────────

/// Escalates an existing support ticket to another team or queue.
pub struct CreateEscalation;

impl CreateEscalation {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let ticket_id = require_str(args, "ticket_id")?;
        let escalation_type = require_str(args, "escalation_type")?;
        let destination = require_str(args, "destination")?;
        let notes = optional_str(args, "notes");

        // Ticket tables show up under several legacy spellings; probe them.
        if store.get_by_probe("supportTicket", ticket_id).is_none() {
            return Err(error_payload(format!("Ticket {ticket_id} not found")));
        }

        let escalation_id = deterministic_id(
            "esc_",
            &[ticket_id, escalation_type, destination, notes.unwrap_or("")],
        );
        if let Some(row) = existing_row(store, "escalation", &escalation_id) {
            return Ok(row);
        }

        let row = json!({
            "id": escalation_id,
            "type": "escalation",
            "ticketId": ticket_id,
            "escalationType": escalation_type,
            "destination": destination,
            "notes": notes,
            "createdAt": store.now(),
            "resolvedAt": Value::Null,
        });
        store.upsert(
            "escalation",
            &escalation_id,
            Entity::from_value(&row).unwrap_or_default(),
        );
        debug!(id = %escalation_id, ticket = ticket_id, "created escalation");
        Ok(row)
    }
}

impl Tool for CreateEscalation {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "create_escalation",
            description: "Create an escalation record for a support ticket.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "ticket_id": {"type": "string", "description": "Support ticket id to escalate."},
                    "escalation_type": {
                        "type": "string",
                        "description": "Escalation type (free-form or constrained by rules).",
                    },
                    "destination": {
                        "type": "string",
                        "description": "Escalation destination (team/queue/person).",
                    },
                    "notes": {"type": "string", "description": "Optional notes for the escalation."},
                },
            }),
            required_params: vec!["ticket_id", "escalation_type", "destination"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}

// ── create_resolution ────────────────────────────────────────────

/// Records the outcome that closed out a support ticket.
pub struct CreateResolution;

impl CreateResolution {
    fn run(store: &mut Store, args: &Map<String, Value>) -> Result<Value, Value> {
        let ticket_id = require_str(args, "ticket_id")?;
        let outcome = require_str(args, "outcome")?;
        let linked_refund_id = optional_str(args, "linked_refund_id");
        let resolved_by_id = optional_str(args, "resolved_by_id");
        let notes = optional_str(args, "notes");

        if store.get_by_probe("supportTicket", ticket_id).is_none() {
            return Err(error_payload(format!("Ticket {ticket_id} not found")));
        }
        if let Some(refund_id) = linked_refund_id {
            if !store.contains("refund", refund_id) {
                return Err(error_payload(format!("Refund {refund_id} not found")));
            }
        }
        if let Some(employee_id) = resolved_by_id {
            if !store.contains("employee", employee_id) {
                return Err(error_payload(format!("Employee {employee_id} not found")));
            }
        }

        // Absent optional fields contribute empty strings so the canonical
        // field layout stays fixed.
        let resolution_id = deterministic_id(
            "res_",
            &[
                ticket_id,
                outcome,
                linked_refund_id.unwrap_or(""),
                resolved_by_id.unwrap_or(""),
                notes.unwrap_or(""),
            ],
        );
        if let Some(row) = existing_row(store, "resolution", &resolution_id) {
            return Ok(row);
        }

        let row = json!({
            "id": resolution_id,
            "type": "resolution",
            "ticketId": ticket_id,
            "outcome": outcome,
            "linkedRefundId": linked_refund_id,
            "resolvedById": resolved_by_id,
            "notes": notes,
            "createdAt": store.now(),
        });
        store.upsert(
            "resolution",
            &resolution_id,
            Entity::from_value(&row).unwrap_or_default(),
        );
        debug!(id = %resolution_id, ticket = ticket_id, "created resolution");
        Ok(row)
    }
}

impl Tool for CreateResolution {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "create_resolution",
            description: "Create a resolution record for a support ticket.",
            parameter_schema: json!({
                "type": "object",
                "properties": {
                    "ticket_id": {"type": "string", "description": "The support ticket ID to resolve."},
                    "outcome": {
                        "type": "string",
                        "description": "Resolution outcome. Common values: refund_approved, replacement_provided, troubleshooting_steps, order_updated, no_action.",
                    },
                    "linked_refund_id": {
                        "type": "string",
                        "description": "Optional refund ID linked to this resolution (must exist if provided).",
                    },
                    "resolved_by_id": {
                        "type": "string",
                        "description": "Optional employee ID who resolved the ticket (must exist if provided).",
                    },
                    "notes": {"type": "string", "description": "Optional resolution notes."},
                },
            }),
            required_params: vec!["ticket_id", "outcome"],
        }
    }

    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value {
        Self::run(store, args).unwrap_or_else(|e| e)
    }
}
