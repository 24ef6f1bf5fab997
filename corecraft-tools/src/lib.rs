//! Tool-call contract for the CoreCraft benchmark backend.
//!
//! Every tool is a stateless handler over the shared store: it receives the
//! full store plus named JSON arguments and returns a JSON-serializable
//! payload. Expected validation failures are structured
//! `{"error": "..."}` payloads — tools never panic and never leak a raw
//! error message as the whole result.
//!
//! The conversational harness drives tools through two methods:
//! [`Tool::descriptor`] (a JSON-schema descriptor for function calling) and
//! [`Tool::invoke`].

mod args;
pub mod create;
pub mod generic;
pub mod search;

use corecraft_store::Store;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub(crate) use args::*;

/// JSON-schema descriptor advertised to the harness.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameter_schema: Value,
    pub required_params: Vec<&'static str>,
}

/// A stateless benchmark tool.
pub trait Tool: Send + Sync {
    /// The tool's function-calling descriptor.
    fn descriptor(&self) -> ToolDescriptor;

    /// Executes against the shared store. Validation failures come back as
    /// `{"error": ...}` payloads, never as panics.
    fn invoke(&self, store: &mut Store, args: &Map<String, Value>) -> Value;
}

/// Builds a structured error payload.
#[must_use]
pub fn error_payload(message: impl std::fmt::Display) -> Value {
    json!({"error": message.to_string()})
}

/// Converts an engine error into its tool payload. Unknown entity types
/// carry the full valid-type and alias listing.
#[must_use]
pub fn engine_error_payload(err: &corecraft_types::Error) -> Value {
    match err {
        corecraft_types::Error::UnknownEntityType(provided) => {
            corecraft_model::canonical::invalid_entity_type_payload(provided)
        }
        other => error_payload(other),
    }
}

/// Every bundled tool, in a stable order.
#[must_use]
pub fn registry() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(generic::QueryByCriteria),
        Box::new(generic::FindRelatedEntities),
        Box::new(generic::AggregateByField),
        Box::new(generic::GetEntityField),
        Box::new(generic::UpdateEntityField),
        Box::new(generic::BulkStatusUpdate),
        Box::new(generic::GetEntitySchema),
        Box::new(generic::LookupByReference),
        Box::new(create::CreateBuild),
        Box::new(create::CreateOrder),
        Box::new(create::CreateRefund),
        Box::new(create::CreateEscalation),
        Box::new(create::CreateResolution),
        Box::new(search::SearchTickets),
        Box::new(search::SearchCustomers),
    ]
}

/// Looks up a bundled tool by descriptor name.
#[must_use]
pub fn find_tool(name: &str) -> Option<Box<dyn Tool>> {
    registry().into_iter().find(|t| t.descriptor().name == name)
}
