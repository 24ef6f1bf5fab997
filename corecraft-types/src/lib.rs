//! Core type definitions for the CoreCraft benchmark backend.
//!
//! This crate defines the fundamental, table-agnostic pieces used throughout
//! the engine:
//! - The shared error taxonomy ([`Error`])
//! - Deterministic clock resolution ([`clock`])
//! - Deterministic, collision-resistant entity IDs ([`ids`])
//!
//! Domain-specific concerns (canonical table names, schemas, query
//! evaluation) belong to the model and store crates, not here.

pub mod clock;
pub mod ids;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared across the engine.
///
/// None of these is fatal to the process: the tool layer turns each into a
/// structured `{"error": ...}` payload and the calling harness decides
/// whether the episode ends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced ID is absent from its table.
    #[error("{0} not found")]
    NotFound(String),

    /// An argument is outside an enumerated set, arrays are mismatched,
    /// or a required reference is missing.
    #[error("{0}")]
    Validation(String),

    /// The canonicalizer could not resolve the entity type. The tool layer
    /// attaches the full valid-type and alias listing to the payload.
    #[error("Unknown entity type: '{0}'")]
    UnknownEntityType(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
