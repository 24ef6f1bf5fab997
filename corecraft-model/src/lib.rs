//! Entity model for the CoreCraft benchmark backend.
//!
//! Defines the pieces every other subsystem depends on:
//! - [`Entity`] — the schema-less data container (an open JSON object)
//! - [`canonical`] — the canonical table-name set, aliases, and the legacy
//!   table-name probing order
//! - [`schema`] — the conventional field registry used for non-fatal
//!   schema advisories
//!
//! No entity type has a fixed compile-time shape; the registry describes the
//! conventional field set of each canonical table, but entities may always
//! carry extra fields.

pub mod canonical;
mod entity;
pub mod schema;

pub use entity::Entity;
