//! In-memory entity store and query engine for the CoreCraft benchmark
//! backend.
//!
//! The store is a plain mutable JSON document: a mapping from table name to
//! a table of entities. Tables come in two source shapes — ID-keyed objects
//! and plain arrays — and every read path accepts both transparently.
//!
//! Subsystems:
//! - [`Store`] — table access, normalization, legacy-name probing, clock
//! - [`query`] — filter predicates, deterministic ordering, pagination
//! - [`related`] — fixed-topology foreign-key traversal
//! - [`aggregate`] — group-by with count/sum/avg/min/max
//! - [`mutate`] — single-field and bulk-status mutators
//! - [`snapshot`] — the normalized dump owed to the legacy SQL bridge
//!
//! # Concurrency
//!
//! Single-threaded and synchronous by design. There is no internal locking:
//! callers that evaluate tasks in parallel must give each run its own deep
//! copy of the store before mutating (the caller owns isolation).

pub mod aggregate;
pub mod mutate;
pub mod query;
pub mod related;
pub mod snapshot;
mod store;

pub use store::Store;

pub use corecraft_types::{Error, Result};
