use corecraft_model::{canonical, Entity};
use corecraft_types::clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// The shared, in-process collection of entity tables.
///
/// A thin wrapper over the top-level JSON document: table name → table,
/// plus scalar housekeeping keys such as the injected clock. Entities are
/// created and updated in place; nothing in scope physically deletes a row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    doc: Map<String, Value>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a top-level JSON object as a store.
    ///
    /// # Errors
    /// [`corecraft_types::Error::Validation`] when the value is not an object.
    pub fn from_value(value: Value) -> corecraft_types::Result<Self> {
        match value {
            Value::Object(doc) => Ok(Self { doc }),
            other => Err(corecraft_types::Error::Validation(format!(
                "store document must be a JSON object, got {other}"
            ))),
        }
    }

    /// Borrow of the raw top-level document.
    #[must_use]
    pub fn doc(&self) -> &Map<String, Value> {
        &self.doc
    }

    /// The resolved deterministic clock value (see [`clock::resolve_now`]).
    #[must_use]
    pub fn now(&self) -> String {
        clock::resolve_now(&self.doc)
    }

    /// All object rows of a table, in scan order.
    ///
    /// Accepts dict-form and list-form tables; non-object entries are
    /// skipped, not errors. An absent table yields no rows.
    #[must_use]
    pub fn entities(&self, key: &str) -> Vec<Entity> {
        match self.doc.get(key) {
            Some(Value::Object(table)) => table
                .values()
                .filter_map(Entity::from_value)
                .collect(),
            Some(Value::Array(rows)) => rows.iter().filter_map(Entity::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// All identifiable rows of a table as `(id, entity)` pairs.
    ///
    /// Dict-form rows are identified by their map key; list-form rows by
    /// their `id` field (rows without one are skipped).
    #[must_use]
    pub fn entries(&self, key: &str) -> Vec<(String, Entity)> {
        match self.doc.get(key) {
            Some(Value::Object(table)) => table
                .iter()
                .filter_map(|(id, row)| Entity::from_value(row).map(|e| (id.clone(), e)))
                .collect(),
            Some(Value::Array(rows)) => rows
                .iter()
                .filter_map(Entity::from_value)
                .filter_map(|e| {
                    let id = e.id()?.to_string();
                    Some((id, e))
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Looks up a single entity by ID.
    ///
    /// Dict-form tables are checked by key first, then by each row's `id`
    /// field (covers list-form tables and mis-keyed rows).
    #[must_use]
    pub fn get(&self, key: &str, id: &str) -> Option<Entity> {
        if let Some(Value::Object(table)) = self.doc.get(key) {
            if let Some(row) = table.get(id) {
                if let Some(entity) = Entity::from_value(row) {
                    return Some(entity);
                }
            }
        }
        self.entities(key).into_iter().find(|e| e.id() == Some(id))
    }

    /// Whether a table contains an entity with the given ID.
    #[must_use]
    pub fn contains(&self, key: &str, id: &str) -> bool {
        self.get(key, id).is_some()
    }

    /// Inserts or replaces an entity, creating the table lazily.
    ///
    /// The table ends up in dict-keyed form: a missing or malformed table is
    /// created fresh, and an existing list-form table is normalized (keyed by
    /// each row's `id`) before insertion rather than silently replaced.
    pub fn upsert(&mut self, key: &str, id: &str, entity: Entity) {
        let table = self.table_dict_mut(key);
        table.insert(id.to_string(), entity.into_value());
    }

    /// In-place mutable access to a single entity's field map.
    ///
    /// Normalizes the table to dict form first, so list-form call sites get
    /// the same update-in-place semantics. Returns `None` when the ID is
    /// absent or the stored row is not an object.
    pub fn entity_mut(&mut self, key: &str, id: &str) -> Option<&mut Map<String, Value>> {
        self.normalize_table(key);
        match self.doc.get_mut(key)? {
            Value::Object(table) => table.get_mut(id).and_then(Value::as_object_mut),
            _ => None,
        }
    }

    /// Converts a list-form table to dict form, keyed by each row's `id`.
    ///
    /// Rows that are not objects or carry no `id` cannot be keyed and are
    /// dropped with a warning. Dict-form and absent tables are left alone.
    pub fn normalize_table(&mut self, key: &str) {
        let Some(Value::Array(rows)) = self.doc.get(key) else {
            return;
        };
        let mut table = Map::with_capacity(rows.len());
        for row in rows {
            let keyed = Entity::from_value(row).and_then(|e| {
                let id = e.id()?.to_string();
                Some((id, e))
            });
            match keyed {
                Some((id, entity)) => {
                    table.insert(id, entity.into_value());
                }
                None => {
                    warn!(table = key, "dropping unidentifiable row during normalization");
                }
            }
        }
        debug!(table = key, rows = table.len(), "normalized list-form table to dict form");
        self.doc.insert(key.to_string(), Value::Object(table));
    }

    fn table_dict_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        self.normalize_table(key);
        if !matches!(self.doc.get(key), Some(Value::Object(_))) {
            self.doc.insert(key.to_string(), Value::Object(Map::new()));
        }
        match self.doc.get_mut(key) {
            Some(Value::Object(table)) => table,
            _ => unreachable!("table just coerced to dict form"),
        }
    }

    /// Resolves the first naming-convention variant of `base` that exists as
    /// a table key (see [`canonical::table_key_candidates`] for the order).
    ///
    /// `None` means the table is absent, which readers treat as empty — a
    /// deliberate legacy accommodation, not an error.
    #[must_use]
    pub fn find_table_key(&self, base: &str) -> Option<String> {
        canonical::table_key_candidates(base)
            .into_iter()
            .find(|candidate| self.doc.contains_key(candidate))
    }

    /// All rows of the table resolved through legacy-name probing; empty
    /// when no variant matches.
    #[must_use]
    pub fn entities_by_probe(&self, base: &str) -> Vec<Entity> {
        match self.find_table_key(base) {
            Some(key) => self.entities(&key),
            None => Vec::new(),
        }
    }

    /// Single-entity lookup through legacy-name probing.
    #[must_use]
    pub fn get_by_probe(&self, base: &str, id: &str) -> Option<Entity> {
        self.find_table_key(base).and_then(|key| self.get(&key, id))
    }
}
