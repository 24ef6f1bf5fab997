use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A generic entity stored in a CoreCraft table.
///
/// An open mapping from field name to JSON value. Each canonical table has a
/// conventional field set (see [`crate::schema`]) but nothing is enforced at
/// the type level — extra fields are allowed everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    fields: Map<String, Value>,
}

impl Entity {
    /// Creates an empty entity.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Wraps a JSON value if it is an object; non-object rows are skipped
    /// by table iteration, not treated as errors.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|fields| Self {
            fields: fields.clone(),
        })
    }

    /// The entity's `id` field, when present and a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Raw field access.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String field access.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Numeric field access. Strings that parse as numbers also count,
    /// matching the loose numeric handling of the legacy aggregator.
    #[must_use]
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Whether the field exists on this entity (regardless of value).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Sets a field in place, returning the previous value if any.
    pub fn set(&mut self, field: &str, value: Value) -> Option<Value> {
        self.fields.insert(field.to_string(), value)
    }

    /// Borrow of the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the entity, yielding its JSON object form.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// The entity as a JSON value, cloning the field map.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
