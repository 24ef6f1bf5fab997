//! Argument extraction helpers.
//!
//! Each helper returns `Err(payload)` with a ready-to-emit structured error
//! so tool bodies can use `?` and stay linear.

use serde_json::{Map, Value};

use crate::error_payload;

pub(crate) fn require_str<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, Value> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(error_payload(format!("{name} must be a string"))),
        None => Err(error_payload(format!("missing required parameter: {name}"))),
    }
}

pub(crate) fn optional_str<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

pub(crate) fn optional_i64(args: &Map<String, Value>, name: &str) -> Option<i64> {
    match args.get(name) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

pub(crate) fn require_f64(args: &Map<String, Value>, name: &str) -> Result<f64, Value> {
    match args.get(name) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| error_payload(format!("{name} must be a number"))),
        Some(_) => Err(error_payload(format!("{name} must be a number"))),
        None => Err(error_payload(format!("missing required parameter: {name}"))),
    }
}

pub(crate) fn require_str_vec(args: &Map<String, Value>, name: &str) -> Result<Vec<String>, Value> {
    match args.get(name) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| error_payload(format!("{name} must be an array of strings")))
            })
            .collect(),
        Some(_) => Err(error_payload(format!("{name} must be an array of strings"))),
        None => Err(error_payload(format!("missing required parameter: {name}"))),
    }
}

pub(crate) fn optional_object<'a>(
    args: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a Map<String, Value>>, Value> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(error_payload(format!("{name} must be an object"))),
    }
}

/// Rejects a value outside an enumerated set, naming the valid options.
pub(crate) fn validate_enum(
    value: Option<&str>,
    allowed: &[&str],
    name: &str,
) -> Result<(), Value> {
    match value {
        Some(v) if !allowed.contains(&v) => Err(error_payload(format!(
            "invalid {name} '{v}'; must be one of: {}",
            allowed.join(", ")
        ))),
        _ => Ok(()),
    }
}
