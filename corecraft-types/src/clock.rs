//! Deterministic clock resolution.
//!
//! Benchmark runs must be reproducible, so no operation ever reads the wall
//! clock. Instead the store document may carry a fixed ISO-8601 UTC string
//! under one of a few well-known keys; every derived timestamp
//! (`createdAt`, `updatedAt`, lifecycle stamps) reads through
//! [`resolve_now`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Store keys probed for the injected clock, in priority order.
pub const CLOCK_KEYS: [&str; 4] = ["__now", "now", "current_time", "currentTime"];

/// Returned when no clock key is present. A fixed constant keeps repeated
/// runs byte-identical even on unseeded stores.
pub const EPOCH_FALLBACK: &str = "1970-01-01T00:00:00Z";

/// Resolves the current clock value from a store document.
///
/// Checks [`CLOCK_KEYS`] in order and returns the first non-empty string
/// value; blank or non-string values are skipped. Falls back to
/// [`EPOCH_FALLBACK`] when none is present.
#[must_use]
pub fn resolve_now(doc: &Map<String, Value>) -> String {
    for key in CLOCK_KEYS {
        if let Some(Value::String(s)) = doc.get(key) {
            if !s.trim().is_empty() {
                return s.clone();
            }
        }
    }
    EPOCH_FALLBACK.to_string()
}

/// Parses an ISO-8601 timestamp, tolerating the `Z` suffix, naive
/// (timezone-less) strings — with or without fractional seconds — and
/// date-only strings. Naive forms are taken as UTC; a bare date means
/// midnight.
///
/// Returns `None` for empty or malformed input; date filters treat that as
/// "no constraint" rather than an error, matching the legacy readers.
#[must_use]
pub fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive datetimes are assumed UTC.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn dunder_now_wins_over_later_keys() {
        let d = doc(json!({
            "now": "2025-02-02T00:00:00Z",
            "__now": "2025-01-01T00:00:00Z",
        }));
        assert_eq!(resolve_now(&d), "2025-01-01T00:00:00Z");
    }

    #[test]
    fn blank_clock_value_is_skipped() {
        let d = doc(json!({"__now": "  ", "current_time": "2025-03-03T12:00:00Z"}));
        assert_eq!(resolve_now(&d), "2025-03-03T12:00:00Z");
    }

    #[test]
    fn missing_clock_yields_epoch_fallback() {
        assert_eq!(resolve_now(&Map::new()), EPOCH_FALLBACK);
    }

    #[test]
    fn parse_iso_accepts_z_and_offset_forms() {
        let a = parse_iso("2025-08-01T00:00:00Z").unwrap();
        let b = parse_iso("2025-08-01T02:00:00+02:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_iso_accepts_date_only_as_midnight() {
        assert_eq!(
            parse_iso("2025-08-01").unwrap(),
            parse_iso("2025-08-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn parse_iso_accepts_naive_and_fractional_forms() {
        assert_eq!(
            parse_iso("2025-08-01T10:30:00").unwrap(),
            parse_iso("2025-08-01T10:30:00Z").unwrap()
        );
        let fractional = parse_iso("2025-08-01T10:30:00.500").unwrap();
        assert!(fractional > parse_iso("2025-08-01T10:30:00Z").unwrap());
    }

    #[test]
    fn parse_iso_rejects_garbage() {
        assert!(parse_iso("not-a-date").is_none());
        assert!(parse_iso("").is_none());
    }
}
