// 🌳 Document Tree - Generic walk over parsed JSON
// The registry document is an arbitrary tree (object / array / scalar).
// These helpers never fail: a missing or mistyped node is simply `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

// ============================================================================
// PATH ACCESSORS
// ============================================================================

/// Follow a chain of object keys, e.g. `["virksomhedMetadata", "nyesteNavn", "navn"]`
pub fn at<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |current, key| match current.get(*key) {
        Some(Value::Null) | None => None,
        Some(next) => Some(next),
    })
}

/// String at path (empty strings count as absent)
pub fn str_at<'a>(node: &'a Value, path: &[&str]) -> Option<&'a str> {
    at(node, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Owned string at path
pub fn string_at(node: &Value, path: &[&str]) -> Option<String> {
    str_at(node, path).map(str::to_string)
}

/// Integer at path; numeric strings ("1234") are accepted too
pub fn i64_at(node: &Value, path: &[&str]) -> Option<i64> {
    match at(node, path)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn bool_at(node: &Value, path: &[&str]) -> Option<bool> {
    at(node, path).and_then(Value::as_bool)
}

/// Calendar date at path
pub fn date_at(node: &Value, path: &[&str]) -> Option<NaiveDate> {
    str_at(node, path).and_then(parse_date)
}

/// Array elements at path (absent → empty slice)
pub fn array_at<'a>(node: &'a Value, path: &[&str]) -> &'a [Value] {
    at(node, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// ============================================================================
// DATE PARSING
// ============================================================================

/// Parse a registry date
///
/// Accepts "2014-01-01", "2014-01-01T00:00:00", "2014-01-01T00:00:00.000+01:00".
/// Timestamps are truncated to their local calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    parse_naive_datetime(raw).map(|dt| dt.date())
}

/// Parse a registry timestamp into UTC
///
/// Offset-less timestamps and bare dates are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_naive_datetime(raw) {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_naive_datetime(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

// ============================================================================
// RECURSIVE WALK
// ============================================================================

/// Collect every value stored under `key` at any depth, in document order
pub fn collect_by_key<'a>(node: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    walk(node, key, &mut found);
    found
}

fn walk<'a>(node: &'a Value, key: &str, found: &mut Vec<&'a Value>) {
    match node {
        Value::Object(map) => {
            for (k, child) in map {
                if k == key {
                    found.push(child);
                }
                walk(child, key, found);
            }
        }
        Value::Array(items) => {
            for child in items {
                walk(child, key, found);
            }
        }
        _ => {}
    }
}

/// Latest parseable timestamp stored under `key` anywhere in the tree
pub fn latest_timestamp(node: &Value, key: &str) -> Option<DateTime<Utc>> {
    collect_by_key(node, key)
        .into_iter()
        .filter_map(Value::as_str)
        .filter_map(parse_timestamp)
        .max()
}

// ============================================================================
// TESTS
// ============================================================================
