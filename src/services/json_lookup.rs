//! Tolerant accessors over backend JSON.
//!
//! The backend's response shapes are not contractually fixed, so fields are
//! resolved through ordered tables of accessor paths: the first path that
//! resolves wins.

use serde_json::{Map, Value};

/// An accessor path such as `["counts", "users"]`.
pub type KeyPath = &'static [&'static str];

/// Unwrap the backend's `{"IsSuccess": .., "data": {..}}` envelope.
///
/// Returns the `data` member when it is an object, otherwise the payload
/// itself.
pub fn payload_root(raw: &Value) -> &Value {
    match raw.get("data") {
        Some(inner @ Value::Object(_)) => inner,
        _ => raw,
    }
}

/// Follow `path` through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// First path in `table` that is present at all (a `null` counts as present).
pub fn first_present<'a>(value: &'a Value, table: &[KeyPath]) -> Option<&'a Value> {
    table.iter().find_map(|path| lookup(value, path))
}

/// First path in `table` whose value converts with `convert`.
pub fn first_map<'a, T>(
    value: &'a Value,
    table: &[KeyPath],
    convert: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    table
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(convert)
}

/// First key of `keys` on `object` whose value converts with `convert`.
pub fn field<'a, T>(
    object: &'a Map<String, Value>,
    keys: &[&str],
    convert: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(convert)
}

/// Numbers and numeric strings as a float.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Numbers and numeric strings as an integer, rounding fractions.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| as_number(value).map(|f| f.round() as i64)),
        _ => as_number(value).map(|f| f.round() as i64),
    }
}

/// Non-empty scalar rendered as text. Objects, arrays and nulls are not text.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A JSON value as a single display string; strings are not quoted.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Locate a collection of records in a payload.
///
/// Tries each path of `table` (an array wins; an object keyed by id
/// contributes its record values), then a bare `data` array, then the payload
/// itself when it is an array.
pub fn find_records<'a>(raw: &'a Value, table: &[KeyPath]) -> Vec<&'a Value> {
    for path in table {
        match lookup(raw, path) {
            Some(Value::Array(items)) => return items.iter().collect(),
            Some(Value::Object(map)) if !looks_like_record(map) => {
                let records: Vec<&Value> = map.values().filter(|v| v.is_object()).collect();
                if !records.is_empty() {
                    return records;
                }
            }
            _ => {}
        }
    }

    match raw.get("data").unwrap_or(raw) {
        Value::Array(items) => items.iter().collect(),
        _ => Vec::new(),
    }
}

fn looks_like_record(map: &Map<String, Value>) -> bool {
    map.contains_key("email") || map.contains_key("name")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_root_unwraps_envelope() {
        let raw = json!({"IsSuccess": true, "data": {"total_users": 3}});
        assert_eq!(payload_root(&raw), &json!({"total_users": 3}));

        let bare = json!({"total_users": 3});
        assert_eq!(payload_root(&bare), &bare);

        let list = json!({"data": [1, 2]});
        assert_eq!(payload_root(&list), &list);
    }

    #[test]
    fn test_first_map_skips_unconvertible() {
        let value = json!({"users": [{"name": "x"}], "total": "42"});
        let table: &[KeyPath] = &[&["users"], &["total"]];
        assert_eq!(first_map(&value, table, as_integer), Some(42));
    }

    #[test]
    fn test_first_present_counts_null() {
        let value = json!({"a": null, "b": [1]});
        let table: &[KeyPath] = &[&["a"], &["b"]];
        assert_eq!(first_present(&value, table), Some(&Value::Null));
    }

    #[test]
    fn test_as_integer_variants() {
        assert_eq!(as_integer(&json!(7)), Some(7));
        assert_eq!(as_integer(&json!(7.6)), Some(8));
        assert_eq!(as_integer(&json!(" 12 ")), Some(12));
        assert_eq!(as_integer(&json!("abc")), None);
        assert_eq!(as_integer(&json!(null)), None);
    }

    #[test]
    fn test_find_records_paths() {
        let raw = json!({"data": {"total": 2, "users": [{"email": "a@x"}, {"email": "b@x"}]}});
        let table: &[KeyPath] = &[&["data", "users"], &["users"]];
        assert_eq!(find_records(&raw, table).len(), 2);

        let bare = json!([{"email": "a@x"}]);
        assert_eq!(find_records(&bare, table).len(), 1);

        let wrapped = json!({"data": [{"email": "a@x"}, {"email": "b@x"}]});
        assert_eq!(find_records(&wrapped, table).len(), 2);

        let keyed = json!({"users": {"1": {"email": "a@x"}, "2": {"email": "b@x"}}});
        assert_eq!(find_records(&keyed, table).len(), 2);

        assert!(find_records(&json!({"detail": "nope"}), table).is_empty());
    }
}
