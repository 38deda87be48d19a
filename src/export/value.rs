//! Defensive accessors over untyped API records
//!
//! Every lookup tolerates missing keys and unexpected shapes by falling back
//! to an empty default.

use serde_json::Value;

/// Follow `keys` through nested objects.
pub fn at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |v, key| v.get(key))
}

/// Render a scalar for a cell. Null is empty, lists join with `", "`.
pub fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Text at `keys`, or empty.
pub fn text_at(value: &Value, keys: &[&str]) -> String {
    at(value, keys).map(text).unwrap_or_default()
}

/// Text at `keys`, or `default` when absent or null.
pub fn text_or(value: &Value, keys: &[&str], default: &str) -> String {
    match at(value, keys) {
        None | Some(Value::Null) => default.to_string(),
        Some(v) => text(v),
    }
}

/// Array at `keys`, or an empty slice.
pub fn list_at<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    at(value, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Truthiness of the value at `keys`; anything but `true` is false.
pub fn flag_at(value: &Value, keys: &[&str]) -> bool {
    at(value, keys).and_then(Value::as_bool).unwrap_or(false)
}

/// First `values[0].value` among `items` whose `name` equals `field`.
///
/// Earlier matches win; no match yields an empty string.
pub fn first_field_value(items: &[Value], field: &str) -> String {
    items
        .iter()
        .find(|item| item.get("name").and_then(Value::as_str) == Some(field))
        .and_then(|item| list_at(item, &["values"]).first())
        .map(|v| text_at(v, &["value"]))
        .unwrap_or_default()
}
