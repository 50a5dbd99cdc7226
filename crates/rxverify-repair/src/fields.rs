//! Lenient readers for fields of a recovered value.
//!
//! Oracle replies follow the requested schema only loosely: numbers arrive
//! as strings, booleans as `"yes"`, lists as a single string. These helpers
//! accept the common variants and return `None` for everything else.

use serde_json::Value;

/// Resolve a dot-notation path (e.g. `"result.severity"`). Missing segments
/// and JSON `null` both resolve to `None`.
pub fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}

/// A non-blank string, trimmed. Numbers are rendered as text.
pub fn text(value: &Value, path: &str) -> Option<String> {
    let s = match resolve_path(value, path)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// A number, or a string that parses as one (`"0.9"`, `"90%"` → 0.9).
pub fn number(value: &Value, path: &str) -> Option<f64> {
    match resolve_path(value, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p / 100.0),
                None => s.parse::<f64>().ok(),
            }
        }
        _ => None,
    }
}

/// A boolean, or one of `"true"`/`"yes"`/`"false"`/`"no"` in any case.
pub fn flag(value: &Value, path: &str) -> Option<bool> {
    match resolve_path(value, path)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A list of non-blank strings. A lone string becomes a one-item list;
/// non-string items are skipped.
pub fn text_list(value: &Value, path: &str) -> Vec<String> {
    match resolve_path(value, path) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// The items of an array field; empty if absent or not an array.
pub fn items<'v>(value: &'v Value, path: &str) -> &'v [Value] {
    match resolve_path(value, path) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
