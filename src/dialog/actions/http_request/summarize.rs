//! Renders selected values of a JSON document as short chat lines.

use serde_json::Value as JsonValue;

use crate::Result;

use super::models::{Separator, SummarizeField};

/// Arrays longer than this are cut and end with `...`.
const MAX_LIST_ITEMS: usize = 10;
/// Objects are never expanded into a chat line.
const OMITTED: &str = "ommitted";

/// Summarize a raw response body, fails when it is not JSON.
pub fn summarize_bytes(
    body: &[u8],
    fields: &[SummarizeField],
    separator: &Separator,
) -> Result<String> {
    let value: JsonValue = serde_json::from_slice(body)?;
    Ok(summarize(&value, fields, separator))
}

/// One `"{name}{separator}{value}\n"` line per field, unresolved paths are skipped.
pub fn summarize(
    value: &JsonValue,
    fields: &[SummarizeField],
    separator: &Separator,
) -> String {
    let mut summary = String::new();
    for field in fields {
        let segments: Vec<&str> = field.path.split('.').filter(|s| !s.is_empty()).collect();
        if let Some(found) = lookup(value, &segments) {
            summary.push_str(&field.name);
            summary.push_str(separator.as_str());
            summary.push_str(&render(&found));
            summary.push('\n');
        }
    }
    summary
}

fn lookup(
    value: &JsonValue,
    segments: &[&str],
) -> Option<JsonValue> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    match value {
        JsonValue::Array(items) if *head == "#" => Some(JsonValue::Array(items.iter().filter_map(|item| lookup(item, rest)).collect())),
        JsonValue::Array(items) => head.parse::<usize>().ok().and_then(|idx| items.get(idx)).and_then(|item| lookup(item, rest)),
        JsonValue::Object(map) => map.get(*head).and_then(|item| lookup(item, rest)),
        _ => None,
    }
}

fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Object(_) => OMITTED.to_string(),
        JsonValue::Array(items) => {
            let mut parts: Vec<String> = items.iter().take(MAX_LIST_ITEMS).map(render).collect();
            if items.len() > MAX_LIST_ITEMS {
                parts.push("...".to_string());
            }
            parts.join(", ")
        }
        other => other.to_string(),
    }
}
