//! Payload helpers
//!
//! Every request, agent input and agent output is a `serde_json::Value`.
//! These helpers cover the few conversions the CLI and the core share.

use eyre::Result;
use serde_json::{Map, Value};

/// Render a value as text: strings verbatim, everything else as compact JSON
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build an `{"error": message}` payload
pub fn error(message: impl Into<String>) -> Value {
    let mut map = Map::new();
    map.insert("error".to_string(), Value::String(message.into()));
    Value::Object(map)
}

/// True when the payload carries an `error` key
pub fn is_error(value: &Value) -> bool {
    value.get("error").is_some()
}

/// Read a string field, treating null and missing the same way
pub fn str_field<'a>(input: &'a Value, field: &str) -> Option<&'a str> {
    input.get(field).and_then(|v| v.as_str()).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse `key=value` pairs from the command line into a mapping
pub fn parse_key_values(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            eyre::bail!("Invalid input: '{}'. Use 'key=value'.", pair);
        };
        map.insert(key.trim().to_string(), Value::String(value.to_string()));
    }
    Ok(map)
}

/// Shorten text to `max` characters for display
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
