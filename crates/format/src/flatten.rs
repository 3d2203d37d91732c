//! Nested JSON flattening
//!
//! Turns nested objects and arrays into a single-level map with dotted
//! keys (`pos.x`, `targets.0.id`), the shape tabular output expects.

use serde_json::{Map, Value};

/// Flatten a field map, expanding nested objects/arrays into dotted keys
///
/// Scalars pass through unchanged. Empty objects and arrays collapse to a
/// single key with an empty cell so the column still appears.
pub fn flatten_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        flatten_into(key, value, &mut out);
    }
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, nested) in map {
                flatten_into(&format!("{prefix}.{key}"), nested, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, nested) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}.{i}"), nested, out);
            }
        }
        Value::Object(_) | Value::Array(_) => {
            out.insert(prefix.to_string(), Value::Null);
        }
        scalar => {
            out.insert(prefix.to_string(), scalar.clone());
        }
    }
}
