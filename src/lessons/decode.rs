//! Lookups over function-call arguments with explicit defaults.

use crate::{Error, Result};
use serde_json::{Map, Value};

/// String field, or `""` when absent.
pub(super) fn text(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Object items of an array field; an absent array yields nothing.
pub(super) fn objects<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Exactly four numbers; anything else is a schema violation, never padded.
pub(super) fn bounding_box(obj: &Map<String, Value>, key: &str) -> Result<[f64; 4]> {
    let values = obj
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    item.as_f64().ok_or_else(|| {
                        Error::SchemaMismatch(format!("{} holds a non-number: {}", key, item))
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .transpose()?
        .unwrap_or_default();

    values.try_into().map_err(|values: Vec<f64>| {
        Error::SchemaMismatch(format!(
            "{} must hold 4 numbers, got {}",
            key,
            values.len()
        ))
    })
}
