//! Structured content schemas
//!
//! A [`Schema`] describes the shape a model reply is constrained to. Object
//! nodes are validated when built so an invalid declaration never reaches
//! the network; replies are checked against the same tree with
//! [`Schema::check`].

use crate::{Error, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Object {
        description: Option<String>,
        properties: BTreeMap<String, Schema>,
        required: Vec<String>,
    },
    Array {
        description: Option<String>,
        items: Box<Schema>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    String {
        description: Option<String>,
    },
    Number {
        description: Option<String>,
    },
}

impl Schema {
    /// Build an object node. Every `required` name must be a declared property.
    pub fn object<I>(properties: I, required: &[&str]) -> Result<Self>
    where
        I: IntoIterator<Item = (&'static str, Schema)>,
    {
        let properties: BTreeMap<String, Schema> = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();

        if let Some(missing) = required.iter().find(|name| !properties.contains_key(**name)) {
            return Err(Error::InvalidSchema(format!(
                "required property '{}' is not declared",
                missing
            )));
        }

        Ok(Self::Object {
            description: None,
            properties,
            required: required.iter().map(|name| name.to_string()).collect(),
        })
    }

    pub fn array(items: Schema) -> Self {
        Self::Array {
            description: None,
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    pub fn string() -> Self {
        Self::String { description: None }
    }

    pub fn number() -> Self {
        Self::Number { description: None }
    }

    pub fn describe(mut self, text: &str) -> Self {
        match &mut self {
            Self::Object { description, .. }
            | Self::Array { description, .. }
            | Self::String { description }
            | Self::Number { description } => *description = Some(text.to_string()),
        }
        self
    }

    /// Constrain an array node to hold between `min` and `max` items.
    pub fn item_bounds(self, min: usize, max: usize) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidSchema(format!(
                "minItems ({}) exceeds maxItems ({})",
                min, max
            )));
        }
        match self {
            Self::Array {
                description, items, ..
            } => Ok(Self::Array {
                description,
                items,
                min_items: Some(min),
                max_items: Some(max),
            }),
            other => Err(Error::InvalidSchema(format!(
                "item bounds only apply to arrays, not {}",
                other.kind()
            ))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Object { .. } => "OBJECT",
            Self::Array { .. } => "ARRAY",
            Self::String { .. } => "STRING",
            Self::Number { .. } => "NUMBER",
        }
    }

    /// Check a reply value against this schema.
    ///
    /// Absent or null object properties are accepted; callers default them.
    /// An absent array still counts as empty against its `minItems` bound.
    pub fn check(&self, value: &Value) -> Result<()> {
        self.check_at("$", value)
    }

    /// Check function-call arguments against a top-level object schema.
    pub fn check_args(&self, args: &Map<String, Value>) -> Result<()> {
        match self {
            Self::Object { properties, .. } => check_properties("$", properties, args),
            other => Err(Error::InvalidSchema(format!(
                "function parameters must be an OBJECT, not {}",
                other.kind()
            ))),
        }
    }

    fn check_at(&self, path: &str, value: &Value) -> Result<()> {
        match (self, value) {
            (Self::Object { properties, .. }, Value::Object(map)) => {
                check_properties(path, properties, map)
            }
            (
                Self::Array {
                    items,
                    min_items,
                    max_items,
                    ..
                },
                Value::Array(values),
            ) => {
                check_len(path, values.len(), *min_items, *max_items)?;
                for (i, v) in values.iter().enumerate() {
                    items.check_at(&format!("{}[{}]", path, i), v)?;
                }
                Ok(())
            }
            (Self::String { .. }, Value::String(_)) => Ok(()),
            (Self::Number { .. }, Value::Number(_)) => Ok(()),
            (schema, other) => Err(Error::SchemaMismatch(format!(
                "{}: expected {}, got {}",
                path,
                schema.kind(),
                json_kind(other)
            ))),
        }
    }

    fn check_absent(&self, path: &str) -> Result<()> {
        match self {
            Self::Array {
                min_items,
                max_items,
                ..
            } => check_len(path, 0, *min_items, *max_items),
            _ => Ok(()),
        }
    }
}

fn check_properties(
    path: &str,
    properties: &BTreeMap<String, Schema>,
    map: &Map<String, Value>,
) -> Result<()> {
    for (name, schema) in properties {
        let child = format!("{}.{}", path, name);
        match map.get(name) {
            Some(Value::Null) | None => schema.check_absent(&child)?,
            Some(v) => schema.check_at(&child, v)?,
        }
    }
    Ok(())
}

fn check_len(path: &str, len: usize, min: Option<usize>, max: Option<usize>) -> Result<()> {
    if min.is_some_and(|min| len < min) || max.is_some_and(|max| len > max) {
        return Err(Error::SchemaMismatch(format!(
            "{}: {} items outside bounds [{}, {}]",
            path,
            len,
            min.map_or_else(|| "-".to_string(), |n| n.to_string()),
            max.map_or_else(|| "-".to_string(), |n| n.to_string()),
        )));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serializes to the Gemini `Schema` object shape.
impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind())?;
        match self {
            Self::Object {
                description,
                properties,
                required,
            } => {
                if let Some(d) = description {
                    map.serialize_entry("description", d)?;
                }
                map.serialize_entry("properties", properties)?;
                if !required.is_empty() {
                    map.serialize_entry("required", required)?;
                }
            }
            Self::Array {
                description,
                items,
                min_items,
                max_items,
            } => {
                if let Some(d) = description {
                    map.serialize_entry("description", d)?;
                }
                map.serialize_entry("items", items)?;
                if let Some(min) = min_items {
                    map.serialize_entry("minItems", min)?;
                }
                if let Some(max) = max_items {
                    map.serialize_entry("maxItems", max)?;
                }
            }
            Self::String { description } | Self::Number { description } => {
                if let Some(d) = description {
                    map.serialize_entry("description", d)?;
                }
            }
        }
        map.end()
    }
}
