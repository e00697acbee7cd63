//! The webhook payload value model.
//!
//! Incoming payloads are semi-structured JSON whose shape is dictated by
//! the upstream source. [`Payload`] wraps the parsed object and exposes
//! explicit optional (`*_opt`, [`flag`](ObjectView::flag)) and required
//! (`*_req`) accessors, so each formatter states which fields it needs
//! and fails with a precise [`ChimeError`] when the sender's schema
//! doesn't match.
//!
//! A formatter owns its payload for the duration of the call, augments
//! it (`body`, `digest`, `key`), and hands it back. Nothing is retained
//! across calls.

use serde_json::{Map, Value};

use crate::error::ChimeError;

/// A parsed webhook payload: a JSON object, owned by the formatter for
/// the duration of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Wrap a parsed JSON value. The root must be an object.
    pub fn from_value(value: Value) -> Result<Self, ChimeError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ChimeError::NotAnObject),
        }
    }

    /// Consume the payload back into a plain JSON value for delivery.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Read-only view over the root object, for field access.
    pub fn view(&self) -> ObjectView<'_> {
        ObjectView::root(&self.fields)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert or replace an augmentation field (`digest`, `key`, ...).
    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// Set the rendered message body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.fields
            .insert("body".to_string(), Value::String(body.into()));
    }

    /// The rendered body, if the formatter produced one. `None` means
    /// suppressed delivery.
    pub fn body(&self) -> Option<&str> {
        self.fields.get("body").and_then(Value::as_str)
    }
}

/// Borrowed view over a JSON object that remembers its dotted path, so
/// nested required-field errors name the full location
/// (e.g. `repository.full_name`).
#[derive(Debug, Clone)]
pub struct ObjectView<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> ObjectView<'a> {
    fn root(map: &'a Map<String, Value>) -> Self {
        Self {
            path: String::new(),
            map,
        }
    }

    fn key_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Optional string field: absent → `Ok(None)`, present but not a
    /// string → `FieldType`.
    pub fn str_opt(&self, key: &str) -> Result<Option<&'a str>, ChimeError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ChimeError::field_type(self.key_path(key), "a string")),
        }
    }

    /// Required string field.
    pub fn str_req(&self, key: &str) -> Result<&'a str, ChimeError> {
        self.str_opt(key)?
            .ok_or_else(|| ChimeError::missing(self.key_path(key)))
    }

    /// Optional array field.
    pub fn array_opt(&self, key: &str) -> Result<Option<&'a [Value]>, ChimeError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(ChimeError::field_type(self.key_path(key), "an array")),
        }
    }

    /// Required array field.
    pub fn array_req(&self, key: &str) -> Result<&'a [Value], ChimeError> {
        self.array_opt(key)?
            .ok_or_else(|| ChimeError::missing(self.key_path(key)))
    }

    /// Required nested object, returned as a view rooted at its path.
    pub fn object_req(&self, key: &str) -> Result<ObjectView<'a>, ChimeError> {
        match self.map.get(key) {
            None => Err(ChimeError::missing(self.key_path(key))),
            Some(Value::Object(map)) => Ok(ObjectView {
                path: self.key_path(key),
                map,
            }),
            Some(_) => Err(ChimeError::field_type(self.key_path(key), "an object")),
        }
    }

    /// Required unsigned integer field (e.g. a PR number).
    pub fn u64_req(&self, key: &str) -> Result<u64, ChimeError> {
        match self.map.get(key) {
            None => Err(ChimeError::missing(self.key_path(key))),
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| ChimeError::field_type(self.key_path(key), "an unsigned integer")),
            Some(_) => Err(ChimeError::field_type(
                self.key_path(key),
                "an unsigned integer",
            )),
        }
    }

    /// Boolean flag: absent or non-boolean reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.map.get(key), Some(Value::Bool(true)))
    }
}
