use thiserror::Error;

/// Errors surfaced to the boundary layer when a webhook cannot be
/// formatted. Suppressed delivery is deliberately not an error: a
/// formatter that decides not to emit a message returns a payload
/// without a `body` key.
#[derive(Error, Debug)]
pub enum ChimeError {
    #[error("no formatter registered for source kind '{0}'")]
    UnknownSourceKind(String),

    #[error("payload is missing required field '{0}'")]
    MissingField(String),

    #[error("payload field '{field}' is not {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    #[error("payload root is not a JSON object")]
    NotAnObject,
}

impl ChimeError {
    /// Shorthand for a missing required field, taking any stringish name.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Shorthand for a present field of the wrong JSON type.
    pub fn field_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::FieldType {
            field: field.into(),
            expected,
        }
    }
}
