//! Error types for the form engine.

use thiserror::Error;

/// Errors raised while building or mutating a form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field: {name}")]
    UnknownField { name: String },

    #[error("duplicate field name '{name}' in connector configuration")]
    DuplicateField { name: String },

    #[error("field name '{name}' is reserved for the connector name")]
    ReservedField { name: String },

    #[error("field '{name}' is not a {expected} field")]
    WrongKind { name: String, expected: &'static str },
}

impl FormError {
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    pub fn wrong_kind(name: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongKind {
            name: name.into(),
            expected,
        }
    }
}
