//! Error types for the tag engine and the validation facade.
//!
//! Field validation failures are never reported through these types; they are
//! returned as [`FieldMessages`](crate::FieldMessages). An [`Error`] means a
//! rule could not be evaluated at all.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Engine-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// A rule expression names a tag that was never registered.
    #[error("undefined validation tag '{tag}'")]
    UnknownTag { tag: String },

    /// A tag expecting a numeric parameter received something else.
    #[error("invalid parameter '{param}' for tag '{tag}'")]
    InvalidParam { tag: String, param: String },

    /// A rule expression could not be parsed.
    #[error("malformed rule expression '{0}'")]
    MalformedRule(String),

    /// The value handed to a struct-level method did not serialize to an object.
    #[error("value of type {type_name} did not serialize to a struct")]
    NotAStruct { type_name: &'static str },

    /// Serializing the value for validation failed.
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A translation file is not a JSON object of templates.
    #[error("invalid translation data: {0}")]
    Translations(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A single failed rule on a single field.
///
/// Produced by the tag engine and consumed by the facade when it renders
/// messages; one per failing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Leaf field name (empty for single-value validation)
    pub field: String,
    /// Dotted path from the validated root, e.g. `address.city`
    pub path: String,
    /// The failing tag (`a|b` for an OR group)
    pub tag: String,
    /// The tag parameter, empty when the rule takes none
    pub param: String,
    /// The offending value as it was validated
    pub value: serde_json::Value,
}

impl FieldError {
    /// Create a field error for a top-level field.
    pub fn new(
        field: impl Into<String>,
        tag: impl Into<String>,
        param: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        let field = field.into();
        Self {
            path: field.clone(),
            field,
            tag: tag.into(),
            param: param.into(),
            value,
        }
    }

    /// Set the dotted path of the field.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param.is_empty() {
            write!(f, "'{}' failed on the '{}' tag", self.path, self.tag)
        } else {
            write!(
                f,
                "'{}' failed on the '{}={}' tag",
                self.path, self.tag, self.param
            )
        }
    }
}
