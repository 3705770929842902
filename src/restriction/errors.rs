//! Restriction error types
//!
//! Two disjoint kinds:
//! - `RestrictionError` (ERR_RESTRICTION): a value failed a restriction. This is
//!   the only error application code is expected to inspect.
//! - `DefinitionError`: a restriction or schema was assembled incorrectly. These
//!   are programming mistakes and are never retried.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error code carried by every `RestrictionError`
pub const ERR_RESTRICTION: &str = "ERR_RESTRICTION";

/// Message used when a `RestrictionError` is built without one
pub const DEFAULT_ERROR_MESSAGE: &str = "Value Restriction Failure";

/// Result type for validation calls
pub type RestrictionResult<T> = Result<T, RestrictionError>;

/// Result type for constructing restrictions and schemas
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// A value failed a restriction.
///
/// `message_stack` holds the causal chain, innermost (most specific) first and
/// this error's own `message` last.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct RestrictionError {
    value: Value,
    root: Value,
    code: &'static str,
    message: String,
    message_stack: Vec<String>,
    #[serde(skip)]
    #[source]
    source: Option<Box<RestrictionError>>,
}

impl RestrictionError {
    /// Create an error for `value` with the default message
    pub fn new(value: Value) -> Self {
        Self::from_parts(value, None, None, None)
    }

    /// Create an error for `value` with the given message
    pub fn with_message(value: Value, message: impl Into<String>) -> Self {
        Self::from_parts(value, None, Some(message.into()), None)
    }

    /// Create an error from all of its optional parts.
    ///
    /// `root` defaults to `value`. When `source` is given its stack is kept
    /// ahead of `message`.
    pub fn from_parts(
        value: Value,
        root: Option<Value>,
        message: Option<String>,
        source: Option<&RestrictionError>,
    ) -> Self {
        let message = message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());

        let mut message_stack = source
            .map(|s| s.message_stack.clone())
            .unwrap_or_default();
        message_stack.push(message.clone());

        let root = root.unwrap_or_else(|| value.clone());

        Self {
            value,
            root,
            code: ERR_RESTRICTION,
            message,
            message_stack,
            source: source.map(|s| Box::new(s.clone())),
        }
    }

    /// The value that failed at the level this error was raised
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The top-level value handed to the outermost call
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Always `ERR_RESTRICTION`
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Outermost (most general) message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Full causal chain, innermost first
    pub fn message_stack(&self) -> &[String] {
        &self.message_stack
    }

    /// Innermost (most specific) message
    pub fn innermost(&self) -> &str {
        self.message_stack
            .first()
            .map(String::as_str)
            .unwrap_or(&self.message)
    }
}

/// A restriction, schema or preset was defined incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A schema node is reachable from itself (or shared within one schema)
    #[error("[restrictor] Invalid Argument: Circular references within schemas are not supported")]
    CircularSchema,

    /// A message string appeared after the first argument
    #[error("[restrictor] Invalid Argument: Constructor arg #{position} was not a Conditional or a Schema")]
    MisplacedMessage {
        /// 1-based argument position
        position: usize,
    },

    /// Sequence operation on a mapping schema or the reverse
    #[error("[restrictor] Invalid Argument: schema is not a {expected}")]
    ShapeMismatch {
        /// The shape the operation needs
        expected: &'static str,
    },

    /// Regular expression did not compile
    #[error("[restrictor] Invalid Argument: invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// No preset with this name
    #[error("[restrictor] Invalid Argument: unknown preset '{name}'")]
    UnknownPreset { name: String },

    /// Wrong number of preset parameters
    #[error("[restrictor] Invalid Argument: preset '{name}' takes {expected} parameter(s), got {actual}")]
    PresetArity {
        name: String,
        expected: &'static str,
        actual: usize,
    },

    /// Preset parameter of the wrong type
    #[error("[restrictor] Invalid Argument: preset '{name}': {reason}")]
    InvalidPresetParam { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_construction() {
        let err = RestrictionError::new(json!("foo"));
        assert_eq!(err.code(), "ERR_RESTRICTION");
        assert_eq!(err.value(), &json!("foo"));
        assert_eq!(err.root(), &json!("foo"));
        assert_eq!(err.message(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(err.message_stack(), &[DEFAULT_ERROR_MESSAGE.to_string()]);
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_root_and_message() {
        let root = json!({"foo": "foo"});
        let err = RestrictionError::from_parts(
            json!("foo"),
            Some(root.clone()),
            Some("I am a message".into()),
            None,
        );
        assert_eq!(err.root(), &root);
        assert_eq!(err.message_stack().len(), 1);
        assert_eq!(err.message(), "I am a message");
    }

    #[test]
    fn test_source_stack_is_kept_inner() {
        let inner = RestrictionError::with_message(json!(1), "inner");
        let middle = RestrictionError::from_parts(json!(1), None, Some("middle".into()), Some(&inner));
        let outer = RestrictionError::from_parts(json!(1), None, Some("outer".into()), Some(&middle));

        assert_eq!(outer.message_stack(), &["inner", "middle", "outer"]);
        assert_eq!(outer.innermost(), "inner");
        assert_eq!(outer.message(), "outer");
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let inner = RestrictionError::with_message(json!(1), "inner");
        let outer = RestrictionError::from_parts(json!(1), None, Some("outer".into()), Some(&inner));

        let source = outer.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("inner"));
        assert!(inner.source().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let err = RestrictionError::with_message(json!([1]), "Must be a pair");
        let out = serde_json::to_value(&err).unwrap();
        assert_eq!(out["code"], "ERR_RESTRICTION");
        assert_eq!(out["messageStack"], json!(["Must be a pair"]));
        assert_eq!(out["root"], json!([1]));
        assert!(out.get("source").is_none());
    }

    #[test]
    fn test_definition_error_display() {
        let err = DefinitionError::MisplacedMessage { position: 3 };
        assert!(err.to_string().contains("arg #3"));
        assert!(DefinitionError::CircularSchema.to_string().contains("Circular"));
    }
}
