//! Object model errors

use thiserror::Error;

use crate::restriction::RestrictionError;

/// Result type for object operations
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Errors raised by `ObjectRef` operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectError {
    /// Assignment to a data property of a frozen object
    #[error("Cannot assign to read only property '{0}' of object")]
    ReadOnly(String),

    /// Adding a property to a frozen object
    #[error("Cannot add property {0}, object is not extensible")]
    NotExtensible(String),

    /// Defining, deleting or re-linking on a frozen object
    #[error("Cannot redefine property: {0}")]
    Redefine(String),

    /// Assignment through an accessor without a setter
    #[error("Cannot set property {0} which has only a getter")]
    NoSetter(String),

    /// `call` on an object that is not a function
    #[error("object is not a function")]
    NotCallable,

    /// JSON conversion of a graph that reaches itself
    #[error("Converting circular structure to JSON")]
    Circular,

    /// JSON conversion of a function or a non-finite number
    #[error("value cannot be represented as JSON: {0}")]
    NotRepresentable(&'static str),

    /// A native function received an argument it cannot use
    #[error("[restrictor] Invalid Argument: {0}")]
    InvalidArgument(String),

    /// A published restriction rejected its argument
    #[error("{0}")]
    Restriction(Box<RestrictionError>),
}

impl From<RestrictionError> for ObjectError {
    fn from(e: RestrictionError) -> Self {
        ObjectError::Restriction(Box::new(e))
    }
}

impl ObjectError {
    /// The restriction failure behind this error, if any
    pub fn as_restriction(&self) -> Option<&RestrictionError> {
        match self {
            ObjectError::Restriction(e) => Some(e),
            _ => None,
        }
    }
}
