//! Conditionals and constructor arguments
//!
//! A `Conditional` tests one value. It is one of:
//! - a predicate returning `bool`
//! - an assertion returning `Err` to fail
//! - a nested `Restriction`
//!
//! Only nested restrictions chain their failure detail into the caller's
//! error; predicate and assertion failures carry the caller's message alone.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::errors::{RestrictionError, RestrictionResult};
use super::combinator::Restriction;
use super::schema::Schema;

/// Error type an assertion conditional may return
pub type AssertionError = Box<dyn std::error::Error + Send + Sync>;

type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;
type AssertionFn = dyn Fn(&Value) -> Result<(), AssertionError> + Send + Sync;

/// A single-value test
#[derive(Clone)]
pub enum Conditional {
    /// Passes when the function returns `true`
    Predicate(Arc<PredicateFn>),
    /// Passes when the function returns `Ok`
    Assertion(Arc<AssertionFn>),
    /// Passes when the nested restriction accepts the value
    Restriction(Restriction),
}

impl Conditional {
    /// Wrap a boolean predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Conditional::Predicate(Arc::new(f))
    }

    /// Wrap an assertion; any `Err` fails the value
    pub fn assertion<F, E>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), E> + Send + Sync + 'static,
        E: Into<AssertionError>,
    {
        Conditional::Assertion(Arc::new(move |v: &Value| -> Result<(), AssertionError> {
            f(v).map_err(Into::into)
        }))
    }

    /// Returns the nested restriction, if this is one
    pub fn as_restriction(&self) -> Option<&Restriction> {
        match self {
            Conditional::Restriction(r) => Some(r),
            _ => None,
        }
    }

    /// Test `value`, raising with `message` on failure.
    ///
    /// `root` is the outermost value of a schema traversal; `None` at top level.
    pub(crate) fn check(
        &self,
        message: &str,
        value: &Value,
        root: Option<&Value>,
    ) -> RestrictionResult<()> {
        let reject = |source: Option<&RestrictionError>| {
            RestrictionError::from_parts(
                value.clone(),
                root.cloned(),
                Some(message.to_string()),
                source,
            )
        };

        match self {
            Conditional::Restriction(r) => r.check(value).map_err(|e| reject(Some(&e))),
            Conditional::Predicate(f) => {
                if f(value) {
                    Ok(())
                } else {
                    Err(reject(None))
                }
            }
            // Only nested restrictions contribute to the message stack
            Conditional::Assertion(f) => f(value).map_err(|_| reject(None)),
        }
    }
}

impl fmt::Debug for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conditional::Predicate(_) => write!(f, "Conditional::Predicate"),
            Conditional::Assertion(_) => write!(f, "Conditional::Assertion"),
            Conditional::Restriction(r) => f.debug_tuple("Conditional::Restriction").field(r).finish(),
        }
    }
}

impl From<Restriction> for Conditional {
    fn from(r: Restriction) -> Self {
        Conditional::Restriction(r)
    }
}

impl From<&Restriction> for Conditional {
    fn from(r: &Restriction) -> Self {
        Conditional::Restriction(r.clone())
    }
}

/// One argument to `Restriction::new`, `or` or `and`.
///
/// The kind is decided once here and never inspected dynamically again.
#[derive(Debug, Clone)]
pub enum RestrictionArg {
    /// Explicit message; only valid as the first argument
    Message(String),
    Conditional(Conditional),
    Schema(Schema),
}

impl From<&str> for RestrictionArg {
    fn from(s: &str) -> Self {
        RestrictionArg::Message(s.to_string())
    }
}

impl From<String> for RestrictionArg {
    fn from(s: String) -> Self {
        RestrictionArg::Message(s)
    }
}

impl From<Conditional> for RestrictionArg {
    fn from(c: Conditional) -> Self {
        RestrictionArg::Conditional(c)
    }
}

impl From<Restriction> for RestrictionArg {
    fn from(r: Restriction) -> Self {
        RestrictionArg::Conditional(Conditional::Restriction(r))
    }
}

impl From<&Restriction> for RestrictionArg {
    fn from(r: &Restriction) -> Self {
        RestrictionArg::Conditional(Conditional::Restriction(r.clone()))
    }
}

impl From<Schema> for RestrictionArg {
    fn from(s: Schema) -> Self {
        RestrictionArg::Schema(s)
    }
}

impl From<&Schema> for RestrictionArg {
    fn from(s: &Schema) -> Self {
        RestrictionArg::Schema(s.clone())
    }
}

/// Build a `Restriction` from mixed arguments.
///
/// ```ignore
/// let pair = restriction!("Must be a pair of strings", Schema::sequence([string(), string()]))?;
/// ```
#[macro_export]
macro_rules! restriction {
    () => {
        $crate::Restriction::new(::std::vec::Vec::<$crate::RestrictionArg>::new())
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::Restriction::new(::std::vec![$($crate::RestrictionArg::from($arg)),+])
    };
}
