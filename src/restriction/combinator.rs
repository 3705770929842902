//! The `Restriction` combinator
//!
//! A restriction owns a message, an ordered list of conditionals and an ordered
//! list of compiled schemas. Calling it checks each value against every schema,
//! then every conditional, and hands the value back unchanged on success.
//!
//! Everything except the message is fixed at construction. The message sits
//! behind a lock and is read once per value checked.

use std::borrow::Borrow;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::conditional::{AssertionError, Conditional, RestrictionArg};
use super::errors::{DefinitionError, DefinitionResult, RestrictionResult};
use super::schema::Template;
use super::validator::SchemaValidator;

/// Message used when none is given and none can be derived
pub const DEFAULT_MESSAGE: &str = "An invalid value was detected";

struct Inner {
    message: RwLock<String>,
    conditionals: Vec<Conditional>,
    schemas: Vec<Template>,
}

/// A composable, callable validation rule.
///
/// Cloning yields another handle to the same restriction; equality is
/// identity.
#[derive(Clone)]
pub struct Restriction {
    inner: Arc<Inner>,
}

/// Parsed constructor arguments
struct Parts {
    message: String,
    explicit: bool,
    conditionals: Vec<Conditional>,
    schemas: Vec<Template>,
}

impl Parts {
    /// Split arguments into message, conditionals and compiled schemas.
    ///
    /// Without an explicit message, a list made up only of restrictions
    /// derives one: the sole message verbatim, or all of them joined with
    /// `" && "` in parentheses.
    fn parse<I>(args: I) -> DefinitionResult<Self>
    where
        I: IntoIterator<Item = RestrictionArg>,
    {
        let mut args = args.into_iter().peekable();

        let mut message = DEFAULT_MESSAGE.to_string();
        let mut explicit = false;
        if let Some(RestrictionArg::Message(_)) = args.peek() {
            if let Some(RestrictionArg::Message(m)) = args.next() {
                message = m;
                explicit = true;
            }
        }
        let offset = usize::from(explicit);

        let mut conditionals = Vec::new();
        let mut schemas = Vec::new();
        let mut restriction_messages = Vec::new();
        let mut count = 0;

        for (i, arg) in args.enumerate() {
            count += 1;
            match arg {
                RestrictionArg::Message(_) => {
                    tracing::debug!(position = i + 1 + offset, "message argument out of place");
                    return Err(DefinitionError::MisplacedMessage {
                        position: i + 1 + offset,
                    });
                }
                RestrictionArg::Conditional(c) => {
                    if let Some(r) = c.as_restriction() {
                        restriction_messages.push(r.message());
                    }
                    conditionals.push(c);
                }
                RestrictionArg::Schema(s) => schemas.push(Template::compile(&s)?),
            }
        }

        if !explicit && count > 0 && restriction_messages.len() == count {
            message = if restriction_messages.len() == 1 {
                restriction_messages.remove(0)
            } else {
                format!("({})", restriction_messages.join(" && "))
            };
        }

        Ok(Self {
            message,
            explicit,
            conditionals,
            schemas,
        })
    }
}

#[derive(Clone, Copy)]
enum Junction {
    Or,
    And,
}

impl Junction {
    fn symbol(self) -> &'static str {
        match self {
            Junction::Or => "||",
            Junction::And => "&&",
        }
    }
}

impl Restriction {
    /// Build a restriction from an optional leading message followed by
    /// conditionals and schemas.
    ///
    /// # Errors
    ///
    /// - `MisplacedMessage` if a message appears after the first argument
    /// - `CircularSchema` if any schema reaches a node twice
    pub fn new<I>(args: I) -> DefinitionResult<Self>
    where
        I: IntoIterator<Item = RestrictionArg>,
    {
        Ok(Self::from_parts(Parts::parse(args)?))
    }

    /// A restriction with a single predicate
    pub fn predicate<F>(message: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::with_conditional(message.into(), Conditional::predicate(f))
    }

    /// A restriction with a single assertion
    pub fn assertion<F, E>(message: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), E> + Send + Sync + 'static,
        E: Into<AssertionError>,
    {
        Self::with_conditional(message.into(), Conditional::assertion(f))
    }

    fn with_conditional(message: String, conditional: Conditional) -> Self {
        Self::all(message, vec![conditional])
    }

    /// Explicit message over conditionals checked in order; cannot fail
    pub(crate) fn all(message: String, conditionals: Vec<Conditional>) -> Self {
        Self::from_parts(Parts {
            message,
            explicit: true,
            conditionals,
            schemas: Vec::new(),
        })
    }

    fn from_parts(parts: Parts) -> Self {
        Self {
            inner: Arc::new(Inner {
                message: RwLock::new(parts.message),
                conditionals: parts.conditionals,
                schemas: parts.schemas,
            }),
        }
    }

    /// Current message
    pub fn message(&self) -> String {
        self.inner
            .message
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the message in place
    pub fn set_message(&self, message: impl Into<String>) {
        *self.inner.message.write().unwrap_or_else(|e| e.into_inner()) = message.into();
    }

    /// Replace the message and return this same restriction
    pub fn msg(&self, message: impl Into<String>) -> Self {
        self.set_message(message);
        self.clone()
    }

    /// Check one value: schemas first, then conditionals, in declaration order
    pub fn check(&self, value: &Value) -> RestrictionResult<()> {
        let message = self.message();

        let result = self
            .inner
            .schemas
            .iter()
            .try_for_each(|t| SchemaValidator::new(&message, t).validate(value))
            .and_then(|_| {
                self.inner
                    .conditionals
                    .iter()
                    .try_for_each(|c| c.check(&message, value, None))
            });

        if let Err(e) = &result {
            tracing::trace!(message = %message, depth = e.message_stack().len(), "value rejected");
        }
        result
    }

    /// Check `value` and hand it back unchanged
    pub fn validate<T: Borrow<Value>>(&self, value: T) -> RestrictionResult<T> {
        self.check(value.borrow())?;
        Ok(value)
    }

    /// Check every value in order and hand them all back unchanged
    pub fn validate_all<T: Borrow<Value>>(&self, values: Vec<T>) -> RestrictionResult<Vec<T>> {
        for v in &values {
            self.check(v.borrow())?;
        }
        Ok(values)
    }

    /// Logical disjunction with a restriction built from `args`.
    ///
    /// This restriction is tried first; the child only when it fails.
    pub fn or<I>(&self, args: I) -> DefinitionResult<Self>
    where
        I: IntoIterator<Item = RestrictionArg>,
    {
        self.combine(args, Junction::Or)
    }

    /// Logical conjunction with a restriction built from `args`.
    ///
    /// This restriction is checked first and short-circuits on failure.
    pub fn and<I>(&self, args: I) -> DefinitionResult<Self>
    where
        I: IntoIterator<Item = RestrictionArg>,
    {
        self.combine(args, Junction::And)
    }

    fn combine<I>(&self, args: I, junction: Junction) -> DefinitionResult<Self>
    where
        I: IntoIterator<Item = RestrictionArg>,
    {
        let parts = Parts::parse(args)?;
        let explicit = parts.explicit;
        let child_message = parts.message.clone();
        let child = Self::from_parts(parts);

        let base = self.clone();
        // A plain predicate: the composite reports only its own message.
        let conditional = match junction {
            Junction::Or => Conditional::predicate(move |v| {
                base.check(v).is_ok() || child.check(v).is_ok()
            }),
            Junction::And => Conditional::predicate(move |v| {
                base.check(v).is_ok() && child.check(v).is_ok()
            }),
        };

        let message = if explicit {
            child_message
        } else {
            let base_message = self.message();
            if base_message != DEFAULT_MESSAGE {
                format!("({} {} {})", base_message, junction.symbol(), child_message)
            } else {
                child_message
            }
        };

        Ok(Self::with_conditional(message, conditional))
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Restriction) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Restriction {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Restriction {}

impl fmt::Debug for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restriction")
            .field("message", &self.message())
            .field("conditionals", &self.inner.conditionals.len())
            .field("schemas", &self.inner.schemas.len())
            .finish()
    }
}

impl Default for Restriction {
    /// A restriction that accepts everything
    fn default() -> Self {
        Self::from_parts(Parts {
            message: DEFAULT_MESSAGE.to_string(),
            explicit: false,
            conditionals: Vec::new(),
            schemas: Vec::new(),
        })
    }
}
