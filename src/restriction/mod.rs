//! Value restrictions
//!
//! A `Restriction` checks values against conditionals and structural schemas
//! and raises a `RestrictionError` with the full causal message chain on the
//! first failure. Restrictions compose with `or` and `and`, and nest inside
//! schemas and other restrictions.
//!
//! Construction mistakes (misplaced messages, circular schemas) are reported
//! separately as `DefinitionError` and never as a validation failure.

mod combinator;
mod conditional;
mod errors;
mod publish;
mod schema;
mod validator;

pub use combinator::{Restriction, DEFAULT_MESSAGE};
pub use conditional::{AssertionError, Conditional, RestrictionArg};
pub use errors::{
    DefinitionError, DefinitionResult, RestrictionError, RestrictionResult, DEFAULT_ERROR_MESSAGE,
    ERR_RESTRICTION,
};
pub use schema::{Schema, SchemaEntry};
