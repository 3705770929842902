//! restrictor - composable, immutable value restrictions
//!
//! Restrictions check values (as `serde_json::Value`) against conditionals and
//! structural schemas, and fail with a structured error carrying the full
//! causal chain of messages.

pub mod cli;
pub mod freeze;
pub mod observability;
pub mod presets;
pub mod restriction;

pub use freeze::{DeepFreeze, HeapValue, ObjectError, ObjectRef, Property};
pub use restriction::{
    Conditional, DefinitionError, DefinitionResult, Restriction, RestrictionArg,
    RestrictionError, RestrictionResult, Schema, SchemaEntry,
};
