//! Deep immutability over a dynamic object model
//!
//! `ObjectRef` models shared, mutable, possibly cyclic objects with prototype
//! links and accessor properties. `DeepFreeze` makes a whole graph of them
//! read-only while leaving a snapshot of ambient objects untouched.

mod deep_freeze;
mod errors;
mod object;

pub use deep_freeze::DeepFreeze;
pub use errors::{ObjectError, ObjectResult};
pub use object::{HeapValue, NativeFn, ObjectRef, Property};
