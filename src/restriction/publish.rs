//! Publishing a restriction onto the object model
//!
//! The published form is a frozen function object:
//! - calling it validates every argument and returns the sole argument, or an
//!   array of all arguments
//! - `message` is an accessor pair; the setter keeps working after freezing
//! - `msg(m)` sets the message and returns the receiver
//!
//! Nothing else on the object can be changed.

use tracing::debug;

use super::combinator::Restriction;
use crate::freeze::{DeepFreeze, HeapValue, ObjectError, ObjectRef, ObjectResult};

fn message_arg(args: &[HeapValue]) -> ObjectResult<String> {
    match args.first() {
        Some(HeapValue::String(s)) => Ok(s.clone()),
        _ => Err(ObjectError::InvalidArgument(
            "restriction.message must be a string".into(),
        )),
    }
}

impl Restriction {
    /// Expose this restriction as a frozen, callable object.
    ///
    /// The returned object shares this restriction's message: setting it
    /// through either side is visible from the other.
    ///
    /// # Errors
    ///
    /// Propagates any failure to install `message` or `msg` on the function
    /// object before it is frozen.
    pub fn publish(&self, guard: &DeepFreeze) -> ObjectResult<ObjectRef> {
        let restriction = self.clone();
        let function = ObjectRef::function(move |_, args| {
            for arg in args {
                restriction.check(&arg.to_json()?)?;
            }
            Ok(match args {
                [single] => single.clone(),
                _ => HeapValue::Object(ObjectRef::array(args.iter().cloned())),
            })
        });

        let restriction = self.clone();
        let getter = ObjectRef::function(move |_, _| Ok(HeapValue::String(restriction.message())));

        let restriction = self.clone();
        let setter = ObjectRef::function(move |_, args| {
            restriction.set_message(message_arg(args)?);
            Ok(HeapValue::Null)
        });

        let restriction = self.clone();
        let msg = ObjectRef::function(move |this, args| {
            restriction.set_message(message_arg(args)?);
            Ok(HeapValue::Object(this.clone()))
        });

        function.define_accessor("message", Some(getter), Some(setter))?;
        function.define("msg", msg)?;

        let published = guard.freeze(&function);
        debug!(message = %self.message(), "restriction published");
        Ok(published)
    }
}
