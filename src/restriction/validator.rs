//! Schema traversal
//!
//! Validation semantics:
//! - Sequence templates need an array of exactly the template's length
//! - Mapping templates need an object with exactly the template's keys
//! - Leaves are checked with their `Conditional`
//! - The first mismatch aborts the whole call; nothing is aggregated
//!
//! Traversal uses an explicit stack, so depth is bounded by memory rather than
//! by the call stack.

use serde_json::Value;

use super::errors::{RestrictionError, RestrictionResult};
use super::schema::{Slot, Template, TemplateNode};

/// Validates values against one compiled template.
///
/// Failures raised here carry `message` as the outermost entry, with the
/// structural diagnostic (or the failing nested restriction's stack) beneath.
pub(crate) struct SchemaValidator<'a> {
    message: &'a str,
    template: &'a Template,
}

impl<'a> SchemaValidator<'a> {
    pub(crate) fn new(message: &'a str, template: &'a Template) -> Self {
        Self { message, template }
    }

    /// Validate `root` against the template.
    pub(crate) fn validate(&self, root: &Value) -> RestrictionResult<()> {
        let mut stack: Vec<(usize, &Value)> = vec![(0, root)];

        while let Some((index, value)) = stack.pop() {
            match self.template.node(index) {
                TemplateNode::Sequence(slots) => {
                    let items = value
                        .as_array()
                        .ok_or_else(|| self.structural(value, root, "Must be an Array".into()))?;

                    if items.len() != slots.len() {
                        return Err(self.structural(
                            value,
                            root,
                            format!("Must be an Array of length {}", slots.len()),
                        ));
                    }

                    for (slot, item) in slots.iter().zip(items) {
                        self.visit(slot, item, root, &mut stack)?;
                    }
                }
                TemplateNode::Mapping(entries) => {
                    let object = value
                        .as_object()
                        .ok_or_else(|| self.structural(value, root, "Must be an Object".into()))?;

                    // Extra and missing keys share one diagnostic text.
                    for key in object.keys() {
                        if !entries.iter().any(|(k, _)| k == key) {
                            return Err(self.structural(value, root, missing_key(key)));
                        }
                    }

                    for (key, slot) in entries {
                        let item = object
                            .get(key)
                            .ok_or_else(|| self.structural(value, root, missing_key(key)))?;
                        self.visit(slot, item, root, &mut stack)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn visit<'v>(
        &self,
        slot: &Slot,
        item: &'v Value,
        root: &Value,
        stack: &mut Vec<(usize, &'v Value)>,
    ) -> RestrictionResult<()> {
        match slot {
            Slot::Conditional(c) => c.check(self.message, item, Some(root)),
            Slot::Node(child) => {
                stack.push((*child, item));
                Ok(())
            }
        }
    }

    /// A shape mismatch: the diagnostic sits beneath this level's message.
    fn structural(&self, value: &Value, root: &Value, diagnostic: String) -> RestrictionError {
        let source =
            RestrictionError::from_parts(value.clone(), Some(root.clone()), Some(diagnostic), None);
        RestrictionError::from_parts(
            value.clone(),
            Some(root.clone()),
            Some(self.message.to_string()),
            Some(&source),
        )
    }
}

fn missing_key(key: &str) -> String {
    format!("Must be an Object containing key \"{}\"", key)
}
