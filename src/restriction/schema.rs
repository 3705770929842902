//! Structural schemas
//!
//! A `Schema` is a shared handle to a sequence (position-indexed, fixed length)
//! or a mapping (key-indexed) whose leaves are `Conditional`s. Handles can be
//! extended after creation, so a schema can be made to reach itself; such
//! schemas are rejected when a restriction is built from them.
//!
//! Restrictions never hold `Schema` handles. `Template::compile` copies the
//! schema once into an index-addressed arena, so later edits to the handle
//! cannot change (or introduce a cycle into) a published restriction.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::conditional::Conditional;
use super::errors::{DefinitionError, DefinitionResult};
use super::combinator::Restriction;

/// A schema leaf or a nested schema
#[derive(Debug, Clone)]
pub enum SchemaEntry {
    Conditional(Conditional),
    Schema(Schema),
}

impl From<Conditional> for SchemaEntry {
    fn from(c: Conditional) -> Self {
        SchemaEntry::Conditional(c)
    }
}

impl From<Restriction> for SchemaEntry {
    fn from(r: Restriction) -> Self {
        SchemaEntry::Conditional(Conditional::Restriction(r))
    }
}

impl From<&Restriction> for SchemaEntry {
    fn from(r: &Restriction) -> Self {
        SchemaEntry::Conditional(Conditional::Restriction(r.clone()))
    }
}

impl From<Schema> for SchemaEntry {
    fn from(s: Schema) -> Self {
        SchemaEntry::Schema(s)
    }
}

impl From<&Schema> for SchemaEntry {
    fn from(s: &Schema) -> Self {
        SchemaEntry::Schema(s.clone())
    }
}

#[derive(Debug, Clone)]
enum Shape {
    Sequence(Vec<SchemaEntry>),
    Mapping(Vec<(String, SchemaEntry)>),
}

/// Shared handle to a schema node
#[derive(Clone)]
pub struct Schema {
    node: Arc<RwLock<Shape>>,
}

impl Schema {
    /// Create a sequence schema; values must be arrays of exactly this length
    pub fn sequence<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<SchemaEntry>,
    {
        Self::from_shape(Shape::Sequence(entries.into_iter().map(Into::into).collect()))
    }

    /// Create a mapping schema; values must be objects with exactly these keys.
    ///
    /// Later duplicates of a key replace earlier ones in place.
    pub fn mapping<I, K, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<String>,
        E: Into<SchemaEntry>,
    {
        let schema = Self::from_shape(Shape::Mapping(Vec::new()));
        for (key, entry) in entries {
            // Cannot fail: the shape was just created as a mapping
            let _ = schema.insert(key, entry);
        }
        schema
    }

    fn from_shape(shape: Shape) -> Self {
        Self {
            node: Arc::new(RwLock::new(shape)),
        }
    }

    /// Append an entry to a sequence schema
    pub fn push(&self, entry: impl Into<SchemaEntry>) -> DefinitionResult<()> {
        let mut shape = self.node.write().unwrap_or_else(|e| e.into_inner());
        match &mut *shape {
            Shape::Sequence(entries) => {
                entries.push(entry.into());
                Ok(())
            }
            Shape::Mapping(_) => Err(DefinitionError::ShapeMismatch { expected: "sequence" }),
        }
    }

    /// Set `key` on a mapping schema, replacing any previous entry
    pub fn insert(&self, key: impl Into<String>, entry: impl Into<SchemaEntry>) -> DefinitionResult<()> {
        let key = key.into();
        let entry = entry.into();
        let mut shape = self.node.write().unwrap_or_else(|e| e.into_inner());
        match &mut *shape {
            Shape::Mapping(entries) => {
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = entry,
                    None => entries.push((key, entry)),
                }
                Ok(())
            }
            Shape::Sequence(_) => Err(DefinitionError::ShapeMismatch { expected: "mapping" }),
        }
    }

    /// Whether this is a sequence schema
    pub fn is_sequence(&self) -> bool {
        matches!(&*self.read(), Shape::Sequence(_))
    }

    /// Number of positions or keys
    pub fn len(&self) -> usize {
        match &*self.read() {
            Shape::Sequence(entries) => entries.len(),
            Shape::Mapping(entries) => entries.len(),
        }
    }

    /// Whether the schema has no positions or keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Shape> {
        self.node.read().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self) -> Shape {
        self.read().clone()
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.node) as *const () as usize
    }
}

impl fmt::Debug for Schema {
    // Schemas may be cyclic before they are compiled; print the top level only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_sequence() { "sequence" } else { "mapping" };
        write!(f, "Schema({}, len={})", kind, self.len())
    }
}

/// A compiled schema position
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Conditional(Conditional),
    Node(usize),
}

/// A compiled schema node
#[derive(Debug, Clone)]
pub(crate) enum TemplateNode {
    Sequence(Vec<Slot>),
    Mapping(Vec<(String, Slot)>),
}

/// Immutable, acyclic copy of a schema; node 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct Template {
    nodes: Vec<TemplateNode>,
}

impl Template {
    /// Verify `schema` and copy it into an arena.
    ///
    /// Walks the schema with an explicit LIFO stack and an identity-keyed
    /// visited set. Visiting any node twice is rejected, which covers cycles
    /// and also a node shared between two positions.
    pub(crate) fn compile(schema: &Schema) -> DefinitionResult<Self> {
        let mut nodes: Vec<Option<TemplateNode>> = vec![None];
        let mut visited = HashSet::new();
        let mut stack = vec![(0usize, schema.clone())];

        while let Some((index, current)) = stack.pop() {
            if !visited.insert(current.id()) {
                tracing::debug!(node = index, "circular schema rejected");
                return Err(DefinitionError::CircularSchema);
            }

            let mut slot_for = |entry: SchemaEntry| match entry {
                SchemaEntry::Conditional(c) => Slot::Conditional(c),
                SchemaEntry::Schema(child) => {
                    let child_index = nodes.len();
                    nodes.push(None);
                    stack.push((child_index, child));
                    Slot::Node(child_index)
                }
            };

            let compiled = match current.snapshot() {
                Shape::Sequence(entries) => {
                    TemplateNode::Sequence(entries.into_iter().map(&mut slot_for).collect())
                }
                Shape::Mapping(entries) => TemplateNode::Mapping(
                    entries
                        .into_iter()
                        .map(|(key, entry)| (key, slot_for(entry)))
                        .collect(),
                ),
            };
            nodes[index] = Some(compiled);
        }

        // Every pushed index is popped exactly once before returning Ok
        Ok(Self {
            nodes: nodes.into_iter().flatten().collect(),
        })
    }

    pub(crate) fn node(&self, index: usize) -> &TemplateNode {
        &self.nodes[index]
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
