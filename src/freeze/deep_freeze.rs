//! Deep freeze with an ambient whitelist
//!
//! Freezing follows every edge of the object graph: own property values,
//! accessor getters and setters, and prototype links. Walking prototypes
//! would eventually freeze shared ambient objects (the equivalent of
//! `Object.prototype`), so the guard snapshots everything reachable from an
//! ambient root at creation time and leaves those objects alone.
//!
//! Ambient objects added after the snapshot are not exempt.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::object::{HeapValue, ObjectRef, WeakObjectRef};

/// Recursive freezer that skips a fixed set of ambient objects
pub struct DeepFreeze {
    whitelist: HashMap<usize, WeakObjectRef>,
}

impl DeepFreeze {
    /// Snapshot every object reachable from `ambient` as exempt
    pub fn new(ambient: &ObjectRef) -> Self {
        let mut whitelist = HashMap::new();
        let mut stack = vec![ambient.clone()];

        while let Some(object) = stack.pop() {
            if whitelist.contains_key(&object.id()) {
                continue;
            }
            whitelist.insert(object.id(), object.downgrade());
            stack.extend(object.edges());
        }

        debug!(exempt = whitelist.len(), "ambient snapshot taken");
        Self { whitelist }
    }

    /// A guard with nothing exempt
    pub fn isolated() -> Self {
        Self {
            whitelist: HashMap::new(),
        }
    }

    /// Whether `object` was captured by the ambient snapshot
    pub fn is_exempt(&self, object: &ObjectRef) -> bool {
        self.whitelist
            .get(&object.id())
            .map_or(false, |w| w.refers_to(object))
    }

    /// Number of snapshot objects that are still alive.
    ///
    /// The snapshot never keeps an object alive on its own.
    pub fn exempt_count(&self) -> usize {
        self.whitelist.values().filter(|w| w.is_live()).count()
    }

    /// Freeze the graph behind `value` (if it is an object) and return it
    pub fn apply(&self, value: HeapValue) -> HeapValue {
        if let HeapValue::Object(object) = &value {
            self.freeze(object);
        }
        value
    }

    /// Freeze every non-exempt object reachable from `root` and return `root`.
    ///
    /// Exempt objects are still walked through, so non-exempt objects hanging
    /// off them are frozen.
    pub fn freeze(&self, root: &ObjectRef) -> ObjectRef {
        let mut visited = HashSet::new();
        let mut stack = vec![root.clone()];
        let (mut frozen, mut exempt) = (0usize, 0usize);

        while let Some(object) = stack.pop() {
            if !visited.insert(object.id()) {
                continue;
            }
            if self.is_exempt(&object) {
                exempt += 1;
            } else {
                object.freeze();
                frozen += 1;
            }
            stack.extend(object.edges());
        }

        debug!(frozen, exempt, "deep freeze applied");
        root.clone()
    }
}

impl std::fmt::Debug for DeepFreeze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepFreeze")
            .field("exempt", &self.whitelist.len())
            .finish()
    }
}
