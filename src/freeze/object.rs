//! Dynamic object model
//!
//! `ObjectRef` is a shared, identity-bearing object: plain, array or native
//! function. Each has ordered own properties, an optional prototype and a
//! one-way frozen flag.
//!
//! Freezing blocks adding, removing, redefining and reassigning properties
//! and changing the prototype. It does not block calling accessor setters that
//! were installed beforehand; that is how a frozen object keeps a settable
//! field.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use serde_json::{Map, Number, Value};

use super::errors::{ObjectError, ObjectResult};

/// Native function body: receiver and arguments in, value out
pub type NativeFn = Arc<dyn Fn(&ObjectRef, &[HeapValue]) -> ObjectResult<HeapValue> + Send + Sync>;

/// A value stored in an object property
#[derive(Debug, Clone, PartialEq)]
pub enum HeapValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(ObjectRef),
}

impl HeapValue {
    /// The object behind this value, if any
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            HeapValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The string behind this value, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeapValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Build a fresh object graph from JSON
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => HeapValue::Null,
            Value::Bool(b) => HeapValue::Bool(*b),
            Value::Number(n) => HeapValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => HeapValue::String(s.clone()),
            Value::Array(items) => {
                HeapValue::Object(ObjectRef::array(items.iter().map(HeapValue::from_json)))
            }
            Value::Object(map) => {
                let object = ObjectRef::new();
                {
                    let mut state = object.write();
                    for (k, v) in map {
                        state.properties.push((k.clone(), Property::Data(HeapValue::from_json(v))));
                    }
                }
                HeapValue::Object(object)
            }
        }
    }

    /// Convert to JSON, invoking getters.
    ///
    /// # Errors
    ///
    /// - `Circular` if an object reaches itself
    /// - `NotRepresentable` for functions and non-finite numbers
    pub fn to_json(&self) -> ObjectResult<Value> {
        self.to_json_on_path(&mut HashSet::new())
    }

    fn to_json_on_path(&self, path: &mut HashSet<usize>) -> ObjectResult<Value> {
        match self {
            HeapValue::Null => Ok(Value::Null),
            HeapValue::Bool(b) => Ok(Value::Bool(*b)),
            HeapValue::Number(n) => number_to_json(*n),
            HeapValue::String(s) => Ok(Value::String(s.clone())),
            HeapValue::Object(o) => o.to_json_on_path(path),
        }
    }
}

fn number_to_json(n: f64) -> ObjectResult<Value> {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return Ok(Value::from(n as i64));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or(ObjectError::NotRepresentable("non-finite number"))
}

impl From<Value> for HeapValue {
    fn from(v: Value) -> Self {
        HeapValue::from_json(&v)
    }
}

impl From<&str> for HeapValue {
    fn from(s: &str) -> Self {
        HeapValue::String(s.to_string())
    }
}

impl From<String> for HeapValue {
    fn from(s: String) -> Self {
        HeapValue::String(s)
    }
}

impl From<f64> for HeapValue {
    fn from(n: f64) -> Self {
        HeapValue::Number(n)
    }
}

impl From<bool> for HeapValue {
    fn from(b: bool) -> Self {
        HeapValue::Bool(b)
    }
}

impl From<ObjectRef> for HeapValue {
    fn from(o: ObjectRef) -> Self {
        HeapValue::Object(o)
    }
}

/// An own property
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Data(HeapValue),
    /// Getter/setter pair; each half is a function object
    Accessor {
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
    },
}

enum Kind {
    Plain,
    Array,
    Function(NativeFn),
}

#[derive(Default)]
struct State {
    properties: Vec<(String, Property)>,
    prototype: Option<ObjectRef>,
}

pub(crate) struct ObjectCell {
    kind: Kind,
    frozen: AtomicBool,
    state: RwLock<State>,
}

/// Shared handle to an object; clones refer to the same object
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

/// Non-owning handle used for identity sets
pub(crate) struct WeakObjectRef(Weak<ObjectCell>);

impl WeakObjectRef {
    pub(crate) fn refers_to(&self, object: &ObjectRef) -> bool {
        Weak::as_ptr(&self.0) == Arc::as_ptr(&object.0)
    }

    /// Whether the object is still alive somewhere else
    pub(crate) fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl ObjectRef {
    fn with_kind(kind: Kind) -> Self {
        Self(Arc::new(ObjectCell {
            kind,
            frozen: AtomicBool::new(false),
            state: RwLock::new(State::default()),
        }))
    }

    /// Empty plain object
    pub fn new() -> Self {
        Self::with_kind(Kind::Plain)
    }

    /// Empty plain object delegating to `prototype`
    pub fn with_prototype(prototype: &ObjectRef) -> Self {
        let object = Self::new();
        object.write().prototype = Some(prototype.clone());
        object
    }

    /// Array object with index properties "0".."n-1"
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = HeapValue>,
    {
        let object = Self::with_kind(Kind::Array);
        {
            let mut state = object.write();
            for (i, item) in items.into_iter().enumerate() {
                state.properties.push((i.to_string(), Property::Data(item)));
            }
        }
        object
    }

    /// Native function object
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&ObjectRef, &[HeapValue]) -> ObjectResult<HeapValue> + Send + Sync + 'static,
    {
        Self::with_kind(Kind::Function(Arc::new(f)))
    }

    /// Stable identity of this object
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.0.kind, Kind::Array)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.0.kind, Kind::Function(_))
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    /// Make this object (not its children) permanently immutable
    pub fn freeze(&self) {
        // Taken so no writer is midway through a mutation
        let _state = self.write();
        self.0.frozen.store(true, Ordering::Release);
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.0.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.0.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Own property keys in definition order
    pub fn keys(&self) -> Vec<String> {
        self.read().properties.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Own property descriptor
    pub fn own_property(&self, key: &str) -> Option<Property> {
        self.read()
            .properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.clone())
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.read().prototype.clone()
    }

    /// Find `key` on this object or along its prototype chain
    fn lookup(&self, key: &str) -> Option<Property> {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            if let Some(p) = object.own_property(key) {
                return Some(p);
            }
            current = object.prototype();
        }
        None
    }

    /// Read `key`, following the prototype chain and invoking getters
    pub fn get(&self, key: &str) -> ObjectResult<Option<HeapValue>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(Property::Data(v)) => Ok(Some(v)),
            Some(Property::Accessor { get: Some(getter), .. }) => {
                getter.call_with(self, &[]).map(Some)
            }
            Some(Property::Accessor { get: None, .. }) => Ok(None),
        }
    }

    /// Assign `key`.
    ///
    /// An accessor found on the chain has its setter invoked, frozen or not.
    /// Otherwise an own data property is written or created, which fails on a
    /// frozen object.
    pub fn set(&self, key: &str, value: impl Into<HeapValue>) -> ObjectResult<()> {
        let value = value.into();
        if let Some(Property::Accessor { set, .. }) = self.lookup(key) {
            return match set {
                Some(setter) => setter.call_with(self, &[value]).map(|_| ()),
                None => Err(ObjectError::NoSetter(key.to_string())),
            };
        }

        let mut state = self.write();
        let existing = state.properties.iter_mut().find(|(k, _)| k == key);
        if self.is_frozen() {
            return Err(match existing {
                Some(_) => ObjectError::ReadOnly(key.to_string()),
                None => ObjectError::NotExtensible(key.to_string()),
            });
        }
        match existing {
            Some((_, slot)) => *slot = Property::Data(value),
            None => state.properties.push((key.to_string(), Property::Data(value))),
        }
        Ok(())
    }

    /// Define (or redefine) `key` as a data property, bypassing accessors
    pub fn define(&self, key: &str, value: impl Into<HeapValue>) -> ObjectResult<()> {
        self.define_property(key, Property::Data(value.into()))
    }

    /// Define (or redefine) `key` as an accessor pair
    pub fn define_accessor(
        &self,
        key: &str,
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
    ) -> ObjectResult<()> {
        self.define_property(key, Property::Accessor { get, set })
    }

    fn define_property(&self, key: &str, property: Property) -> ObjectResult<()> {
        let mut state = self.write();
        if self.is_frozen() {
            return Err(ObjectError::Redefine(key.to_string()));
        }
        match state.properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = property,
            None => state.properties.push((key.to_string(), property)),
        }
        Ok(())
    }

    /// Remove an own property; returns whether it existed
    pub fn delete(&self, key: &str) -> ObjectResult<bool> {
        let mut state = self.write();
        if self.is_frozen() {
            return Err(ObjectError::Redefine(key.to_string()));
        }
        let before = state.properties.len();
        state.properties.retain(|(k, _)| k != key);
        Ok(state.properties.len() != before)
    }

    /// Replace the prototype link.
    ///
    /// Rejects links that would make the chain reach this object again.
    pub fn set_prototype(&self, prototype: Option<&ObjectRef>) -> ObjectResult<()> {
        let mut current = prototype.cloned();
        while let Some(object) = current {
            if object.ptr_eq(self) {
                return Err(ObjectError::InvalidArgument("Cyclic prototype chain".into()));
            }
            current = object.prototype();
        }

        let mut state = self.write();
        if self.is_frozen() {
            return Err(ObjectError::Redefine("prototype".into()));
        }
        state.prototype = prototype.cloned();
        Ok(())
    }

    /// Call this function with itself as receiver
    pub fn call(&self, args: &[HeapValue]) -> ObjectResult<HeapValue> {
        self.call_with(self, args)
    }

    /// Call this function with an explicit receiver
    pub fn call_with(&self, this: &ObjectRef, args: &[HeapValue]) -> ObjectResult<HeapValue> {
        match &self.0.kind {
            Kind::Function(f) => f(this, args),
            _ => Err(ObjectError::NotCallable),
        }
    }

    /// Objects directly reachable: property values, accessor halves, prototype
    pub(crate) fn edges(&self) -> Vec<ObjectRef> {
        let state = self.read();
        let mut out = Vec::new();
        for (_, property) in &state.properties {
            match property {
                Property::Data(HeapValue::Object(o)) => out.push(o.clone()),
                Property::Data(_) => {}
                Property::Accessor { get, set } => {
                    out.extend(get.iter().cloned());
                    out.extend(set.iter().cloned());
                }
            }
        }
        out.extend(state.prototype.iter().cloned());
        out
    }

    /// Convert to JSON; see `HeapValue::to_json`
    pub fn to_json(&self) -> ObjectResult<Value> {
        self.to_json_on_path(&mut HashSet::new())
    }

    fn to_json_on_path(&self, path: &mut HashSet<usize>) -> ObjectResult<Value> {
        if !path.insert(self.id()) {
            return Err(ObjectError::Circular);
        }

        let out = match &self.0.kind {
            Kind::Function(_) => return Err(ObjectError::NotRepresentable("function")),
            Kind::Array => {
                let len = self
                    .keys()
                    .iter()
                    .filter_map(|k| k.parse::<usize>().ok())
                    .max()
                    .map_or(0, |i| i + 1);
                let mut items = Vec::with_capacity(len);
                for i in 0..len {
                    items.push(match self.get(&i.to_string())? {
                        Some(v) => v.to_json_on_path(path)?,
                        None => Value::Null,
                    });
                }
                Value::Array(items)
            }
            Kind::Plain => {
                let mut map = Map::new();
                for key in self.keys() {
                    if let Some(v) = self.get(&key)? {
                        map.insert(key, v.to_json_on_path(path)?);
                    }
                }
                Value::Object(map)
            }
        };

        path.remove(&self.id());
        Ok(out)
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    // Graphs may be cyclic; never descend.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.0.kind {
            Kind::Plain => "object",
            Kind::Array => "array",
            Kind::Function(_) => "function",
        };
        write!(f, "ObjectRef({} #{:x}{})", kind, self.id(), if self.is_frozen() { ", frozen" } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_and_prototype_lookup() {
        let proto = ObjectRef::new();
        proto.set("inherited", 1.0).unwrap();

        let object = ObjectRef::with_prototype(&proto);
        object.set("own", "x").unwrap();

        assert_eq!(object.get("own").unwrap(), Some(HeapValue::from("x")));
        assert_eq!(object.get("inherited").unwrap(), Some(HeapValue::Number(1.0)));
        assert_eq!(object.get("missing").unwrap(), None);
    }

    #[test]
    fn test_frozen_rejects_mutation() {
        let object = ObjectRef::new();
        object.set("a", 1.0).unwrap();
        object.freeze();

        assert_eq!(object.set("a", 2.0).unwrap_err(), ObjectError::ReadOnly("a".into()));
        assert_eq!(object.set("b", 2.0).unwrap_err(), ObjectError::NotExtensible("b".into()));
        assert!(object.delete("a").is_err());
        assert!(object.define("a", 3.0).is_err());
        assert!(object.set_prototype(None).is_err());
        assert_eq!(object.get("a").unwrap(), Some(HeapValue::Number(1.0)));
    }

    #[test]
    fn test_accessor_setter_survives_freeze() {
        let store = Arc::new(RwLock::new(String::from("initial")));

        let read = Arc::clone(&store);
        let getter = ObjectRef::function(move |_, _| Ok(HeapValue::String(read.read().unwrap().clone())));
        let write = Arc::clone(&store);
        let setter = ObjectRef::function(move |_, args| {
            if let Some(HeapValue::String(s)) = args.first() {
                *write.write().unwrap() = s.clone();
            }
            Ok(HeapValue::Null)
        });

        let object = ObjectRef::new();
        object.define_accessor("field", Some(getter), Some(setter)).unwrap();
        object.freeze();

        object.set("field", "updated").unwrap();
        assert_eq!(object.get("field").unwrap(), Some(HeapValue::from("updated")));
        assert!(object.define_accessor("field", None, None).is_err());
    }

    #[test]
    fn test_getter_only_accessor() {
        let object = ObjectRef::new();
        let getter = ObjectRef::function(|_, _| Ok(HeapValue::Bool(true)));
        object.define_accessor("ro", Some(getter), None).unwrap();
        assert_eq!(object.set("ro", false).unwrap_err(), ObjectError::NoSetter("ro".into()));
    }

    #[test]
    fn test_call() {
        let f = ObjectRef::function(|_, args| Ok(args.first().cloned().unwrap_or(HeapValue::Null)));
        assert_eq!(f.call(&[HeapValue::Bool(true)]).unwrap(), HeapValue::Bool(true));
        assert_eq!(ObjectRef::new().call(&[]).unwrap_err(), ObjectError::NotCallable);
    }

    #[test]
    fn test_json_round_trip() {
        let value = json!({"a": [1, 2.5, "x"], "b": {"c": null, "d": true}});
        let heap = HeapValue::from_json(&value);
        assert_eq!(heap.to_json().unwrap(), value);
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        let value: Value = serde_json::from_str(r#"{"zeta": 1, "beta": 2, "mid": 3}"#).unwrap();
        let object = HeapValue::from_json(&value).as_object().cloned().unwrap();
        assert_eq!(object.keys(), vec!["zeta", "beta", "mid"]);
    }

    #[test]
    fn test_circular_to_json() {
        let object = ObjectRef::new();
        object.set("self", object.clone()).unwrap();
        assert_eq!(object.to_json().unwrap_err(), ObjectError::Circular);
        // Break the cycle so the test does not leak
        object.delete("self").unwrap();
    }

    #[test]
    fn test_shared_child_is_not_circular() {
        let child = ObjectRef::new();
        let parent = ObjectRef::new();
        parent.set("a", child.clone()).unwrap();
        parent.set("b", child).unwrap();
        assert_eq!(parent.to_json().unwrap(), json!({"a": {}, "b": {}}));
    }

    #[test]
    fn test_cyclic_prototype_rejected() {
        let a = ObjectRef::new();
        let b = ObjectRef::with_prototype(&a);
        assert!(a.set_prototype(Some(&b)).is_err());
    }

    #[test]
    fn test_edges() {
        let proto = ObjectRef::new();
        let child = ObjectRef::new();
        let object = ObjectRef::with_prototype(&proto);
        object.set("child", child.clone()).unwrap();
        object.set("n", 1.0).unwrap();

        let edges = object.edges();
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().any(|e| e.ptr_eq(&child)));
        assert!(edges.iter().any(|e| e.ptr_eq(&proto)));
    }
}
