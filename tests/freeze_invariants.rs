//! Freeze Invariant Tests
//!
//! Tests for deep immutability:
//! - Everything reachable from a frozen value rejects mutation
//! - Prototype chains are frozen too
//! - Ambient objects captured at guard creation are left alone
//! - Ambient objects added later are frozen
//! - A published restriction is frozen but keeps a settable message

use restrictor::freeze::{DeepFreeze, HeapValue, ObjectError, ObjectRef};
use restrictor::presets::string;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn nested() -> ObjectRef {
    match HeapValue::from_json(&json!({"foo": "bar", "bar": {"baz": {"beh": "quux"}}})) {
        HeapValue::Object(o) => o,
        other => panic!("expected object, got {:?}", other),
    }
}

fn path(object: &ObjectRef, keys: &[&str]) -> ObjectRef {
    let mut current = object.clone();
    for key in keys {
        current = match current.get(key).unwrap() {
            Some(HeapValue::Object(o)) => o,
            other => panic!("expected object at {}, got {:?}", key, other),
        };
    }
    current
}

fn assert_locked(object: &ObjectRef, existing: &str) {
    assert!(matches!(object.set(existing, "changed"), Err(ObjectError::ReadOnly(_))));
    assert!(matches!(object.set("added", "new"), Err(ObjectError::NotExtensible(_))));
    assert_eq!(object.get("added").unwrap(), None);
}

// =============================================================================
// Ambient Whitelist
// =============================================================================

#[test]
fn test_ambient_props_whitelisted_at_construction() {
    let ambient = ObjectRef::new();
    let tmp = ObjectRef::new();
    tmp.set("foo", "bar").unwrap();
    ambient.set("tmpWhitelistTest", tmp.clone()).unwrap();

    let guard = DeepFreeze::new(&ambient);
    guard.freeze(&ambient);

    tmp.set("bar", "baz").unwrap();
    assert_eq!(tmp.get("bar").unwrap(), Some(HeapValue::from("baz")));
}

#[test]
fn test_ambient_prototype_chains_whitelisted() {
    let ambient = ObjectRef::new();
    let tmp_proto = ObjectRef::new();
    tmp_proto.set("foo", "bar").unwrap();
    let tmp = ObjectRef::with_prototype(&tmp_proto);
    ambient.set("tmpWhitelistTest", tmp).unwrap();

    let guard = DeepFreeze::new(&ambient);
    guard.freeze(&tmp_proto);

    tmp_proto.set("bar", "baz").unwrap();
    assert_eq!(tmp_proto.get("bar").unwrap(), Some(HeapValue::from("baz")));
}

#[test]
fn test_ambient_props_added_later_are_frozen() {
    let ambient = ObjectRef::new();
    let guard = DeepFreeze::new(&ambient);

    let tmp = nested();
    ambient.set("tmpWhitelistTest", tmp.clone()).unwrap();
    guard.freeze(&ambient);

    assert!(!ambient.is_frozen());
    let baz = path(&tmp, &["bar", "baz"]);
    assert_locked(&baz, "beh");
    assert_eq!(baz.get("beh").unwrap(), Some(HeapValue::from("quux")));
}

// =============================================================================
// Local Values
// =============================================================================

#[test]
fn test_local_props_frozen() {
    let tmp = nested();
    let returned = DeepFreeze::isolated().freeze(&tmp);
    assert!(returned.ptr_eq(&tmp));

    let baz = path(&tmp, &["bar", "baz"]);
    assert_locked(&baz, "beh");
    assert_locked(&tmp, "foo");
    assert_eq!(baz.get("beh").unwrap(), Some(HeapValue::from("quux")));
}

#[test]
fn test_prototype_chain_frozen() {
    let tmp_proto = match HeapValue::from_json(&json!({"baz": "beeeeh", "qux": {"quz": {"quux": "quuz"}}})) {
        HeapValue::Object(o) => o,
        other => panic!("expected object, got {:?}", other),
    };
    let tmp = ObjectRef::with_prototype(&tmp_proto);
    tmp.set("foo", "bar").unwrap();

    let quz = path(&tmp, &["qux", "quz"]);
    quz.set("bah", "bar").unwrap();

    DeepFreeze::isolated().freeze(&tmp);

    assert!(tmp.prototype().unwrap().ptr_eq(&tmp_proto));
    assert_locked(&quz, "bah");
    assert_eq!(quz.get("bah").unwrap(), Some(HeapValue::from("bar")));
    assert!(tmp.set_prototype(None).is_err());
}

#[test]
fn test_freeze_is_idempotent() {
    let tmp = nested();
    let guard = DeepFreeze::isolated();
    guard.freeze(&tmp);
    guard.freeze(&tmp);
    assert!(tmp.is_frozen());
    assert_eq!(tmp.to_json().unwrap(), json!({"foo": "bar", "bar": {"baz": {"beh": "quux"}}}));
}

#[test]
fn test_guard_shared_across_threads() {
    let guard = std::sync::Arc::new(DeepFreeze::isolated());
    let values: Vec<ObjectRef> = (0..4).map(|_| nested()).collect();

    std::thread::scope(|s| {
        for value in &values {
            let guard = guard.clone();
            s.spawn(move || {
                guard.freeze(value);
            });
        }
    });

    assert!(values.iter().all(ObjectRef::is_frozen));
}

// =============================================================================
// Published Restrictions
// =============================================================================

#[test]
fn test_published_restriction() {
    let r = string();
    let published = r.publish(&DeepFreeze::isolated()).unwrap();

    assert!(published.is_function());
    assert!(published.is_frozen());

    assert_eq!(published.call(&[HeapValue::from("foo")]).unwrap(), HeapValue::from("foo"));
    let err = published.call(&[HeapValue::Number(42.0)]).unwrap_err();
    assert_eq!(err.to_string(), "Must be a 'string'");
    assert_eq!(err.as_restriction().unwrap().code(), "ERR_RESTRICTION");
}

#[test]
fn test_published_message_setter() {
    let r = string();
    let published = r.publish(&DeepFreeze::isolated()).unwrap();

    published
        .set("message", "Calling r with a non-string results in a throw!")
        .unwrap();
    let err = published.call(&[HeapValue::Number(42.0)]).unwrap_err();
    assert_eq!(err.to_string(), "Calling r with a non-string results in a throw!");

    let err = published.set("message", 42.0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "[restrictor] Invalid Argument: restriction.message must be a string"
    );
}

#[test]
fn test_published_multi_value_call() {
    let published = string().publish(&DeepFreeze::isolated()).unwrap();
    let out = published
        .call(&[HeapValue::from("foo"), HeapValue::from("bar")])
        .unwrap();
    assert_eq!(out.to_json().unwrap(), json!(["foo", "bar"]));
}

#[test]
fn test_published_rejects_circular_argument() {
    let published = string().publish(&DeepFreeze::isolated()).unwrap();
    let cyclic = ObjectRef::new();
    cyclic.set("self", cyclic.clone()).unwrap();

    let err = published.call(&[HeapValue::Object(cyclic.clone())]).unwrap_err();
    assert_eq!(err, ObjectError::Circular);
    cyclic.delete("self").unwrap();
}
