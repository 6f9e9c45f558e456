//! Reflection: the sole sanctioned way translated and host code touches an
//! object entity.
//!
//! Every operation guards against null/undefined targets first, then
//! dispatches by payload shape. Violations are tier-one traps — the
//! translator never emits code that reaches them, so they indicate bridge
//! misuse rather than a program error.

use gonative_trap::{trap, Violation};

use crate::value::{join_values, Value};

/// Property get. Arrays accept keys that parse as non-negative integers
/// in range; a dictionary miss on an object entity yields `Null`.
pub fn get(target: &Value, key: &str) -> Value {
    if target.is_undefined() {
        trap(Violation::Forbidden(format!(
            "get on undefined (key: {key}) is forbidden"
        )));
    }
    if target.is_null() {
        trap(Violation::Forbidden(format!(
            "get on null (key: {key}) is forbidden"
        )));
    }
    if target.is_object() {
        return target.as_object().get(key);
    }
    if target.is_array() {
        if let Ok(index) = key.parse::<usize>() {
            if let Some(element) = target.as_array().borrow().get(index) {
                return element.clone();
            }
        }
    }
    trap(Violation::NotFound(format!("{target}.{key} not found")));
}

/// Property set. Only object entities are settable; the entity creates its
/// dictionary table on first write if it had none.
pub fn set(target: &Value, key: &str, value: Value) {
    if target.is_undefined() {
        trap(Violation::Forbidden(format!(
            "set on undefined (key: {key}) is forbidden"
        )));
    }
    if target.is_null() {
        trap(Violation::Forbidden(format!(
            "set on null (key: {key}) is forbidden"
        )));
    }
    if target.is_object() {
        target.as_object().set(key, value);
        return;
    }
    trap(Violation::NotWritable(format!(
        "{target}.{key} cannot be set"
    )));
}

/// Property delete. Only object entities; a no-op when the entity carries no
/// property table.
pub fn delete(target: &Value, key: &str) {
    if target.is_undefined() {
        trap(Violation::Forbidden(format!(
            "delete on undefined (key: {key}) is forbidden"
        )));
    }
    if target.is_null() {
        trap(Violation::Forbidden(format!(
            "delete on null (key: {key}) is forbidden"
        )));
    }
    if target.is_object() {
        target.as_object().delete(key);
        return;
    }
    trap(Violation::NotWritable(format!(
        "{target}.{key} cannot be deleted"
    )));
}

/// `new`-style call. The target must be a constructor entity; its function
/// receives the entity itself as the receiver.
pub fn construct(target: &Value, args: Vec<Value>) -> Value {
    if target.is_undefined() {
        trap(Violation::Forbidden("new on undefined is forbidden".to_string()));
    }
    if target.is_null() {
        trap(Violation::Forbidden("new on null is forbidden".to_string()));
    }
    if target.is_object() {
        let object = target.as_object();
        if !object.is_constructor() {
            trap(Violation::NotCallable(format!("{object} is not a constructor")));
        }
        let Some(func) = object.callable() else {
            trap(Violation::NotCallable(format!("{object} is not a function")));
        };
        return func(target.clone(), args);
    }
    trap(Violation::NotCallable(format!(
        "new {target}({}) cannot be called",
        join_values(&args)
    )));
}

/// Plain call with an explicit receiver. The target must be a callable
/// non-constructor entity.
pub fn apply(target: &Value, receiver: Value, args: Vec<Value>) -> Value {
    if target.is_undefined() {
        trap(Violation::Forbidden("apply on undefined is forbidden".to_string()));
    }
    if target.is_null() {
        trap(Violation::Forbidden("apply on null is forbidden".to_string()));
    }
    if target.is_object() {
        let object = target.as_object();
        if object.is_constructor() {
            trap(Violation::NotCallable(format!("{object} is a constructor")));
        }
        let Some(func) = object.callable() else {
            trap(Violation::NotCallable(format!("{object} is not a function")));
        };
        return func(receiver, args);
    }
    trap(Violation::NotCallable(format!(
        "{target}({}) cannot be called",
        join_values(&args)
    )));
}
