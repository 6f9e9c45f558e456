//! Object entities: the named, property-bearing, callable things behind
//! [`Value::Object`](crate::Value::Object).
//!
//! Property storage is polymorphic behind the [`Properties`] capability:
//! the common case is the ordered dictionary ([`DictProperties`]), and
//! generated code attaches custom implementations for virtual or computed
//! properties (e.g. its runtime-bridge handles) via [`JsObject::with_table`].
//!
//! Callable entities are partitioned by the constructor flag: an entity is
//! invoked either via `construct` or via `apply`/`invoke`, never both. The
//! calling conventions for `new Foo()` and `Foo()` call sites diverge in
//! translated code, so collapsing the two would silently break
//! constructor-only globals like `Uint8Array`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use gonative_trap::{trap, Violation};

use crate::value::Value;

/// The function payload of a callable entity: `(receiver, args) -> result`.
pub type JsFunc = Box<dyn Fn(Value, Vec<Value>) -> Value>;

/// Capability interface for an entity's property table.
pub trait Properties {
    /// Look up a property. A missing key is `Null`, not an error.
    fn get(&mut self, key: &str) -> Value;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// The plain string-to-value dictionary table.
#[derive(Default)]
pub struct DictProperties {
    dict: BTreeMap<String, Value>,
}

impl DictProperties {
    pub fn new(dict: BTreeMap<String, Value>) -> DictProperties {
        DictProperties { dict }
    }
}

impl Properties for DictProperties {
    fn get(&mut self, key: &str) -> Value {
        self.dict.get(key).cloned().unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.dict.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.dict.remove(key);
    }
}

const ANONYMOUS: &str = "(JSObject)";

/// A host object entity.
///
/// Entities are shared via `Rc`, so mutation goes through interior
/// mutability; `set` lazily creates the dictionary table on an entity that
/// was built without one.
pub struct JsObject {
    name: String,
    properties: RefCell<Option<Box<dyn Properties>>>,
    func: Option<JsFunc>,
    ctor: bool,
}

impl JsObject {
    /// A named placeholder with no properties and no function.
    pub fn named(name: &str) -> JsObject {
        JsObject {
            name: name.to_string(),
            properties: RefCell::new(None),
            func: None,
            ctor: false,
        }
    }

    /// A named entity with a dictionary property table.
    pub fn with_properties(name: &str, properties: BTreeMap<String, Value>) -> JsObject {
        JsObject {
            name: name.to_string(),
            properties: RefCell::new(Some(Box::new(DictProperties::new(properties)))),
            func: None,
            ctor: false,
        }
    }

    /// An anonymous entity with a dictionary property table.
    pub fn from_map(properties: BTreeMap<String, Value>) -> JsObject {
        JsObject {
            name: ANONYMOUS.to_string(),
            properties: RefCell::new(Some(Box::new(DictProperties::new(properties)))),
            func: None,
            ctor: false,
        }
    }

    /// A named entity backed by a custom property table.
    pub fn with_table(name: &str, table: Box<dyn Properties>) -> JsObject {
        JsObject {
            name: name.to_string(),
            properties: RefCell::new(Some(table)),
            func: None,
            ctor: false,
        }
    }

    /// An anonymous plain function.
    pub fn function(func: impl Fn(Value, Vec<Value>) -> Value + 'static) -> JsObject {
        JsObject {
            name: ANONYMOUS.to_string(),
            properties: RefCell::new(None),
            func: Some(Box::new(func)),
            ctor: false,
        }
    }

    /// A named constructor-only entity, invocable solely via `construct`.
    pub fn constructor(
        name: &str,
        func: impl Fn(Value, Vec<Value>) -> Value + 'static,
    ) -> JsObject {
        JsObject {
            name: name.to_string(),
            properties: RefCell::new(None),
            func: Some(Box::new(func)),
            ctor: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_function(&self) -> bool {
        self.func.is_some()
    }

    pub fn is_constructor(&self) -> bool {
        self.ctor
    }

    pub(crate) fn callable(&self) -> Option<&JsFunc> {
        self.func.as_ref()
    }

    /// Look up a property. An entity without any property table traps; a
    /// dictionary miss on an entity that has one yields `Null`.
    pub fn get(&self, key: &str) -> Value {
        match self.properties.borrow_mut().as_mut() {
            Some(table) => table.get(key),
            None => trap(Violation::NotFound(format!("{}.{key} not found", self.name))),
        }
    }

    /// Write a property, creating the dictionary table on first write if the
    /// entity was built without one.
    pub fn set(&self, key: &str, value: Value) {
        self.properties
            .borrow_mut()
            .get_or_insert_with(|| Box::new(DictProperties::default()) as Box<dyn Properties>)
            .set(key, value);
    }

    /// Remove a property. A no-op on an entity without a property table.
    pub fn delete(&self, key: &str) {
        if let Some(table) = self.properties.borrow_mut().as_mut() {
            table.remove(key);
        }
    }

    /// Plain call with no explicit receiver; the receiver is `Undefined`.
    /// Traps on a non-function and on a constructor.
    pub fn invoke(&self, args: Vec<Value>) -> Value {
        let Some(func) = &self.func else {
            trap(Violation::NotCallable(format!(
                "{0} is not invokable since {0} is not a function",
                self.name
            )));
        };
        if self.ctor {
            trap(Violation::NotCallable(format!(
                "{0} is not invokable since {0} is a constructor",
                self.name
            )));
        }
        func(Value::Undefined, args)
    }
}

impl fmt::Display for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("name", &self.name)
            .field("has_properties", &self.properties.borrow().is_some())
            .field("is_function", &self.is_function())
            .field("is_constructor", &self.ctor)
            .finish()
    }
}
