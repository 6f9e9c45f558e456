//! The dynamic host value.
//!
//! Every host boundary — property access, calls, I/O — trades in [`Value`].
//! It is the closed set of shapes the bridge understands: the six host-side
//! kinds, with the object kind split into its three mutually exclusive
//! payloads (byte buffer, object entity, array).
//!
//! Values are cheap to clone; string, buffer, object, and array payloads are
//! reference-counted, and clones alias the same payload. That aliasing is
//! deliberate: a byte buffer fetched out of a value and mutated in place is
//! visible through every other handle, which is how write-back into
//! caller-visible buffers works.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use gonative_trap::{trap, Violation};

use crate::object::JsObject;

/// The host-side kind of a [`Value`].
///
/// Byte buffers, object entities, and arrays all report [`Kind::Object`];
/// the payload shape distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    Null,
    Undefined,
    Bool,
    Number,
    String,
    Object,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A dynamically-typed host value.
///
/// The default value is `Null`. `Undefined` is a unit variant, so every
/// undefined value is the same distinguished singleton.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Bytes(Rc<RefCell<Vec<u8>>>),
    Object(Rc<JsObject>),
    Array(Rc<RefCell<Vec<Value>>>),
}

impl Value {
    /// The host-side kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Undefined => Kind::Undefined,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Bytes(_) | Value::Object(_) | Value::Array(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// The boolean payload. Any other kind traps.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            other => trap(Violation::KindMismatch(format!(
                "Value::as_bool: the kind must be Bool but was {}: {other}",
                other.kind()
            ))),
        }
    }

    /// The numeric payload. Any other kind traps.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            other => trap(Violation::KindMismatch(format!(
                "Value::as_number: the kind must be Number but was {}: {other}",
                other.kind()
            ))),
        }
    }

    /// An owned copy of the string payload. Any other kind traps.
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => trap(Violation::KindMismatch(format!(
                "Value::as_string: the kind must be String but was {}: {other}",
                other.kind()
            ))),
        }
    }

    /// The shared byte-buffer payload. Mutations through the returned handle
    /// are visible through every clone of this value. Any other kind traps.
    pub fn as_bytes(&self) -> Rc<RefCell<Vec<u8>>> {
        match self {
            Value::Bytes(b) => Rc::clone(b),
            other => trap(Violation::KindMismatch(format!(
                "Value::as_bytes: the payload must be a byte buffer but was {}: {other}",
                other.kind()
            ))),
        }
    }

    /// The object-entity payload. Any other kind traps.
    pub fn as_object(&self) -> Rc<JsObject> {
        match self {
            Value::Object(o) => Rc::clone(o),
            other => trap(Violation::KindMismatch(format!(
                "Value::as_object: the payload must be an object entity but was {}: {other}",
                other.kind()
            ))),
        }
    }

    /// The shared array payload. Any other kind traps.
    pub fn as_array(&self) -> Rc<RefCell<Vec<Value>>> {
        match self {
            Value::Array(a) => Rc::clone(a),
            other => trap(Violation::KindMismatch(format!(
                "Value::as_array: the payload must be an array but was {}: {other}",
                other.kind()
            ))),
        }
    }

    fn rank(&self) -> u8 {
        match self.kind() {
            Kind::Null => 0,
            Kind::Undefined => 1,
            Kind::Bool => 2,
            Kind::Number => 3,
            Kind::String => 4,
            Kind::Object => 5,
        }
    }

    fn numeric_key(&self) -> u64 {
        match self {
            Value::Bool(b) => *b as u64,
            Value::Number(n) => ordered_bits(*n),
            _ => 0,
        }
    }

    fn identity_key(&self) -> (usize, usize, usize) {
        match self {
            Value::String(s) => (Rc::as_ptr(s) as *const u8 as usize, 0, 0),
            Value::Bytes(b) => (Rc::as_ptr(b) as usize, 0, 0),
            Value::Object(o) => (0, Rc::as_ptr(o) as usize, 0),
            Value::Array(a) => (0, 0, Rc::as_ptr(a) as usize),
            _ => (0, 0, 0),
        }
    }
}

/// Map an f64 onto bits whose unsigned order matches a total order on the
/// doubles (negatives reversed, sign flipped). NaN sorts above infinities.
fn ordered_bits(n: f64) -> u64 {
    let bits = n.to_bits();
    if bits >> 63 == 0 {
        bits | (1 << 63)
    } else {
        !bits
    }
}

/// Ordering for use as a sorted-map key: lexicographic over (kind rank,
/// numeric payload, shared payload identity). This is an arbitrary but total
/// and stable order; it does not reflect host-language comparison semantics.
/// String and buffer payloads compare by shared-allocation identity, not
/// content, and NaN keys compare equal to themselves.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.rank(), self.numeric_key(), self.identity_key()).cmp(&(
            other.rank(),
            other.numeric_key(),
            other.identity_key(),
        ))
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

/// Human-readable representation: what `console.log` prints and what
/// diagnostics embed.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Object(o) => f.write_str(o.name()),
            Value::Bytes(_) | Value::Array(_) => f.write_str("(object)"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(Rc::from(s))
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Value {
        Value::Bytes(Rc::new(RefCell::new(bytes)))
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(values)))
    }
}

impl From<Rc<JsObject>> for Value {
    fn from(object: Rc<JsObject>) -> Value {
        Value::Object(object)
    }
}

impl From<JsObject> for Value {
    fn from(object: JsObject) -> Value {
        Value::Object(Rc::new(object))
    }
}

/// Join values with `", "` for diagnostics and console output.
pub(crate) fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
