//! Integration tests for the dynamic value type.
//!
//! Covers:
//! - kind reporting and predicates
//! - payload accessors, including the trap on kind mismatch
//! - shared-payload aliasing (buffer write-back visibility)
//! - the total order used for map keying
//! - display (inspect) representations

use std::collections::BTreeMap;

use gonative_js::{JsObject, Kind, Value};

#[test]
fn default_is_null() {
    assert!(Value::default().is_null());
    assert_eq!(Value::default().kind(), Kind::Null);
}

#[test]
fn kinds_cover_every_shape() {
    assert_eq!(Value::Undefined.kind(), Kind::Undefined);
    assert_eq!(Value::from(true).kind(), Kind::Bool);
    assert_eq!(Value::from(1.5).kind(), Kind::Number);
    assert_eq!(Value::from("s").kind(), Kind::String);
    // The three object sub-forms all report Kind::Object.
    assert_eq!(Value::from(vec![1u8]).kind(), Kind::Object);
    assert_eq!(Value::from(JsObject::named("x")).kind(), Kind::Object);
    assert_eq!(Value::from(vec![Value::Null]).kind(), Kind::Object);
}

#[test]
fn object_sub_forms_are_mutually_exclusive() {
    let bytes = Value::from(vec![0u8; 2]);
    assert!(bytes.is_bytes() && !bytes.is_object() && !bytes.is_array());

    let entity = Value::from(JsObject::named("e"));
    assert!(entity.is_object() && !entity.is_bytes() && !entity.is_array());

    let array = Value::from(vec![Value::Null]);
    assert!(array.is_array() && !array.is_bytes() && !array.is_object());
}

#[test]
fn accessors_return_payloads() {
    assert!(Value::from(true).as_bool());
    assert_eq!(Value::from(2.5).as_number(), 2.5);
    assert_eq!(Value::from("text").as_string(), "text");
    assert_eq!(*Value::from(vec![7u8, 8]).as_bytes().borrow(), vec![7, 8]);
    assert_eq!(Value::from(JsObject::named("thing")).as_object().name(), "thing");
    assert_eq!(Value::from(vec![Value::from(1.0)]).as_array().borrow().len(), 1);
}

#[test]
#[should_panic(expected = "the kind must be Number")]
fn as_number_on_a_string_traps() {
    Value::from("nope").as_number();
}

#[test]
#[should_panic(expected = "the kind must be Bool")]
fn as_bool_on_null_traps() {
    Value::Null.as_bool();
}

#[test]
#[should_panic(expected = "the payload must be a byte buffer")]
fn as_bytes_on_an_entity_traps() {
    Value::from(JsObject::named("e")).as_bytes();
}

#[test]
fn clones_alias_the_byte_buffer() {
    let original = Value::from(vec![0u8; 4]);
    let copy = original.clone();

    copy.as_bytes().borrow_mut()[1] = 0xff;

    assert_eq!(original.as_bytes().borrow()[1], 0xff);
}

#[test]
fn clones_alias_the_array() {
    let original = Value::from(vec![Value::Null]);
    original.clone().as_array().borrow_mut().push(Value::from(3.0));
    assert_eq!(original.as_array().borrow().len(), 2);
}

#[test]
fn ordering_ranks_kinds() {
    let mut values = vec![
        Value::from("s"),
        Value::from(0.0),
        Value::Undefined,
        Value::from(vec![0u8]),
        Value::from(false),
        Value::Null,
    ];
    values.sort();
    let kinds: Vec<Kind> = values.iter().map(Value::kind).collect();
    assert_eq!(
        kinds,
        [Kind::Null, Kind::Undefined, Kind::Bool, Kind::Number, Kind::String, Kind::Object]
    );
}

#[test]
fn strings_compare_by_shared_identity_not_content() {
    let a = Value::from("same");
    let b = Value::from("same");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn values_key_a_btree_map() {
    let shared = Value::from(vec![9u8]);
    let mut map = BTreeMap::new();
    map.insert(Value::Null, 1);
    map.insert(Value::from(1.0), 2);
    map.insert(Value::from(2.0), 3);
    map.insert(shared.clone(), 4);

    assert_eq!(map.get(&Value::Null), Some(&1));
    assert_eq!(map.get(&Value::from(1.0)), Some(&2));
    assert_eq!(map.get(&shared), Some(&4));
    // A different buffer with the same content is a different key.
    assert_eq!(map.get(&Value::from(vec![9u8])), None);
}

#[test]
fn negative_numbers_order_below_positive() {
    let mut values = vec![Value::from(1.0), Value::from(-1.0), Value::from(0.0)];
    values.sort();
    assert_eq!(values[0].as_number(), -1.0);
    assert_eq!(values[2].as_number(), 1.0);
}

#[test]
fn display_matches_inspect_semantics() {
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::Undefined.to_string(), "undefined");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from(42.0).to_string(), "42");
    assert_eq!(Value::from("hi").to_string(), "hi");
    assert_eq!(Value::from(JsObject::named("console")).to_string(), "console");
    assert_eq!(Value::from(vec![1u8]).to_string(), "(object)");
    assert_eq!(Value::from(vec![Value::Null]).to_string(), "(object)");
}
