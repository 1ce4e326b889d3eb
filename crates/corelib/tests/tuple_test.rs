//! Tests for typed tuples and signature parsing.
//!
//! # Test Strategy
//!
//! 1. **Bounds**: every out-of-range index fails before any type check
//! 2. **Round trip**: values written are the values read back
//! 3. **Error kinds**: read casts, write contract violations and bounds stay distinct
//! 4. **Container contents**: list and map slots only ever hold well-typed,
//!    canonical values
//! 5. **Signatures**: identical text parses to equal signatures

use corelib::{tuple, Error, ErrorKind, IntoValue, ObjectRef, Signature, Tuple, TypeTag, Value};
use proptest::prelude::*;
use std::collections::HashMap;

fn string_int_map() -> Vec<TypeTag> {
    vec![
        TypeTag::String,
        TypeTag::Int32,
        TypeTag::map(TypeTag::Int32, TypeTag::String),
    ]
}

// ============================================================================
// Bounds Tests
// ============================================================================

#[test]
fn test_get_past_arity_on_empty_tuple() {
    let tuple = Tuple::new(string_int_map());
    let err = tuple.get::<String>(4).unwrap_err();
    assert_eq!(err, Error::OutOfRange { index: 4, arity: 3 });
}

#[test]
fn test_get_past_arity_on_filled_tuple() {
    let tuple = Tuple::new_with_values(
        string_int_map(),
        vec![Value::String("42".into()), Value::Int32(42)],
    )
    .unwrap();
    assert_eq!(tuple.get::<String>(42).unwrap_err().kind(), ErrorKind::OutOfRange);
    // index == arity is already out of range
    assert_eq!(tuple.get::<String>(3).unwrap_err().kind(), ErrorKind::OutOfRange);
}

proptest! {
    #[test]
    fn prop_out_of_range_wins_over_type_checks(arity in 0usize..8, extra in 0usize..64) {
        let mut tuple = Tuple::new(vec![TypeTag::String; arity]);
        let index = arity + extra;
        let expected = Error::OutOfRange { index, arity };

        // Deliberately wrong types: the bounds check must come first.
        prop_assert_eq!(tuple.get::<i64>(index).unwrap_err(), expected.clone());
        prop_assert_eq!(tuple.set(index, 1i64).unwrap_err(), expected.clone());
        prop_assert_eq!(tuple.set_value(index, Value::Bool(true)).unwrap_err(), expected);
    }
}

// ============================================================================
// Round Trip Tests
// ============================================================================

#[test]
fn test_set_each_slot() {
    let mut tuple = Tuple::new(vec![TypeTag::String, TypeTag::Int32, TypeTag::Bool]);
    tuple.set(0, "plafbim").expect("string slot accepts a string");
    tuple.set(1, 42i32).expect("int slot accepts an int");
    tuple.set(2, true).expect("bool slot accepts a bool");
    assert!(tuple.is_complete());
}

#[test]
fn test_values_read_back() {
    let tuple = Tuple::new_with_values(
        vec![TypeTag::String, TypeTag::Int32, TypeTag::Bool],
        vec![Value::String("42".into()), Value::Int32(42), Value::Bool(true)],
    )
    .unwrap();

    assert_eq!(tuple.get::<String>(0).unwrap(), "42");
    assert_eq!(tuple.get::<i32>(1).unwrap(), 42);
    assert!(tuple.get::<bool>(2).unwrap());
}

#[test]
fn test_map_slot_round_trip() {
    let mut table = HashMap::new();
    table.insert(1i32, "one".to_string());
    table.insert(2i32, "two".to_string());

    let mut tuple = Tuple::new(string_int_map());
    tuple.set(2, table.clone()).unwrap();
    assert_eq!(tuple.get::<HashMap<i32, String>>(2).unwrap(), table);
}

#[test]
fn test_nested_tuple_slot() {
    let inner = tuple!["a", 1i32];
    let outer = Tuple::from_values(vec![Value::Bool(true), inner.clone().into()]);
    assert_eq!(outer.tag(1).unwrap(), &TypeTag::Tuple(vec![TypeTag::String, TypeTag::Int32]));
    assert_eq!(outer.get_value(1).unwrap().as_tuple(), Some(&inner));
}

#[test]
fn test_tuple_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Tuple>();

    let tuple = tuple!["moved", 7i32];
    let handle = std::thread::spawn(move || tuple.get::<i32>(1).unwrap());
    assert_eq!(handle.join().unwrap(), 7);
}

// ============================================================================
// Error Kind Tests
// ============================================================================

#[test]
fn test_read_as_object_ref_is_type_mismatch() {
    let tuple = Tuple::new_with_values(
        string_int_map(),
        vec![Value::String("42".into()), Value::Int32(42)],
    )
    .unwrap();

    let err = tuple.get::<ObjectRef>(0).unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            index: 0,
            requested: TypeTag::ObjectRef,
            found: TypeTag::String,
        }
    );
}

#[test]
fn test_write_wide_int_is_argument_type_mismatch() {
    let mut tuple = Tuple::new_with_values(
        vec![
            TypeTag::String,
            TypeTag::Float32,
            TypeTag::map(TypeTag::Int32, TypeTag::String),
        ],
        vec![
            Value::String("42".into()),
            Value::Float32(42.0),
            HashMap::<i32, String>::new().into_value(),
        ],
    )
    .unwrap();

    for index in 0..3 {
        let err = tuple.set(index, 1234567890i64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentTypeMismatch, "slot {}", index);
    }
    // nothing was overwritten
    assert_eq!(tuple.get::<String>(0).unwrap(), "42");
    assert_eq!(tuple.get::<f32>(1).unwrap(), 42.0);
}

#[test]
fn test_int32_does_not_widen_into_int64_slot() {
    let mut tuple = Tuple::new(vec![TypeTag::Int64]);
    assert_eq!(tuple.set(0, 1i32).unwrap_err().kind(), ErrorKind::ArgumentTypeMismatch);
    tuple.set(0, 1i64).unwrap();
    assert_eq!(tuple.get::<i32>(0).unwrap_err().kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_construction_is_atomic() {
    let result = Tuple::new_with_values(
        vec![TypeTag::String, TypeTag::Int32],
        vec![Value::String("ok".into()), Value::Int64(1)],
    );
    assert_eq!(
        result.unwrap_err(),
        Error::ArgumentTypeMismatch {
            index: 1,
            declared: TypeTag::Int32,
            offered: TypeTag::Int64,
        }
    );
}

#[test]
fn test_unset_slot_read() {
    let tuple = Tuple::new(vec![TypeTag::Bool]);
    assert_eq!(tuple.get::<bool>(0).unwrap_err().kind(), ErrorKind::NotSet);
}

// ============================================================================
// Container Content Tests
// ============================================================================

#[test]
fn test_list_slot_rejects_list_of_other_element() {
    let mut tuple = Tuple::new(vec![TypeTag::list(TypeTag::Int32)]);
    let strings = Value::list(TypeTag::String, vec![Value::String("x".into())]).unwrap();

    let err = tuple.set_value(0, strings).unwrap_err();
    assert_eq!(
        err,
        Error::ArgumentTypeMismatch {
            index: 0,
            declared: TypeTag::list(TypeTag::Int32),
            offered: TypeTag::list(TypeTag::String),
        }
    );
    assert!(!tuple.is_set(0).unwrap());
}

#[test]
fn test_ill_typed_list_cannot_be_built() {
    let err = Value::list(TypeTag::Int32, vec![Value::Int32(1), Value::String("x".into())])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentTypeMismatch);
}

#[test]
fn test_list_slot_contents_read_back() {
    let list = Value::list(TypeTag::Int32, vec![Value::Int32(1), Value::Int32(2)]).unwrap();
    let tuple = Tuple::new_with_values(vec![TypeTag::list(TypeTag::Int32)], vec![list]).unwrap();

    assert_eq!(tuple.get::<Vec<i32>>(0).unwrap(), vec![1, 2]);
    assert_eq!(tuple.get_value(0).unwrap().as_list().unwrap().len(), 2);
}

#[test]
fn test_equal_maps_make_equal_tuples() {
    let mut forward = HashMap::new();
    let mut backward = HashMap::new();
    for key in 0..64i32 {
        forward.insert(key, key.to_string());
    }
    for key in (0..64i32).rev() {
        backward.insert(key, key.to_string());
    }
    assert_eq!(forward, backward);

    let tags = vec![TypeTag::map(TypeTag::Int32, TypeTag::String)];
    let a = Tuple::new_with_values(tags.clone(), vec![forward.into_value()]).unwrap();
    let b = Tuple::new_with_values(tags, vec![backward.into_value()]).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn test_duplicate_map_keys_rejected() {
    let err = Value::map(
        TypeTag::String,
        TypeTag::Int32,
        vec![
            (Value::String("k".into()), Value::Int32(1)),
            (Value::String("k".into()), Value::Int32(2)),
        ],
    )
    .unwrap_err();
    assert_eq!(err, Error::DuplicateKey { key: "\"k\"".into() });
}

// ============================================================================
// Signature Tests
// ============================================================================

#[test]
fn test_identical_text_parses_equal() {
    let a = Signature::parse("info::(sib)(sib)").unwrap();
    let b = Signature::parse("info::(sib)(sib)").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_multi_return_signature() {
    let sig = Signature::parse("info::(sib)(sib)").unwrap();
    let sib = vec![TypeTag::String, TypeTag::Int32, TypeTag::Bool];
    assert_eq!(sig.name(), "info");
    assert_eq!(sig.arity(), 3);
    assert_eq!(sig.param_tags(), sib);
    assert_eq!(sig.returns(), sib.as_slice());
}

#[test]
fn test_parse_errors_are_parse_kind() {
    for text in ["", "::s(s)", "reply::s(q)", "reply::s(s", "reply::s"] {
        let err = Signature::parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse, "{:?}", text);
    }
}
