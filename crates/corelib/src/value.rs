//! Dynamic values and the conversions between them and Rust types.
//!
//! A [`Value`] always knows its own [`TypeTag`]. Static Rust types cross into
//! the dynamic representation through [`IntoValue`] and back out through
//! [`FromValue`]; both are tied to a compile-time tag via [`Typed`].

use crate::error::{Error, Result};
use crate::tag::TypeTag;
use crate::tuple::Tuple;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Opaque handle to a remotely addressable object.
///
/// The dispatch layer hands these out; the core only carries them around.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ObjectRef(pub u64);

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj:{:016x}", self.0)
    }
}

/// A value together with enough information to recover its type tag.
///
/// Lists and maps carry their element tags so an empty container still has
/// a well-defined type. They can only be built through [`Value::list`],
/// [`Value::map`] or the typed [`IntoValue`] impls, so [`Value::tag`] always
/// describes every item inside.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    List(ListValue),
    Map(MapValue),
    Tuple(Tuple),
    Object(ObjectRef),
    Void,
}

/// Homogeneous list. Every item's tag is assignable to `element`.
#[derive(Clone, Debug, PartialEq)]
pub struct ListValue {
    element: TypeTag,
    items: Vec<Value>,
}

impl ListValue {
    #[inline]
    pub fn element(&self) -> &TypeTag {
        &self.element
    }

    #[inline]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Map with distinct keys.
///
/// Entries are kept sorted by key, so two maps with the same contents
/// compare equal whatever order they were built in.
#[derive(Clone, Debug, PartialEq)]
pub struct MapValue {
    key: TypeTag,
    value: TypeTag,
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    #[inline]
    pub fn key_tag(&self) -> &TypeTag {
        &self.key
    }

    #[inline]
    pub fn value_tag(&self) -> &TypeTag {
        &self.value
    }

    /// Entries in key order.
    #[inline]
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .binary_search_by(|(k, _)| total_cmp(k, key))
            .ok()
            .map(|found| &self.entries[found].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Value {
    /// Runtime tag of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Int32(_) => TypeTag::Int32,
            Value::Int64(_) => TypeTag::Int64,
            Value::Float32(_) => TypeTag::Float32,
            Value::Float64(_) => TypeTag::Float64,
            Value::String(_) => TypeTag::String,
            Value::List(list) => TypeTag::list(list.element.clone()),
            Value::Map(map) => TypeTag::map(map.key.clone(), map.value.clone()),
            Value::Tuple(tuple) => TypeTag::Tuple(tuple.tags().to_vec()),
            Value::Object(_) => TypeTag::ObjectRef,
            Value::Void => TypeTag::Void,
        }
    }

    /// Build a list, checking every item against `element`.
    pub fn list(element: TypeTag, items: Vec<Value>) -> Result<Value> {
        for (index, item) in items.iter().enumerate() {
            let offered = item.tag();
            if !element.is_assignable_from(&offered) {
                return Err(Error::ArgumentTypeMismatch {
                    index,
                    declared: element,
                    offered,
                });
            }
        }
        Ok(Value::List(ListValue { element, items }))
    }

    /// Build a map, checking every key and value against the declared tags.
    ///
    /// # Errors
    ///
    /// - [`Error::ArgumentTypeMismatch`] for an ill-typed entry, `index`
    ///   being its position in `entries`
    /// - [`Error::DuplicateKey`] if two entries share a key
    pub fn map(key: TypeTag, value: TypeTag, mut entries: Vec<(Value, Value)>) -> Result<Value> {
        for (index, (k, v)) in entries.iter().enumerate() {
            for (declared, offered) in [(&key, k.tag()), (&value, v.tag())] {
                if !declared.is_assignable_from(&offered) {
                    return Err(Error::ArgumentTypeMismatch {
                        index,
                        declared: declared.clone(),
                        offered,
                    });
                }
            }
        }

        sort_entries(&mut entries);
        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[0].0 == pair[1].0 || total_cmp(&pair[0].0, &pair[1].0).is_eq())
        {
            return Err(Error::DuplicateKey {
                key: pair[0].0.to_string(),
            });
        }

        Ok(Value::Map(MapValue {
            key,
            value,
            entries,
        }))
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Value::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int32(_) => 1,
            Value::Int64(_) => 2,
            Value::Float32(_) => 3,
            Value::Float64(_) => 4,
            Value::String(_) => 5,
            Value::List(_) => 6,
            Value::Map(_) => 7,
            Value::Tuple(_) => 8,
            Value::Object(_) => 9,
            Value::Void => 10,
        }
    }
}

fn sort_entries(entries: &mut [(Value, Value)]) {
    entries.sort_by(|(a, _), (b, _)| total_cmp(a, b));
}

/// Total order over values, used to keep map keys canonical. Floats order
/// by `total_cmp`; values of different kinds order by kind.
fn total_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int32(x), Value::Int32(y)) => x.cmp(y),
        (Value::Int64(x), Value::Int64(y)) => x.cmp(y),
        (Value::Float32(x), Value::Float32(y)) => x.total_cmp(y),
        (Value::Float64(x), Value::Float64(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Object(x), Value::Object(y)) => x.cmp(y),
        (Value::List(x), Value::List(y)) => x
            .items
            .iter()
            .zip(&y.items)
            .map(|(a, b)| total_cmp(a, b))
            .find(|order| order.is_ne())
            .unwrap_or_else(|| x.items.len().cmp(&y.items.len())),
        (Value::Map(x), Value::Map(y)) => x
            .entries
            .iter()
            .zip(&y.entries)
            .map(|((ka, va), (kb, vb))| total_cmp(ka, kb).then_with(|| total_cmp(va, vb)))
            .find(|order| order.is_ne())
            .unwrap_or_else(|| x.entries.len().cmp(&y.entries.len())),
        (Value::Tuple(x), Value::Tuple(y)) => x
            .values()
            .zip(y.values())
            .map(|slots| match slots {
                (Some(a), Some(b)) => total_cmp(a, b),
                (a, b) => a.is_some().cmp(&b.is_some()),
            })
            .find(|order| order.is_ne())
            .unwrap_or_else(|| x.arity().cmp(&y.arity())),
        _ => a.rank().cmp(&b.rank()),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::List(list) => {
                f.write_str("[")?;
                for (i, item) in list.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Tuple(tuple) => write!(f, "{}", tuple),
            Value::Object(handle) => write!(f, "{}", handle),
            Value::Void => f.write_str("void"),
        }
    }
}

impl From<Tuple> for Value {
    fn from(tuple: Tuple) -> Self {
        Value::Tuple(tuple)
    }
}

/// Rust types with a fixed runtime tag.
pub trait Typed {
    fn type_tag() -> TypeTag;
}

/// Conversion from a Rust value into the dynamic representation.
pub trait IntoValue: Typed {
    fn into_value(self) -> Value;
}

/// Checked view of a dynamic value as a Rust type.
///
/// Returns `None` when the runtime representation is not `Self`; there is
/// no coercion between numeric widths.
pub trait FromValue: Typed + Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! primitive_value {
    ($ty:ty, $variant:ident) => {
        impl Typed for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::$variant
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

primitive_value!(bool, Bool);
primitive_value!(i32, Int32);
primitive_value!(i64, Int64);
primitive_value!(f32, Float32);
primitive_value!(f64, Float64);
primitive_value!(String, String);

impl Typed for &str {
    fn type_tag() -> TypeTag {
        TypeTag::String
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl Typed for ObjectRef {
    fn type_tag() -> TypeTag {
        TypeTag::ObjectRef
    }
}

impl IntoValue for ObjectRef {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::list(T::type_tag())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        // Each item's tag is T's tag.
        Value::List(ListValue {
            element: T::type_tag(),
            items: self.into_iter().map(IntoValue::into_value).collect(),
        })
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(list) if list.element == T::type_tag() => {
                list.items.iter().map(T::from_value).collect()
            }
            _ => None,
        }
    }
}

impl<K: Typed, V: Typed> Typed for HashMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::map(K::type_tag(), V::type_tag())
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for HashMap<K, V> {
    fn into_value(self) -> Value {
        // Keys are already distinct; only the order needs fixing.
        let mut entries: Vec<(Value, Value)> = self
            .into_iter()
            .map(|(k, v)| (k.into_value(), v.into_value()))
            .collect();
        sort_entries(&mut entries);
        Value::Map(MapValue {
            key: K::type_tag(),
            value: V::type_tag(),
            entries,
        })
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(map) if map.key == K::type_tag() && map.value == V::type_tag() => map
                .entries
                .iter()
                .map(|(k, v)| Some((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_tags() {
        assert_eq!(42i32.into_value().tag(), TypeTag::Int32);
        assert_eq!(42i64.into_value().tag(), TypeTag::Int64);
        assert_eq!("42".into_value().tag(), TypeTag::String);
        assert_eq!(ObjectRef(7).into_value().tag(), TypeTag::ObjectRef);
    }

    #[test]
    fn test_no_cross_width_read() {
        let value = 1234567890i64.into_value();
        assert_eq!(i32::from_value(&value), None);
        assert_eq!(f32::from_value(&value), None);
        assert_eq!(i64::from_value(&value), Some(1234567890));
    }

    #[test]
    fn test_empty_list_keeps_element_tag() {
        let value = Vec::<String>::new().into_value();
        assert_eq!(value.tag(), TypeTag::list(TypeTag::String));
        assert_eq!(Vec::<i32>::from_value(&value), None);
        assert_eq!(Vec::<String>::from_value(&value), Some(vec![]));
    }

    #[test]
    fn test_map_conversion() {
        let mut table = HashMap::new();
        table.insert(1i32, "one".to_string());
        let value = table.clone().into_value();
        assert_eq!(value.tag(), TypeTag::map(TypeTag::Int32, TypeTag::String));
        assert_eq!(HashMap::<i32, String>::from_value(&value), Some(table));
    }

    #[test]
    fn test_checked_list_construction() {
        let err = Value::list(TypeTag::Int32, vec![Value::Int32(1), Value::Int64(2)]).unwrap_err();
        assert_eq!(
            err,
            Error::ArgumentTypeMismatch {
                index: 1,
                declared: TypeTag::Int32,
                offered: TypeTag::Int64,
            }
        );
    }

    #[test]
    fn test_checked_map_construction() {
        let err = Value::map(
            TypeTag::String,
            TypeTag::Int32,
            vec![(Value::String("a".into()), Value::Int64(1))],
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ArgumentTypeMismatch);
    }

    #[test]
    fn test_map_rejects_duplicate_keys() {
        let err = Value::map(
            TypeTag::Int32,
            TypeTag::String,
            vec![
                (Value::Int32(1), Value::String("one".into())),
                (Value::Int32(2), Value::String("two".into())),
                (Value::Int32(1), Value::String("uno".into())),
            ],
        )
        .unwrap_err();
        assert_eq!(err, Error::DuplicateKey { key: "1".into() });
    }

    #[test]
    fn test_map_equality_ignores_build_order() {
        let forward = Value::map(
            TypeTag::String,
            TypeTag::Int32,
            vec![
                (Value::String("a".into()), Value::Int32(1)),
                (Value::String("b".into()), Value::Int32(2)),
            ],
        )
        .unwrap();
        let backward = Value::map(
            TypeTag::String,
            TypeTag::Int32,
            vec![
                (Value::String("b".into()), Value::Int32(2)),
                (Value::String("a".into()), Value::Int32(1)),
            ],
        )
        .unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.to_string(), "{\"a\": 1, \"b\": 2}");

        let map = forward.as_map().unwrap();
        assert_eq!(map.get(&Value::String("b".into())), Some(&Value::Int32(2)));
        assert_eq!(map.get(&Value::String("c".into())), None);
    }

    #[test]
    fn test_float_keys_use_total_order() {
        let err = Value::map(
            TypeTag::Float64,
            TypeTag::Bool,
            vec![
                (Value::Float64(0.0), Value::Bool(true)),
                (Value::Float64(-0.0), Value::Bool(false)),
            ],
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DuplicateKey);
    }
}
