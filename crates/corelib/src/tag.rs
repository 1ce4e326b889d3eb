//! Runtime type tags.
//!
//! A [`TypeTag`] is the closed-set descriptor carried next to every dynamic
//! value. Tags compare structurally, never by name, and assignability is
//! strict: distinct numeric widths never convert into one another here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical type of a value crossing the dispatch layer.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    List(Box<TypeTag>),
    Map(Box<TypeTag>, Box<TypeTag>),
    Tuple(Vec<TypeTag>),
    ObjectRef,
    Void,
}

impl TypeTag {
    pub fn list(element: TypeTag) -> Self {
        TypeTag::List(Box::new(element))
    }

    pub fn map(key: TypeTag, value: TypeTag) -> Self {
        TypeTag::Map(Box::new(key), Box::new(value))
    }

    /// True for the four numeric primitives.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeTag::Int32 | TypeTag::Int64 | TypeTag::Float32 | TypeTag::Float64
        )
    }

    /// True for tags that nest other tags.
    pub fn is_composite(&self) -> bool {
        matches!(self, TypeTag::List(_) | TypeTag::Map(..) | TypeTag::Tuple(_))
    }

    /// Whether a value tagged `value` may occupy a slot declared `self`.
    ///
    /// Composite tags recurse element-wise; everything else requires the two
    /// tags to be identical.
    pub fn is_assignable_from(&self, value: &TypeTag) -> bool {
        match (self, value) {
            (TypeTag::List(target), TypeTag::List(source)) => target.is_assignable_from(source),
            (TypeTag::Map(tk, tv), TypeTag::Map(sk, sv)) => {
                tk.is_assignable_from(sk) && tv.is_assignable_from(sv)
            }
            (TypeTag::Tuple(target), TypeTag::Tuple(source)) => {
                target.len() == source.len()
                    && target
                        .iter()
                        .zip(source)
                        .all(|(t, s)| t.is_assignable_from(s))
            }
            _ => self == value,
        }
    }

    /// Signature code for this tag, e.g. `[i]` or `{si}`.
    pub fn code(&self) -> String {
        let mut out = String::new();
        self.write_code(&mut out);
        out
    }

    pub(crate) fn write_code(&self, out: &mut String) {
        match self {
            TypeTag::Bool => out.push('b'),
            TypeTag::Int32 => out.push('i'),
            TypeTag::Int64 => out.push('l'),
            TypeTag::Float32 => out.push('f'),
            TypeTag::Float64 => out.push('d'),
            TypeTag::String => out.push('s'),
            TypeTag::ObjectRef => out.push('o'),
            TypeTag::Void => out.push('v'),
            TypeTag::List(element) => {
                out.push('[');
                element.write_code(out);
                out.push(']');
            }
            TypeTag::Map(key, value) => {
                out.push('{');
                key.write_code(out);
                value.write_code(out);
                out.push('}');
            }
            TypeTag::Tuple(members) => {
                out.push('(');
                for member in members {
                    member.write_code(out);
                }
                out.push(')');
            }
        }
    }
}

/// Free-function form of [`TypeTag::is_assignable_from`].
pub fn assignable(target: &TypeTag, value: &TypeTag) -> bool {
    target.is_assignable_from(value)
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("Bool"),
            TypeTag::Int32 => f.write_str("Int32"),
            TypeTag::Int64 => f.write_str("Int64"),
            TypeTag::Float32 => f.write_str("Float32"),
            TypeTag::Float64 => f.write_str("Float64"),
            TypeTag::String => f.write_str("String"),
            TypeTag::ObjectRef => f.write_str("ObjectRef"),
            TypeTag::Void => f.write_str("Void"),
            TypeTag::List(element) => write!(f, "List<{}>", element),
            TypeTag::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            TypeTag::Tuple(members) => {
                f.write_str("Tuple<")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                f.write_str(">")
            }
        }
    }
}
