//! Textual argument conversion.
//!
//! Command-line arguments arrive as strings; each one is read according to
//! the tag of the parameter it lands in:
//!
//! | Tag        | Accepted text                          |
//! |------------|----------------------------------------|
//! | `b`        | `true`, `false`                        |
//! | `i`, `l`   | decimal integer                        |
//! | `f`, `d`   | decimal float                          |
//! | `s`        | anything, verbatim                     |
//! | `o`        | `obj:<hex>` or a decimal id            |
//! | `[T]`      | `[a,b,c]` or `a,b,c`, items trimmed    |
//! | `{KV}`     | `k=v,k=v` (optionally braced), trimmed |
//!
//! Tuples and `v` have no textual form.

use corelib::{ObjectRef, Signature, Tuple, TypeTag, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("argument {index}: cannot read {text:?} as {tag}")]
    Unreadable {
        index: usize,
        text: String,
        tag: TypeTag,
    },

    #[error(transparent)]
    Rejected(#[from] corelib::Error),
}

/// Read `args` as the parameters of `signature`.
pub fn parse_args(signature: &Signature, args: &[String]) -> Result<Tuple, ConvertError> {
    if args.len() != signature.arity() {
        return Err(ConvertError::Arity {
            expected: signature.arity(),
            got: args.len(),
        });
    }

    let values = signature
        .params()
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, text))| {
            parse_value(text, &param.tag).ok_or_else(|| ConvertError::Unreadable {
                index,
                text: text.clone(),
                tag: param.tag.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Tuple::new_with_values(signature.param_tags(), values)?)
}

/// Arguments as plain strings, for calls no overload can read.
pub fn as_strings(args: &[String]) -> Tuple {
    Tuple::from_values(args.iter().cloned().map(Value::String).collect())
}

/// Read one textual argument as a value of `tag`.
///
/// Surrounding whitespace is ignored except for strings, which are kept as
/// given.
pub fn parse_value(text: &str, tag: &TypeTag) -> Option<Value> {
    let trimmed = text.trim();
    match tag {
        TypeTag::Bool => trimmed.parse().ok().map(Value::Bool),
        TypeTag::Int32 => trimmed.parse().ok().map(Value::Int32),
        TypeTag::Int64 => trimmed.parse().ok().map(Value::Int64),
        TypeTag::Float32 => trimmed.parse().ok().map(Value::Float32),
        TypeTag::Float64 => trimmed.parse().ok().map(Value::Float64),
        TypeTag::String => Some(Value::String(text.to_string())),
        TypeTag::ObjectRef => parse_object_ref(trimmed).map(Value::Object),
        TypeTag::List(element) => {
            let items = split_items(strip(trimmed, '[', ']'))
                .map(|item| parse_value(item, element))
                .collect::<Option<Vec<_>>>()?;
            Value::list((**element).clone(), items).ok()
        }
        TypeTag::Map(key, value) => {
            let entries = split_items(strip(trimmed, '{', '}'))
                .map(|entry| {
                    let (k, v) = entry.split_once('=')?;
                    Some((parse_value(k.trim(), key)?, parse_value(v.trim(), value)?))
                })
                .collect::<Option<Vec<_>>>()?;
            Value::map((**key).clone(), (**value).clone(), entries).ok()
        }
        TypeTag::Tuple(_) | TypeTag::Void => None,
    }
}

fn parse_object_ref(text: &str) -> Option<ObjectRef> {
    match text.strip_prefix("obj:") {
        Some(hex) => u64::from_str_radix(hex, 16).ok().map(ObjectRef),
        None => text.parse().ok().map(ObjectRef),
    }
}

fn strip(text: &str, open: char, close: char) -> &str {
    text.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .unwrap_or(text)
}

fn split_items(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}
