//! Core library for the typed marshalling layer.
//!
//! This crate provides the value model shared by both ends of a call:
//! - Runtime type tags and their assignability relation
//! - Dynamic values and conversions to and from Rust types
//! - Fixed-arity, per-slot type-checked tuples
//! - Member signatures, their parser and a parse-once cache

pub mod error;
pub mod signature;
pub mod tag;
pub mod tuple;
pub mod value;

pub use error::{Error, ErrorKind, Result};
pub use signature::{Param, Signature, SignatureCache};
pub use tag::{assignable, TypeTag};
pub use tuple::Tuple;
pub use value::{FromValue, IntoValue, ListValue, MapValue, ObjectRef, Typed, Value};
