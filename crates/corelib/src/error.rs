//! Error types for the core library.

use crate::tag::TypeTag;
use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// Tuple failures come in three distinct kinds that callers are expected to
/// branch on: bounds (`OutOfRange`), read-side casts (`TypeMismatch`) and
/// write-side contract violations (`ArgumentTypeMismatch`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed signature text.
    #[error("cannot parse signature {input:?} at byte {position}: {reason}")]
    Parse {
        input: String,
        position: usize,
        reason: String,
    },

    /// Index outside `[0, arity)`.
    #[error("index {index} out of range for tuple of arity {arity}")]
    OutOfRange { index: usize, arity: usize },

    /// A read requested a type the stored value cannot be viewed as.
    #[error("slot {index} holds {found}, cannot be read as {requested}")]
    TypeMismatch {
        index: usize,
        requested: TypeTag,
        found: TypeTag,
    },

    /// A write offered a value whose tag is not assignable to the slot.
    #[error("slot {index} is declared {declared}, cannot store {offered}")]
    ArgumentTypeMismatch {
        index: usize,
        declared: TypeTag,
        offered: TypeTag,
    },

    /// A read hit a slot that holds no value.
    #[error("slot {index} is not set")]
    NotSet { index: usize },

    /// A map was built with the same key twice.
    #[error("map key {key} appears more than once")]
    DuplicateKey { key: String },
}

/// Discriminant of [`Error`], for branching on the failure kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    OutOfRange,
    TypeMismatch,
    ArgumentTypeMismatch,
    NotSet,
    DuplicateKey,
}

impl Error {
    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { .. } => ErrorKind::Parse,
            Error::OutOfRange { .. } => ErrorKind::OutOfRange,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::ArgumentTypeMismatch { .. } => ErrorKind::ArgumentTypeMismatch,
            Error::NotSet { .. } => ErrorKind::NotSet,
            Error::DuplicateKey { .. } => ErrorKind::DuplicateKey,
        }
    }

    pub(crate) fn parse(input: &str, position: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            input: input.to_string(),
            position,
            reason: reason.into(),
        }
    }
}
