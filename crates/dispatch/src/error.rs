//! Error types for registration and dispatch.

use crate::member::MemberKind;
use corelib::ObjectRef;
use thiserror::Error;

/// Result type alias for the dispatch crate.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors surfaced by the member registry and the dispatcher.
///
/// None of these are retried inside this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// Signature text could not be parsed.
    #[error("invalid signature: {0}")]
    Signature(#[from] corelib::Error),

    /// A member with the same kind, name and signature already exists.
    #[error("{kind} {signature} is already advertised")]
    DuplicateMember { kind: MemberKind, signature: String },

    /// No member of the requested kind has this name.
    #[error("no {kind} named {name:?}")]
    UnknownMember { kind: MemberKind, name: String },

    /// Members exist under the name but none accepts the arguments.
    #[error("no overload accepts {call}; candidates: {}", .candidates.join(", "))]
    SignatureMismatch { call: String, candidates: Vec<String> },

    /// More than one overload accepts the arguments.
    #[error("call {call} is ambiguous between {}", .candidates.join(", "))]
    AmbiguousMember { call: String, candidates: Vec<String> },

    /// The handler itself failed; `message` is passed through untouched.
    #[error("{member} failed: {message}")]
    OpaqueHandler { member: String, message: String },

    /// The handler produced values that violate its declared return spec.
    #[error("{member} broke its return contract: {reason}")]
    ReturnTypeMismatch { member: String, reason: String },

    /// The object was disposed before or during the request.
    #[error("object {0} has been disposed")]
    Disposed(ObjectRef),

    /// The transport gave up waiting for the call to finish.
    #[error("call to {member} timed out after {elapsed_ms} ms")]
    TimedOut { member: String, elapsed_ms: u64 },

    /// The transport cancelled the call before it finished.
    #[error("call to {member} was cancelled")]
    Cancelled { member: String },
}

/// Discriminant of [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Signature,
    DuplicateMember,
    UnknownMember,
    SignatureMismatch,
    AmbiguousMember,
    OpaqueHandler,
    ReturnTypeMismatch,
    Disposed,
    TimedOut,
    Cancelled,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Signature(_) => ErrorKind::Signature,
            DispatchError::DuplicateMember { .. } => ErrorKind::DuplicateMember,
            DispatchError::UnknownMember { .. } => ErrorKind::UnknownMember,
            DispatchError::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            DispatchError::AmbiguousMember { .. } => ErrorKind::AmbiguousMember,
            DispatchError::OpaqueHandler { .. } => ErrorKind::OpaqueHandler,
            DispatchError::ReturnTypeMismatch { .. } => ErrorKind::ReturnTypeMismatch,
            DispatchError::Disposed(_) => ErrorKind::Disposed,
            DispatchError::TimedOut { .. } => ErrorKind::TimedOut,
            DispatchError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}
