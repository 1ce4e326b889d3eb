//! Registered members: methods with handlers and signals.
//!
//! Members are identified by a compact [`MemberId`] handed out in
//! registration order. Methods carry a [`Handler`]; signals only carry their
//! signature.

use corelib::{Signature, Tuple, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a member within one object.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct MemberId(pub u32);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Signal,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => f.write_str("method"),
            MemberKind::Signal => f.write_str("signal"),
        }
    }
}

/// Code bound to a method.
///
/// Receives the argument tuple (already checked against the method's
/// parameters) and returns one value per declared return tag. Any error is
/// passed back to the caller as an opaque handler failure.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, args: &Tuple) -> anyhow::Result<Vec<Value>>;
}

impl<F> Handler for F
where
    F: Fn(&Tuple) -> anyhow::Result<Vec<Value>> + Send + Sync + 'static,
{
    fn call(&self, args: &Tuple) -> anyhow::Result<Vec<Value>> {
        self(args)
    }
}

pub type SharedHandler = Arc<dyn Handler>;

/// Documentation attached to one parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    pub description: Option<String>,
}

/// Signature text plus optional documentation, consumed by registration.
///
/// ```rust
/// use dispatch::MethodBuilder;
///
/// let spec = MethodBuilder::new("reply::s(s)")
///     .description("Echo a message back")
///     .param("message", "text to echo")
///     .returns("the same text");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MethodBuilder {
    pub(crate) signature: String,
    pub(crate) description: Option<String>,
    pub(crate) params: Vec<ParamDoc>,
    pub(crate) return_description: Option<String>,
}

impl MethodBuilder {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name and describe the next parameter, in declaration order.
    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.params.push(ParamDoc {
            name: name.into(),
            description: Some(description.into()),
        });
        self
    }

    pub fn returns(mut self, description: impl Into<String>) -> Self {
        self.return_description = Some(description.into());
        self
    }
}

impl From<&str> for MethodBuilder {
    fn from(signature: &str) -> Self {
        Self::new(signature)
    }
}

/// A member as stored in a registry.
#[derive(Clone)]
pub struct Member {
    pub(crate) id: MemberId,
    pub(crate) kind: MemberKind,
    pub(crate) signature: Arc<Signature>,
    pub(crate) description: Option<String>,
    pub(crate) params: Vec<ParamDoc>,
    pub(crate) return_description: Option<String>,
    pub(crate) handler: Option<SharedHandler>,
}

impl Member {
    #[inline]
    pub fn id(&self) -> MemberId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    #[inline]
    pub fn signature(&self) -> &Arc<Signature> {
        &self.signature
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> &[ParamDoc] {
        &self.params
    }

    pub fn return_description(&self) -> Option<&str> {
        self.return_description.as_deref()
    }

    /// Bound handler; always present for methods, never for signals.
    pub fn handler(&self) -> Option<&SharedHandler> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("signature", &self.signature.to_string())
            .field("description", &self.description)
            .finish()
    }
}
