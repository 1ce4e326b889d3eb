//! Per-object member table.
//!
//! Registration is append-only and all-or-nothing: the signature is parsed
//! and checked for duplicates before anything is stored. Overloads share a
//! name but must differ in signature.

use crate::error::{DispatchError, Result};
use crate::member::{Handler, Member, MemberId, MemberKind, MethodBuilder, SharedHandler};
use corelib::{Signature, SignatureCache};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Members of one object, keyed by kind and name.
#[derive(Debug, Default)]
pub struct MemberRegistry {
    members: Vec<Member>,
    by_name: HashMap<(MemberKind, String), Vec<usize>>,
    signatures: SignatureCache,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fire-and-forget event channel.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Signature`] if the text does not parse or declares
    ///   return values
    /// - [`DispatchError::DuplicateMember`] if the same signal exists
    pub fn advertise_signal(&mut self, builder: impl Into<MethodBuilder>) -> Result<MemberId> {
        self.insert(MemberKind::Signal, builder.into(), None)
    }

    /// Register a callable under its signature.
    ///
    /// Reusing a name with a different signature adds an overload.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Signature`] if the text does not parse
    /// - [`DispatchError::DuplicateMember`] if a method with the same name and
    ///   signature exists
    pub fn advertise_method<H: Handler>(
        &mut self,
        builder: impl Into<MethodBuilder>,
        handler: H,
    ) -> Result<MemberId> {
        self.insert(MemberKind::Method, builder.into(), Some(Arc::new(handler)))
    }

    /// Every signature registered under `name` for `kind`, in registration order.
    pub fn lookup(&self, name: &str, kind: MemberKind) -> Vec<Arc<Signature>> {
        self.overloads(name, kind)
            .map(|member| Arc::clone(member.signature()))
            .collect()
    }

    /// Every member registered under `name` for `kind`, in registration order.
    pub fn overloads<'a>(
        &'a self,
        name: &str,
        kind: MemberKind,
    ) -> impl Iterator<Item = &'a Member> + 'a {
        self.by_name
            .get(&(kind, name.to_string()))
            .into_iter()
            .flatten()
            .map(move |&slot| &self.members[slot])
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.0 as usize)
    }

    /// All members, in registration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn insert(
        &mut self,
        kind: MemberKind,
        builder: MethodBuilder,
        handler: Option<SharedHandler>,
    ) -> Result<MemberId> {
        let mut signature = self.signatures.parse(&builder.signature)?;

        if kind == MemberKind::Signal && !signature.returns().is_empty() {
            return Err(DispatchError::Signature(corelib::Error::Parse {
                input: builder.signature,
                position: 0,
                reason: "signals cannot declare return values".to_string(),
            }));
        }

        let key = (kind, signature.name().to_string());
        let siblings: Vec<&Signature> = self
            .by_name
            .get(&key)
            .into_iter()
            .flatten()
            .map(|&slot| self.members[slot].signature.as_ref())
            .collect();
        if siblings.iter().any(|other| other.same_shape(&signature)) {
            return Err(DispatchError::DuplicateMember {
                kind,
                signature: signature.to_string(),
            });
        }
        if let Some(other) = siblings.iter().find(|other| other.same_params(&signature)) {
            warn!(
                signature = %signature,
                existing = %other,
                "overload differs only in its return; calls matching both will be ambiguous"
            );
        }

        let mut params = builder.params;
        if params.len() > signature.arity() {
            warn!(
                signature = %signature,
                documented = params.len(),
                "more parameter docs than parameters; extras dropped"
            );
            params.truncate(signature.arity());
        }
        if !params.is_empty() {
            let named = signature
                .as_ref()
                .clone()
                .with_param_names(params.iter().map(|p| p.name.clone()));
            signature = Arc::new(named);
        }

        let id = MemberId(self.members.len() as u32);
        debug!(%id, %kind, signature = %signature, "advertised member");
        self.by_name.entry(key).or_default().push(self.members.len());
        self.members.push(Member {
            id,
            kind,
            signature,
            description: builder.description,
            params,
            return_description: builder.return_description,
            handler,
        });
        Ok(id)
    }
}
