//! Call and signal resolution.
//!
//! # Algorithm
//!
//! 1. Collect the members of the requested kind registered under the name
//! 2. Keep the overloads whose parameters accept the argument tuple's
//!    declared tags (equal arity, each parameter assignable from its slot)
//! 3. Exactly one must remain; none or several is a caller error
//! 4. For methods, run the handler and pack its outputs into a tuple declared
//!    with the signature's return tags
//!
//! The registry lock is only held for steps 1–3. The handler runs on the
//! caller's thread with no lock held.

use crate::broadcast::SignalEvent;
use crate::error::{DispatchError, Result};
use crate::member::{Member, MemberKind};
use crate::object::Object;
use crate::registry::MemberRegistry;
use corelib::{Signature, Tuple, Value};
use std::sync::Arc;
use tracing::{trace, warn};

/// Invoke method `name` on `object` with `args`.
///
/// # Errors
///
/// - [`DispatchError::Disposed`] if the object is disposed
/// - [`DispatchError::UnknownMember`] if no method has this name
/// - [`DispatchError::SignatureMismatch`] if no overload accepts `args`
/// - [`DispatchError::AmbiguousMember`] if several overloads accept `args`
/// - [`DispatchError::OpaqueHandler`] if the handler fails
/// - [`DispatchError::ReturnTypeMismatch`] if the handler's outputs do not
///   fit the declared return tags
pub fn call(object: &Object, name: &str, args: &Tuple) -> Result<Tuple> {
    let (signature, handler) = {
        let registry = object.registry()?;
        let member = resolve(&registry, MemberKind::Method, name, args)?;
        let handler = member
            .handler()
            .cloned()
            .ok_or_else(|| DispatchError::UnknownMember {
                kind: MemberKind::Method,
                name: name.to_string(),
            })?;
        (Arc::clone(member.signature()), handler)
    };

    trace!(object = %object.id(), method = %signature, args = %args, "dispatching call");
    let outputs = handler.call(args).map_err(|err| {
        let message = format!("{:#}", err);
        warn!(object = %object.id(), method = %signature, error = %message, "handler failed");
        DispatchError::OpaqueHandler {
            member: signature.to_string(),
            message,
        }
    })?;

    pack_returns(&signature, outputs)
}

/// Validate signal `name` against `args` and hand it to the object's
/// broadcaster.
///
/// # Errors
///
/// Same resolution errors as [`call`]; delivery itself cannot fail here.
pub fn emit(object: &Object, name: &str, args: &Tuple) -> Result<()> {
    let event = {
        let registry = object.registry()?;
        let member = resolve(&registry, MemberKind::Signal, name, args)?;
        SignalEvent {
            source: object.id(),
            member: member.id(),
            signature: Arc::clone(member.signature()),
            args: args.clone(),
        }
    };

    trace!(object = %object.id(), signal = %event.signature, args = %args, "emitting signal");
    object.broadcaster().broadcast(&event);
    Ok(())
}

/// The single member of `kind` named `name` that accepts `args`.
pub fn resolve<'r>(
    registry: &'r MemberRegistry,
    kind: MemberKind,
    name: &str,
    args: &Tuple,
) -> Result<&'r Member> {
    let overloads: Vec<&Member> = registry.overloads(name, kind).collect();
    if overloads.is_empty() {
        return Err(DispatchError::UnknownMember {
            kind,
            name: name.to_string(),
        });
    }

    let matching: Vec<&Member> = overloads
        .iter()
        .copied()
        .filter(|member| member.signature().accepts(args))
        .collect();

    match matching.as_slice() {
        [only] => Ok(*only),
        [] => Err(DispatchError::SignatureMismatch {
            call: Signature::for_call(name, args),
            candidates: render(&overloads),
        }),
        several => Err(DispatchError::AmbiguousMember {
            call: Signature::for_call(name, args),
            candidates: render(several),
        }),
    }
}

fn render(members: &[&Member]) -> Vec<String> {
    members.iter().map(|m| m.signature().to_string()).collect()
}

fn pack_returns(signature: &Signature, outputs: Vec<Value>) -> Result<Tuple> {
    let declared = signature.returns();
    if outputs.len() != declared.len() {
        return Err(DispatchError::ReturnTypeMismatch {
            member: signature.to_string(),
            reason: format!(
                "returned {} values, declared {}",
                outputs.len(),
                declared.len()
            ),
        });
    }

    Tuple::new_with_values(declared.to_vec(), outputs).map_err(|err| {
        DispatchError::ReturnTypeMismatch {
            member: signature.to_string(),
            reason: err.to_string(),
        }
    })
}
