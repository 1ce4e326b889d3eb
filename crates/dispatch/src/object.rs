//! Exposed service objects.
//!
//! An [`Object`] owns one [`MemberRegistry`] behind a read/write lock:
//! advertising takes the write side, calls and emissions the read side.
//! Objects are meant to be shared as `Arc<Object>` between callers.
//!
//! # Lifecycle
//!
//! 1. Created empty
//! 2. Members advertised one by one
//! 3. Exposed to callers
//! 4. Disposed: the registry is dropped and every later request fails with
//!    [`DispatchError::Disposed`]. Calls already past resolution hold their
//!    own handle on the handler and finish normally.

use crate::broadcast::{Broadcaster, NullBroadcaster};
use crate::dispatcher;
use crate::error::{DispatchError, Result};
use crate::member::{Handler, MemberId, MemberKind, MethodBuilder, ParamDoc};
use crate::registry::MemberRegistry;
use corelib::{ObjectRef, Signature, Tuple};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

static NEXT_OBJECT: AtomicU64 = AtomicU64::new(1);

/// A remotely addressable set of methods and signals.
pub struct Object {
    id: ObjectRef,
    registry: RwLock<MemberRegistry>,
    disposed: AtomicBool,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Object {
    /// Empty object whose signals go nowhere.
    pub fn new() -> Self {
        Self::with_broadcaster(Arc::new(NullBroadcaster))
    }

    /// Empty object whose signals are handed to `broadcaster`.
    pub fn with_broadcaster(broadcaster: Arc<dyn Broadcaster>) -> Self {
        let id = ObjectRef(NEXT_OBJECT.fetch_add(1, Ordering::Relaxed));
        debug!(object = %id, "created object");
        Self {
            id,
            registry: RwLock::new(MemberRegistry::new()),
            disposed: AtomicBool::new(false),
            broadcaster,
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectRef {
        self.id
    }

    pub fn advertise_method<H: Handler>(
        &self,
        builder: impl Into<MethodBuilder>,
        handler: H,
    ) -> Result<MemberId> {
        let mut registry = self.registry.write();
        self.ensure_alive()?;
        registry.advertise_method(builder, handler)
    }

    pub fn advertise_signal(&self, builder: impl Into<MethodBuilder>) -> Result<MemberId> {
        let mut registry = self.registry.write();
        self.ensure_alive()?;
        registry.advertise_signal(builder)
    }

    /// Signatures registered under `name`; empty once disposed.
    pub fn lookup(&self, name: &str, kind: MemberKind) -> Vec<Arc<Signature>> {
        self.registry.read().lookup(name, kind)
    }

    /// Call a method. See [`dispatcher::call`].
    pub fn call(&self, name: &str, args: &Tuple) -> Result<Tuple> {
        dispatcher::call(self, name, args)
    }

    /// Emit a signal. See [`dispatcher::emit`].
    pub fn emit(&self, name: &str, args: &Tuple) -> Result<()> {
        dispatcher::emit(self, name, args)
    }

    /// Snapshot of every member, in registration order.
    pub fn describe(&self) -> ObjectDescription {
        let registry = self.registry.read();
        ObjectDescription {
            id: self.id,
            members: registry
                .members()
                .iter()
                .map(|member| MemberDescription {
                    id: member.id(),
                    kind: member.kind(),
                    name: member.name().to_string(),
                    signature: member.signature().to_string(),
                    description: member.description().map(str::to_string),
                    params: member.params().to_vec(),
                    return_description: member.return_description().map(str::to_string),
                })
                .collect(),
        }
    }

    /// Drop the registry. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let discarded = std::mem::take(&mut *self.registry.write());
        debug!(object = %self.id, members = discarded.len(), "disposed object");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub(crate) fn registry(&self) -> Result<RwLockReadGuard<'_, MemberRegistry>> {
        let registry = self.registry.read();
        if self.is_disposed() {
            return Err(DispatchError::Disposed(self.id));
        }
        Ok(registry)
    }

    pub(crate) fn broadcaster(&self) -> &dyn Broadcaster {
        self.broadcaster.as_ref()
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_disposed() {
            Err(DispatchError::Disposed(self.id))
        } else {
            Ok(())
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("members", &self.registry.read().len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Serializable view of an object's members.
#[derive(Clone, Debug, Serialize)]
pub struct ObjectDescription {
    pub id: ObjectRef,
    pub members: Vec<MemberDescription>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MemberDescription {
    pub id: MemberId,
    pub kind: MemberKind,
    pub name: String,
    pub signature: String,
    pub description: Option<String>,
    pub params: Vec<ParamDoc>,
    pub return_description: Option<String>,
}
