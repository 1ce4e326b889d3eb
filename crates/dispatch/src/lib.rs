//! Member registry and dispatcher.
//!
//! This crate turns a bag of signatures and handlers into a callable object:
//! - Method and signal registration with signature-based overloading
//! - Call resolution by name and argument tuple shape
//! - Handler invocation and return-value packing
//! - Signal validation and hand-off to a broadcaster

pub mod broadcast;
pub mod dispatcher;
pub mod error;
pub mod member;
pub mod object;
pub mod registry;

pub use broadcast::{Broadcaster, LocalBroadcaster, Link, NullBroadcaster, SignalEvent};
pub use dispatcher::{call, emit};
pub use error::{DispatchError, ErrorKind, Result};
pub use member::{Handler, Member, MemberId, MemberKind, MethodBuilder, ParamDoc};
pub use object::{MemberDescription, Object, ObjectDescription};
pub use registry::MemberRegistry;
