//! Hand-off point between `emit` and whatever delivers signals.
//!
//! The dispatcher only validates a signal and passes it on; subscriber
//! bookkeeping lives behind the [`Broadcaster`] trait. [`LocalBroadcaster`]
//! delivers to in-process callbacks, [`NullBroadcaster`] drops everything.

use crate::member::MemberId;
use corelib::{ObjectRef, Signature, Tuple};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// A validated signal emission.
#[derive(Clone, Debug)]
pub struct SignalEvent {
    pub source: ObjectRef,
    pub member: MemberId,
    pub signature: Arc<Signature>,
    pub args: Tuple,
}

/// Delivers validated signals to subscribers.
pub trait Broadcaster: Send + Sync + 'static {
    fn broadcast(&self, event: &SignalEvent);
}

/// Discards every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn broadcast(&self, event: &SignalEvent) {
        trace!(source = %event.source, signal = %event.signature, "no broadcaster; signal dropped");
    }
}

/// Handle returned by [`LocalBroadcaster::subscribe`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Link(pub u64);

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link:{}", self.0)
    }
}

type Callback = Arc<dyn Fn(&SignalEvent) + Send + Sync>;

struct Subscriber {
    signal: String,
    callback: Callback,
}

/// In-process subscriber table keyed by signal name.
///
/// Callbacks run on the emitting thread, in subscription order, after the
/// table lock is released, so a callback may subscribe or unsubscribe.
#[derive(Default)]
pub struct LocalBroadcaster {
    subscribers: DashMap<Link, Subscriber>,
    next_link: AtomicU64,
}

impl LocalBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, signal: impl Into<String>, callback: F) -> Link
    where
        F: Fn(&SignalEvent) + Send + Sync + 'static,
    {
        let link = Link(self.next_link.fetch_add(1, Ordering::Relaxed));
        self.subscribers.insert(
            link,
            Subscriber {
                signal: signal.into(),
                callback: Arc::new(callback),
            },
        );
        link
    }

    /// Remove one subscription. Returns false if the link is unknown.
    ///
    /// A delivery already in progress on another thread may still reach the
    /// callback.
    pub fn unsubscribe(&self, link: Link) -> bool {
        self.subscribers.remove(&link).is_some()
    }

    /// Remove every subscription. Returns false if there were none.
    pub fn unsubscribe_all(&self) -> bool {
        let had_any = !self.subscribers.is_empty();
        self.subscribers.clear();
        had_any
    }

    /// Links subscribed to `signal`, in subscription order.
    pub fn subscribers(&self, signal: &str) -> Vec<Link> {
        let mut links: Vec<Link> = self
            .subscribers
            .iter()
            .filter(|entry| entry.value().signal == signal)
            .map(|entry| *entry.key())
            .collect();
        links.sort();
        links
    }
}

impl Broadcaster for LocalBroadcaster {
    fn broadcast(&self, event: &SignalEvent) {
        let mut targets: Vec<(Link, Callback)> = self
            .subscribers
            .iter()
            .filter(|entry| entry.value().signal == event.signature.name())
            .map(|entry| (*entry.key(), Arc::clone(&entry.value().callback)))
            .collect();
        targets.sort_by_key(|(link, _)| *link);

        trace!(signal = %event.signature, subscribers = targets.len(), "broadcasting");
        for (_, callback) in targets {
            callback(event);
        }
    }
}

impl fmt::Debug for LocalBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBroadcaster")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn event(name: &str) -> SignalEvent {
        SignalEvent {
            source: ObjectRef(1),
            member: MemberId(0),
            signature: Arc::new(Signature::parse(&format!("{}::(i)", name)).unwrap()),
            args: corelib::tuple![1i32],
        }
    }

    #[test]
    fn test_delivers_only_to_matching_signal() {
        let broadcaster = LocalBroadcaster::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        broadcaster.subscribe("fire", move |e: &SignalEvent| sink.lock().push(e.signature.name().to_string()));
        let sink = Arc::clone(&seen);
        broadcaster.subscribe("other", move |e: &SignalEvent| sink.lock().push(e.signature.name().to_string()));

        broadcaster.broadcast(&event("fire"));
        assert_eq!(*seen.lock(), vec!["fire".to_string()]);
    }

    #[test]
    fn test_unsubscribe() {
        let broadcaster = LocalBroadcaster::new();
        let a = broadcaster.subscribe("fire", |_: &SignalEvent| {});
        let b = broadcaster.subscribe("fire", |_: &SignalEvent| {});
        assert_eq!(broadcaster.subscribers("fire"), vec![a, b]);

        assert!(broadcaster.unsubscribe(a));
        assert!(!broadcaster.unsubscribe(a));
        assert_eq!(broadcaster.subscribers("fire"), vec![b]);

        assert!(broadcaster.unsubscribe_all());
        assert!(!broadcaster.unsubscribe_all());
    }

    #[test]
    fn test_callback_may_unsubscribe_itself() {
        let broadcaster = Arc::new(LocalBroadcaster::new());
        let weak = Arc::downgrade(&broadcaster);
        broadcaster.subscribe("fire", move |_: &SignalEvent| {
            if let Some(b) = weak.upgrade() {
                b.unsubscribe(Link(0));
            }
        });
        broadcaster.broadcast(&event("fire"));
        assert!(broadcaster.subscribers("fire").is_empty());
    }
}
