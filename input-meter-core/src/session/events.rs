//! Callback registry for lifecycle events.
//!
//! Events here are fire-and-forget: an emission reaches exactly the listeners
//! subscribed at that moment, and a listener that subscribes afterwards never
//! sees it. Listeners are removed by dropping their [`Subscription`] token, so
//! teardown cannot leave dangling callbacks behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Listener = Arc<dyn Fn() + Send + Sync>;
type ListenerMap = Mutex<HashMap<u64, Listener>>;

/// Cloneable handle to one event stream. Clones share the listener set.
#[derive(Clone)]
pub struct EventHub {
    listeners: Arc<ListenerMap>,
    next_id: Arc<AtomicU64>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a listener. Dropping the returned token unsubscribes it.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, Arc::new(listener));
        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Deliver the event to every currently subscribed listener.
    ///
    /// The listener set is snapshotted before invocation, so a listener may
    /// subscribe or drop tokens (including its own) without deadlocking.
    pub fn emit(&self) {
        let snapshot: Vec<Listener> = self.listeners.lock().values().cloned().collect();
        for listener in snapshot {
            listener();
        }
    }

    /// Number of live subscriptions, for diagnostics and leak checks.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII subscription token; dropping it removes the listener.
pub struct Subscription {
    listeners: Weak<ListenerMap>,
    id: u64,
}

impl Subscription {
    /// Explicit unsubscribe; equivalent to dropping the token.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().remove(&self.id);
        }
    }
}
