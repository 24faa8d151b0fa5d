//! Event Bus
//!
//! Handlers are registered per topic and invoked synchronously, in
//! registration order, by [`EventBus::publish`].
//!
//! ## Dispatch rules
//!
//! - A publish call works on a snapshot of the topic's registrations taken
//!   when it starts. Handlers subscribed during dispatch wait for the next
//!   publish.
//! - Once-registrations are removed from the registry before their handler
//!   runs, so they fire at most once even if the handler publishes the same
//!   topic again.
//! - The registry lock is released before any handler runs. Handlers may
//!   subscribe, unsubscribe and publish freely.
//! - There is no error isolation. Handlers are infallible; a panicking
//!   handler unwinds straight into the publisher.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared handler callable
pub type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Identifies a single registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct Registration<P> {
    id: SubscriptionId,
    handler: Handler<P>,
    once: bool,
}

impl<P> Clone for Registration<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
            once: self.once,
        }
    }
}

/// Topic-based publish/subscribe bus
///
/// Construct one per process and share it by `Arc`.
pub struct EventBus<P> {
    topics: Mutex<HashMap<String, Vec<Registration<P>>>>,
    next_id: AtomicU64,
}

impl<P> EventBus<P> {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Register a closure for a topic
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.register(topic.into(), Arc::new(handler), false)
    }

    /// Register an existing handler. The same handler may be registered
    /// several times; each registration is invoked separately.
    pub fn subscribe_handler(&self, topic: impl Into<String>, handler: Handler<P>) -> SubscriptionId {
        self.register(topic.into(), handler, false)
    }

    /// Register a closure that unregisters itself before its first call
    pub fn subscribe_once<F>(&self, topic: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.register(topic.into(), Arc::new(handler), true)
    }

    /// Remove the earliest registration of `handler` on `topic`.
    /// Returns false when nothing matched.
    pub fn unsubscribe(&self, topic: &str, handler: &Handler<P>) -> bool {
        let target = Arc::as_ptr(handler) as *const ();
        self.remove_where(topic, |reg| Arc::as_ptr(&reg.handler) as *const () == target)
    }

    /// Remove a registration by id. Returns false when it was already gone.
    pub fn unsubscribe_id(&self, topic: &str, id: SubscriptionId) -> bool {
        self.remove_where(topic, |reg| reg.id == id)
    }

    /// Drop every registration on a topic
    pub fn clear(&self, topic: &str) {
        self.topics.lock().remove(topic);
    }

    /// Number of live registrations on a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, Vec::len)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DISPATCH
    // ═══════════════════════════════════════════════════════════════════════════

    /// Invoke every handler registered on `topic` when the call starts.
    /// Returns how many handlers ran.
    pub fn publish(&self, topic: &str, payload: &P) -> usize {
        let snapshot: Vec<Registration<P>> = match self.topics.lock().get(topic) {
            Some(regs) => regs.clone(),
            None => return 0,
        };

        let mut invoked = 0;
        for reg in snapshot {
            if reg.once && !self.unsubscribe_id(topic, reg.id) {
                // consumed by a re-entrant publish or removed meanwhile
                continue;
            }
            (reg.handler)(payload);
            invoked += 1;
        }

        log::trace!("Published '{}' to {} handler(s)", topic, invoked);
        invoked
    }

    fn register(&self, topic: String, handler: Handler<P>, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.topics
            .lock()
            .entry(topic)
            .or_default()
            .push(Registration { id, handler, once });
        id
    }

    fn remove_where(&self, topic: &str, matches: impl Fn(&Registration<P>) -> bool) -> bool {
        let mut topics = self.topics.lock();
        let Some(regs) = topics.get_mut(topic) else {
            return false;
        };
        let Some(index) = regs.iter().position(matches) else {
            return false;
        };
        regs.remove(index);
        if regs.is_empty() {
            topics.remove(topic);
        }
        true
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.topics.lock();
        let mut counts: Vec<(&String, usize)> =
            topics.iter().map(|(topic, regs)| (topic, regs.len())).collect();
        counts.sort();
        f.debug_struct("EventBus").field("topics", &counts).finish()
    }
}
