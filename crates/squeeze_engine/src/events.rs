//! Per-kind fan-out of engine events.
//!
//! Listeners are registered per [`EventKind`] and stay registered for as long
//! as the returned [`Subscription`] lives.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use shell_logging::shell_trace;

use crate::{EngineEvent, EventKind};

type Listener = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<EventKind, Vec<(u64, Listener)>>,
}

#[derive(Clone, Default)]
pub struct EventHub {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        let counts: BTreeMap<&str, usize> = registry
            .listeners
            .iter()
            .map(|(kind, listeners)| (kind.name(), listeners.len()))
            .collect();
        f.debug_struct("EventHub")
            .field("listeners", &counts)
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    /// Delivers `event` to the listeners of its kind. Returns how many ran.
    pub fn publish(&self, event: &EngineEvent) -> usize {
        let kind = event.kind();
        // Listeners run outside the lock so they may subscribe or unsubscribe.
        let listeners: Vec<Listener> = lock(&self.registry)
            .listeners
            .get(&kind)
            .map(|listeners| listeners.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();
        if listeners.is_empty() {
            shell_trace!("No listener for {}", kind);
        }
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        lock(&self.registry)
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

/// Keeps one listener registered; dropping it unregisters the listener.
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    kind: EventKind,
    id: u64,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(listeners) = registry.listeners.get_mut(&self.kind) {
            listeners.retain(|(id, _)| *id != self.id);
            if listeners.is_empty() {
                registry.listeners.remove(&self.kind);
            }
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
