//! Observer registry
//!
//! Multicast listeners with explicit subscribe/unsubscribe. Delivery is synchronous:
//! every subscriber has run by the time `emit` returns.

use std::fmt;

/// Handle returned by [`ListenerRegistry::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<E> = Box<dyn FnMut(&E) + Send + Sync>;

/// Ordered set of callbacks for one notification kind.
pub struct ListenerRegistry<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, Callback<E>)>,
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> ListenerRegistry<E> {
    /// Register a callback. It receives every notification emitted after this call.
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if the id was unknown (already removed).
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Deliver a notification to every subscriber before returning.
    pub fn emit(&mut self, event: &E) {
        for (_, callback) in self.listeners.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
