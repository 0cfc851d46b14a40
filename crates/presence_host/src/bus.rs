//! Broadcast event bus contract and in-memory adapter.
//!
//! A bus delivers fire-and-forget events to every listener currently registered for an event
//! name. Delivery is synchronous at dispatch time within one context; listeners may dispatch or
//! (un)subscribe reentrantly.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde_json::Value;

/// Callback invoked with an event's detail payload.
pub type EventHandler = Rc<dyn Fn(Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Handle returned by [`EventBus::listen`].
pub struct ListenerId(pub u64);

/// Host transport for broadcast events.
pub trait EventBus {
    /// Broadcasts `detail` to all listeners of `event`.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload cannot be handed to the transport.
    fn dispatch(&self, event: &str, detail: Value) -> Result<(), String>;

    /// Registers `handler` for `event`.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport refuses the subscription.
    fn listen(&self, event: &str, handler: EventHandler) -> Result<ListenerId, String>;

    /// Removes a listener. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);
}

#[derive(Debug, Clone, Copy, Default)]
/// Bus that drops every event, for unsupported targets.
pub struct NoopEventBus;

impl EventBus for NoopEventBus {
    fn dispatch(&self, _event: &str, _detail: Value) -> Result<(), String> {
        Ok(())
    }

    fn listen(&self, _event: &str, _handler: EventHandler) -> Result<ListenerId, String> {
        Ok(ListenerId(0))
    }

    fn unlisten(&self, _id: ListenerId) {}
}

#[derive(Default)]
struct MemoryBusState {
    next_id: u64,
    listeners: BTreeMap<ListenerId, (String, EventHandler)>,
    dispatched: Vec<(String, Value)>,
}

#[derive(Clone, Default)]
/// Same-context bus keeping a log of dispatched events. Clones share state.
pub struct MemoryEventBus {
    inner: Rc<RefCell<MemoryBusState>>,
}

impl MemoryEventBus {
    /// Returns every dispatched `(event, detail)` pair in order.
    pub fn dispatched(&self) -> Vec<(String, Value)> {
        self.inner.borrow().dispatched.clone()
    }

    /// Returns the details dispatched for `event` in order.
    pub fn dispatched_for(&self, event: &str) -> Vec<Value> {
        self.inner
            .borrow()
            .dispatched
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, detail)| detail.clone())
            .collect()
    }

    /// Returns how many listeners are registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|(name, _)| name == event)
            .count()
    }
}

impl std::fmt::Debug for MemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("MemoryEventBus")
            .field("listeners", &state.listeners.len())
            .field("dispatched", &state.dispatched.len())
            .finish()
    }
}

impl EventBus for MemoryEventBus {
    fn dispatch(&self, event: &str, detail: Value) -> Result<(), String> {
        let handlers: Vec<EventHandler> = {
            let mut state = self.inner.borrow_mut();
            state.dispatched.push((event.to_string(), detail.clone()));
            state
                .listeners
                .values()
                .filter(|(name, _)| name == event)
                .map(|(_, handler)| handler.clone())
                .collect()
        };
        for handler in handlers {
            handler(detail.clone());
        }
        Ok(())
    }

    fn listen(&self, event: &str, handler: EventHandler) -> Result<ListenerId, String> {
        let mut state = self.inner.borrow_mut();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        state.listeners.insert(id, (event.to_string(), handler));
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) {
        self.inner.borrow_mut().listeners.remove(&id);
    }
}
