//! Page-global probing contract.
//!
//! Bridge code runs in an isolated script context and cannot read the page's own globals. A
//! [`PageScope`] plants a transient probe in the page that serializes one global and answers on
//! [`PAGE_VARIABLE`](crate::events::PAGE_VARIABLE) tagged with the caller's correlation id.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde_json::Value;

use crate::{
    bus::{EventBus, MemoryEventBus},
    events::{PageVariableReply, VariableKind, PAGE_VARIABLE},
};

/// Host service that injects page-global probes.
pub trait PageScope {
    /// Starts a probe reading the page global `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the probe cannot be injected.
    fn probe_variable(&self, name: &str, correlation_id: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Page scope that cannot inject anything.
pub struct NoopPageScope;

impl PageScope for NoopPageScope {
    fn probe_variable(&self, _name: &str, _correlation_id: &str) -> Result<(), String> {
        Err("page probing is unavailable on this target".to_string())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory page globals answered synchronously over a [`MemoryEventBus`].
pub struct MemoryPageScope {
    bus: MemoryEventBus,
    globals: Rc<RefCell<HashMap<String, (VariableKind, String)>>>,
}

impl MemoryPageScope {
    /// Creates a page scope replying on `bus`.
    pub fn new(bus: MemoryEventBus) -> Self {
        Self {
            bus,
            globals: Rc::default(),
        }
    }

    /// Declares a page global, serialized the way the browser probe does.
    pub fn set_global(&self, name: impl Into<String>, value: &Value) {
        let entry = match value {
            Value::String(text) => (VariableKind::String, text.clone()),
            other => (VariableKind::Json, other.to_string()),
        };
        self.globals.borrow_mut().insert(name.into(), entry);
    }

    /// Declares a page global with an already serialized payload.
    pub fn set_serialized(&self, name: impl Into<String>, kind: VariableKind, raw: impl Into<String>) {
        self.globals
            .borrow_mut()
            .insert(name.into(), (kind, raw.into()));
    }
}

impl PageScope for MemoryPageScope {
    fn probe_variable(&self, name: &str, correlation_id: &str) -> Result<(), String> {
        let (kind, value) = self
            .globals
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or((VariableKind::Json, "null".to_string()));
        let reply = PageVariableReply {
            correlation_id: correlation_id.to_string(),
            kind,
            value,
        };
        let detail = serde_json::to_value(reply).map_err(|e| e.to_string())?;
        self.bus.dispatch(PAGE_VARIABLE, detail)
    }
}
