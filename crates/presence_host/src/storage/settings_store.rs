//! Persisted-settings storage contracts and adapters.
//!
//! Values are raw JSON text per key. Writes are compare-and-swap against the raw text the
//! writer last read, so read-modify-write sequences cannot silently overwrite a concurrent
//! change.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

/// Object-safe boxed future used by [`SettingsStore`] async methods.
pub type SettingsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for persisted settings collections.
pub trait SettingsStore {
    /// Loads the raw JSON stored under `key`.
    fn load_settings<'a>(
        &'a self,
        key: &'a str,
    ) -> SettingsStoreFuture<'a, Result<Option<String>, String>>;

    /// Stores `raw_json` under `key` only if the current raw value equals `expected`.
    ///
    /// Resolves `Ok(false)` when the stored value changed since it was read.
    fn compare_and_swap<'a>(
        &'a self,
        key: &'a str,
        expected: Option<&'a str>,
        raw_json: &'a str,
    ) -> SettingsStoreFuture<'a, Result<bool, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Settings store that holds nothing, for unsupported targets.
pub struct NoopSettingsStore;

impl SettingsStore for NoopSettingsStore {
    fn load_settings<'a>(
        &'a self,
        _key: &'a str,
    ) -> SettingsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn compare_and_swap<'a>(
        &'a self,
        _key: &'a str,
        _expected: Option<&'a str>,
        _raw_json: &'a str,
    ) -> SettingsStoreFuture<'a, Result<bool, String>> {
        Box::pin(async { Ok(true) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory settings store keyed by string. Clones share state.
pub struct MemorySettingsStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemorySettingsStore {
    /// Replaces the raw JSON under `key` unconditionally.
    pub fn insert_raw(&self, key: impl Into<String>, raw_json: impl Into<String>) {
        self.inner.borrow_mut().insert(key.into(), raw_json.into());
    }

    /// Returns the raw JSON under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load_settings<'a>(
        &'a self,
        key: &'a str,
    ) -> SettingsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.raw(key)) })
    }

    fn compare_and_swap<'a>(
        &'a self,
        key: &'a str,
        expected: Option<&'a str>,
        raw_json: &'a str,
    ) -> SettingsStoreFuture<'a, Result<bool, String>> {
        Box::pin(async move {
            let mut map = self.inner.borrow_mut();
            if map.get(key).map(String::as_str) != expected {
                return Ok(false);
            }
            map.insert(key.to_string(), raw_json.to_string());
            Ok(true)
        })
    }
}
