//! Extension-storage settings store implementation.
//!
//! Persisted settings belong to the host: they live in `chrome.storage.local`, which the host
//! writes and the page itself cannot reach. Values are read back as JSON text and written as
//! parsed JSON, so the host sees ordinary objects.
//!
//! Extension storage has no transactions. [`ExtensionSettingsStore::swap_raw`] re-reads the key
//! right before writing and refuses a stale write, which leaves only the gap between that read
//! and the `set` call open to a racing writer.

use presence_host::{SettingsStore, SettingsStoreFuture};

/// Property path from the global object to the storage area holding persisted settings.
pub const STORAGE_AREA: [&str; 3] = ["chrome", "storage", "local"];

#[derive(Debug, Clone, Copy, Default)]
/// Settings store backed by the extension's `chrome.storage.local`.
pub struct ExtensionSettingsStore;

impl ExtensionSettingsStore {
    /// Loads the JSON text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when extension storage is unavailable or the read fails.
    pub async fn load_raw(self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            imp::load_raw(key).await
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    /// Writes `raw_json` under `key` when the stored text still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error when extension storage is unavailable, `raw_json` is not JSON, or the
    /// write fails.
    pub async fn swap_raw(
        self,
        key: &str,
        expected: Option<&str>,
        raw_json: &str,
    ) -> Result<bool, String> {
        #[cfg(target_arch = "wasm32")]
        {
            if imp::load_raw(key).await?.as_deref() != expected {
                return Ok(false);
            }
            imp::store_raw(key, raw_json).await?;
            Ok(true)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, expected, raw_json);
            Ok(true)
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use js_sys::{Function, Object, Promise, Reflect, JSON};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    use super::STORAGE_AREA;

    fn property(target: &JsValue, key: &str) -> Result<JsValue, String> {
        Reflect::get(target, &JsValue::from_str(key))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .ok_or_else(|| format!("`{key}` unavailable"))
    }

    fn storage_area() -> Result<JsValue, String> {
        STORAGE_AREA
            .iter()
            .try_fold(JsValue::from(js_sys::global()), |target, key| {
                property(&target, key)
            })
    }

    async fn call(area: &JsValue, method: &str, arg: &JsValue) -> Result<JsValue, String> {
        let promise = property(area, method)?
            .dyn_into::<Function>()
            .map_err(|_| format!("storage `{method}` is not callable"))?
            .call1(area, arg)
            .map_err(|err| format!("storage {method} failed: {err:?}"))?
            .dyn_into::<Promise>()
            .map_err(|_| format!("storage {method} did not return a promise"))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| format!("storage {method} rejected: {err:?}"))
    }

    pub(super) async fn load_raw(key: &str) -> Result<Option<String>, String> {
        let area = storage_area()?;
        let items = call(&area, "get", &JsValue::from_str(key)).await?;
        let value = Reflect::get(&items, &JsValue::from_str(key))
            .map_err(|err| format!("storage get returned no items: {err:?}"))?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        if let Some(text) = value.as_string() {
            return Ok(Some(text));
        }
        JSON::stringify(&value)
            .map(String::from)
            .map(Some)
            .map_err(|err| format!("stored `{key}` is not serializable: {err:?}"))
    }

    pub(super) async fn store_raw(key: &str, raw_json: &str) -> Result<(), String> {
        let area = storage_area()?;
        let value =
            JSON::parse(raw_json).map_err(|err| format!("settings are not JSON: {err:?}"))?;
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(key), &value)
            .map_err(|err| format!("failed to build storage items: {err:?}"))?;
        call(&area, "set", &items).await.map(|_| ())
    }
}

impl SettingsStore for ExtensionSettingsStore {
    fn load_settings<'a>(
        &'a self,
        key: &'a str,
    ) -> SettingsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(self.load_raw(key))
    }

    fn compare_and_swap<'a>(
        &'a self,
        key: &'a str,
        expected: Option<&'a str>,
        raw_json: &'a str,
    ) -> SettingsStoreFuture<'a, Result<bool, String>> {
        Box::pin(self.swap_raw(key, expected, raw_json))
    }
}
