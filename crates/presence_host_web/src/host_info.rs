//! Extension manifest lookup implementing [`presence_host::HostInfo`].

use presence_host::HostInfo;

#[derive(Debug, Clone, Copy, Default)]
/// Reads the host version from `chrome.runtime.getManifest().version`.
pub struct ExtensionHostInfo;

impl HostInfo for ExtensionHostInfo {
    fn extension_version(&self) -> Result<String, String> {
        #[cfg(target_arch = "wasm32")]
        {
            use js_sys::{Function, Reflect};
            use wasm_bindgen::{JsCast, JsValue};

            let get = |target: &JsValue, key: &str| {
                Reflect::get(target, &JsValue::from_str(key))
                    .ok()
                    .filter(|value| !value.is_undefined() && !value.is_null())
                    .ok_or_else(|| format!("`{key}` unavailable"))
            };
            let runtime = get(&get(&js_sys::global().into(), "chrome")?, "runtime")?;
            let manifest = get(&runtime, "getManifest")?
                .dyn_into::<Function>()
                .map_err(|_| "`getManifest` is not callable".to_string())?
                .call0(&runtime)
                .map_err(|err| format!("getManifest failed: {err:?}"))?;
            get(&manifest, "version")?
                .as_string()
                .ok_or_else(|| "manifest version is not a string".to_string())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Err("extension runtime unavailable".to_string())
        }
    }
}
