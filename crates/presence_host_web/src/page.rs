//! Page-world variable probe implementing [`presence_host::PageScope`].
//!
//! Content scripts cannot read page globals directly, so the probe is injected as an inline
//! `<script>` that runs in the page's own world and answers over `PreMiD_PageVariable`.

use presence_host::{PageScope, CORRELATION_ID_FIELD, PAGE_VARIABLE};

#[derive(Debug, Clone, Copy, Default)]
/// Page scope that injects a one-shot `<script>` probe into the document.
pub struct WebPageScope;

/// Builds the probe source for global `name`, replying with `correlation_id`.
///
/// Strings are sent verbatim with kind `string`; everything else is JSON-encoded with kind
/// `json`, and an undefined or unserializable global answers `"null"`.
pub fn probe_script(name: &str, correlation_id: &str) -> Result<String, String> {
    let name = serde_json::to_string(name).map_err(|e| e.to_string())?;
    let correlation_id = serde_json::to_string(correlation_id).map_err(|e| e.to_string())?;
    let event = serde_json::to_string(PAGE_VARIABLE).map_err(|e| e.to_string())?;
    let field = serde_json::to_string(CORRELATION_ID_FIELD).map_err(|e| e.to_string())?;
    Ok(format!(
        r#"(function () {{
  var value = window[{name}];
  var kind = typeof value === 'string' ? 'string' : 'json';
  var raw = 'null';
  if (kind === 'string') {{
    raw = value;
  }} else if (value !== undefined) {{
    try {{ raw = JSON.stringify(value); }} catch (e) {{ raw = 'null'; }}
    if (raw === undefined) {{ raw = 'null'; }}
  }}
  var detail = {{ kind: kind, value: raw }};
  detail[{field}] = {correlation_id};
  window.dispatchEvent(new CustomEvent({event}, {{ detail: detail }}));
}})();"#
    ))
}

impl PageScope for WebPageScope {
    fn probe_variable(&self, name: &str, correlation_id: &str) -> Result<(), String> {
        let source = probe_script(name, correlation_id)?;

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;

            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| "document unavailable".to_string())?;
            let script = document
                .create_element("script")
                .map_err(|err| format!("failed to create probe script: {err:?}"))?
                .dyn_into::<web_sys::HtmlScriptElement>()
                .map_err(|_| "failed to cast probe script".to_string())?;
            script.set_text_content(Some(&source));
            let parent = document
                .head()
                .map(web_sys::Element::from)
                .or_else(|| document.document_element())
                .ok_or_else(|| "document has no element to host the probe".to_string())?;
            parent
                .append_child(&script)
                .map_err(|err| format!("failed to inject probe script: {err:?}"))?;
            script.remove();
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = source;
            Err("page probing requires a browser document".to_string())
        }
    }
}
