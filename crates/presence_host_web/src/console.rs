//! Devtools console sink implementing [`presence_host::ConsoleSink`].

use presence_host::{ConsoleSink, DiagnosticLine};

#[derive(Debug, Clone, Copy, Default)]
/// Writes diagnostics to the browser console with a service-colored `%c` tag. Off-browser it
/// forwards to [`presence_host::TracingConsole`].
pub struct WebConsole;

/// CSS applied to the service tag of a diagnostic line.
pub fn tag_style(line: &DiagnosticLine) -> String {
    format!(
        "font-weight: 800; padding: 2px 5px; color: {}; border-radius: 3px; background: {};",
        line.foreground, line.background
    )
}

impl ConsoleSink for WebConsole {
    fn write(&self, line: &DiagnosticLine) {
        #[cfg(target_arch = "wasm32")]
        {
            use presence_host::DiagnosticLevel;
            use wasm_bindgen::JsValue;

            let format = JsValue::from_str(&format!("%c{}%c {}", line.service, line.message));
            let style = JsValue::from_str(&tag_style(line));
            let reset = JsValue::from_str("");
            match line.level {
                DiagnosticLevel::Error => web_sys::console::error_3(&format, &style, &reset),
                DiagnosticLevel::Info | DiagnosticLevel::Success => {
                    web_sys::console::log_3(&format, &style, &reset)
                }
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        presence_host::TracingConsole.write(line);
    }
}
