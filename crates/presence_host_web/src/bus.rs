//! `window` CustomEvent transport implementing [`presence_host::EventBus`].
//!
//! Payloads travel as the event `detail`, serialized JSON-compatibly so maps arrive as plain
//! objects on the host side.

use std::{cell::Cell, rc::Rc};

use presence_host::{EventBus, EventHandler, ListenerId};
use serde_json::Value;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, collections::HashMap};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[cfg(target_arch = "wasm32")]
type WindowListener = (String, Closure<dyn FnMut(web_sys::Event)>);

#[derive(Clone, Default)]
/// Event bus backed by `window.dispatchEvent` / `window.addEventListener`. Clones share the
/// listener registry.
pub struct WindowEventBus {
    next_id: Rc<Cell<u64>>,
    #[cfg(target_arch = "wasm32")]
    listeners: Rc<RefCell<HashMap<u64, WindowListener>>>,
}

impl WindowEventBus {
    fn allocate_id(&self) -> ListenerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        ListenerId(id)
    }
}

impl EventBus for WindowEventBus {
    fn dispatch(&self, event: &str, detail: Value) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            use serde::Serialize;
            use serde_wasm_bindgen::Serializer;

            let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
            let detail = detail
                .serialize(&Serializer::json_compatible())
                .map_err(|err| format!("failed to encode `{event}` detail: {err}"))?;
            let init = web_sys::CustomEventInit::new();
            init.set_detail(&detail);
            let custom = web_sys::CustomEvent::new_with_event_init_dict(event, &init)
                .map_err(|err| format!("failed to create `{event}`: {err:?}"))?;
            window
                .dispatch_event(&custom)
                .map(|_| ())
                .map_err(|err| format!("failed to dispatch `{event}`: {err:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (event, detail);
            Ok(())
        }
    }

    fn listen(&self, event: &str, handler: EventHandler) -> Result<ListenerId, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
            let name = event.to_string();
            let closure = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
                move |raw: web_sys::Event| {
                    let Ok(custom) = raw.dyn_into::<web_sys::CustomEvent>() else {
                        return;
                    };
                    match serde_wasm_bindgen::from_value::<Value>(custom.detail()) {
                        Ok(detail) => handler(detail),
                        Err(err) => tracing::warn!("dropping undecodable `{name}` detail: {err}"),
                    }
                },
            ));
            window
                .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                .map_err(|err| format!("failed to listen for `{event}`: {err:?}"))?;
            let id = self.allocate_id();
            self.listeners
                .borrow_mut()
                .insert(id.0, (event.to_string(), closure));
            Ok(id)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (event, handler);
            Ok(self.allocate_id())
        }
    }

    fn unlisten(&self, id: ListenerId) {
        #[cfg(target_arch = "wasm32")]
        {
            let Some((event, closure)) = self.listeners.borrow_mut().remove(&id.0) else {
                return;
            };
            if let Some(window) = web_sys::window() {
                let _ = window
                    .remove_event_listener_with_callback(&event, closure.as_ref().unchecked_ref());
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = id;
    }
}
