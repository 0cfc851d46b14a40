//! Browser (`wasm32`) implementations of [`presence_host`] service contracts.
//!
//! Each adapter talks to the page through `web_sys`/`js_sys` on `wasm32` and degrades to an
//! inert fallback elsewhere, so the bridges can be linked and unit-tested natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Factory wiring the browser adapters into a [`presence_host::HostServices`] bundle.
pub mod adapters;
pub mod bus;
pub mod console;
pub mod host_info;
#[cfg(target_arch = "wasm32")]
pub mod media;
pub mod page;
pub mod storage;
pub mod timer;

pub use adapters::browser_host_services;
pub use bus::WindowEventBus;
pub use console::WebConsole;
pub use host_info::ExtensionHostInfo;
#[cfg(target_arch = "wasm32")]
pub use media::WebMediaElement;
pub use page::WebPageScope;
pub use storage::extension_settings::ExtensionSettingsStore;
pub use timer::WebTimer;
