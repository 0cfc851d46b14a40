//! Page-side messaging bridges between presence scripts and the privileged host.
//!
//! [`PresenceBridge`] runs in the main frame: it pushes presence snapshots, resolves strings,
//! page globals, and settings through the host, and relays host and iframe events to page
//! callbacks. [`IframeBridge`] is the reduced façade for subordinate frames.
//!
//! Every request that expects a reply carries a correlation id and is bounded by
//! [`BridgeConfig::request_timeout`].
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use presence_bridge::{BridgeConfig, PresenceBridge, PresenceOptions};
//! use presence_host::{
//!     HostServices, MemoryConsole, MemoryEventBus, MemoryPageScope, MemorySettingsStore,
//!     NeverTimer, PresenceData, ServiceMetadata, StaticHostInfo, UPDATE_PRESENCE,
//! };
//!
//! let metadata: ServiceMetadata = serde_json::from_value(serde_json::json!({
//!     "author": {"name": "dev", "id": "1"},
//!     "service": "Example",
//!     "url": "example.com",
//!     "version": "1.0.0",
//!     "logo": "https://example.com/logo.png",
//!     "thumbnail": "https://example.com/thumb.png",
//!     "color": "#1db954",
//!     "category": "music"
//! }))
//! .expect("metadata");
//!
//! let bus = MemoryEventBus::default();
//! let services = HostServices {
//!     bus: Rc::new(bus.clone()),
//!     settings: Rc::new(MemorySettingsStore::default()),
//!     page: Rc::new(MemoryPageScope::new(bus.clone())),
//!     timer: Rc::new(NeverTimer),
//!     console: Rc::new(MemoryConsole::default()),
//!     host_info: Rc::new(StaticHostInfo("2.5.0".to_string())),
//! };
//! let bridge = PresenceBridge::new(
//!     PresenceOptions::new("503557087041683458"),
//!     metadata,
//!     BridgeConfig::default(),
//!     services,
//! )
//! .expect("bridge");
//!
//! bridge.set_activity(
//!     PresenceData {
//!         details: Some("Listening".to_string()),
//!         ..PresenceData::default()
//!     },
//!     true,
//! );
//! assert_eq!(bus.dispatched_for(UPDATE_PRESENCE).len(), 1);
//! ```

pub mod config;
pub mod diagnostics;
pub mod iframe;
mod pending;
pub mod presence;

pub use config::BridgeConfig;
pub use diagnostics::Theme;
pub use iframe::IframeBridge;
pub use presence::{BridgeEvent, ExtensionVersion, PresenceBridge, PresenceOptions};
