//! Typed host-boundary contracts shared by the presence bridges and their browser adapters.
//!
//! This crate is the API-first boundary between page-side scripts and the privileged host. It
//! exposes the presence/metadata models, the broadcast event vocabulary, host service traits
//! (event bus, settings storage, page probing, timers, console output), in-memory adapters for
//! native targets and tests, plus the pure color/time helpers and the settings resolver.
//! Concrete browser adapters live in `presence_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod bus;
pub mod color;
pub mod console;
pub mod error;
pub mod events;
pub mod host;
pub mod model;
pub mod page;
pub mod settings;
pub mod storage;
pub mod time;
pub mod timer;

pub use bus::{EventBus, EventHandler, ListenerId, MemoryEventBus, NoopEventBus};
pub use color::{contrast_color, hex_to_rgb, perceived_brightness, Brightness, Rgb};
pub use console::{ConsoleSink, DiagnosticLevel, DiagnosticLine, MemoryConsole, TracingConsole};
pub use error::BridgeError;
pub use events::{
    IframeUrlReply, IframeUrlRequest, PageVariableReply, PresenceUpdate, StringsReply,
    StringsRequest, VariableKind, CORRELATION_ID_FIELD, GET_IFRAME_URL, IFRAME_DATA, IFRAME_URL,
    PAGE_VARIABLE, RECEIVE_EXTENSION_DATA, REQUEST_EXTENSION_DATA, TAB_PRIORITY, UPDATE_DATA,
    UPDATE_PRESENCE,
};
pub use host::{HostInfo, HostServices, StaticHostInfo};
pub use model::{
    Contributor, PersistedSetting, PresenceButton, PresenceData, ServiceMetadata,
    SettingDescriptor, UrlPattern,
};
pub use page::{MemoryPageScope, NoopPageScope, PageScope};
pub use settings::{settings_storage_key, SettingIds, SettingsResolver, SETTINGS_KEY_PREFIX};
pub use storage::settings_store::{
    MemorySettingsStore, NoopSettingsStore, SettingsStore, SettingsStoreFuture,
};
pub use time::{
    timestamp_from_format, timestamps, timestamps_at, timestamps_from_media, unix_time_ms_now,
    MediaHandle,
};
pub use timer::{ImmediateTimer, NeverTimer, Timer, TimerFuture};
