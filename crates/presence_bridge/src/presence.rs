//! Main-frame presence bridge.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use presence_host::{
    timestamp_from_format, timestamps, timestamps_from_media, BridgeError, DiagnosticLevel,
    HostServices, ListenerId, MediaHandle, PageVariableReply, PresenceData, PresenceUpdate,
    ServiceMetadata, SettingIds, SettingsResolver, StringsReply, StringsRequest, VariableKind,
    IFRAME_DATA, PAGE_VARIABLE, RECEIVE_EXTENSION_DATA, REQUEST_EXTENSION_DATA, TAB_PRIORITY,
    UPDATE_DATA, UPDATE_PRESENCE,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::BridgeConfig,
    diagnostics::{Diagnostics, Theme},
    pending::{self, PendingRequests},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Construction options supplied by the presence script.
pub struct PresenceOptions {
    /// Application id the host renders presence under.
    pub client_id: String,
}

impl PresenceOptions {
    /// Creates options for `client_id`.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Events a page script can subscribe to with [`PresenceBridge::on`].
pub enum BridgeEvent {
    /// Host asks the page to recompute presence. Callback payload is `null`.
    UpdateData,
    /// An iframe bridge pushed data. Callback payload is the iframe's payload.
    IframeData,
}

impl BridgeEvent {
    /// Parses a page-facing event name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UpdateData" => Some(Self::UpdateData),
            "iFrameData" => Some(Self::IframeData),
            _ => None,
        }
    }

    /// Returns the page-facing event name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::UpdateData => "UpdateData",
            Self::IframeData => "iFrameData",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Host version as returned by [`PresenceBridge::get_extension_version`].
pub enum ExtensionVersion {
    /// Digits of the version string read as one integer (`"2.1.3"` is `213`).
    Numeric(u64),
    /// The version string as reported.
    Raw(String),
}

type Callback = Rc<dyn Fn(Value)>;

#[derive(Default)]
struct ActivityState {
    presence: PresenceData,
    tray_title: String,
}

struct BridgeInner {
    options: PresenceOptions,
    metadata: ServiceMetadata,
    config: BridgeConfig,
    services: HostServices,
    diagnostics: Diagnostics,
    settings: SettingsResolver,
    strings_pending: Rc<PendingRequests>,
    variables_pending: Rc<PendingRequests>,
    activity: RefCell<ActivityState>,
    callbacks: RefCell<HashMap<BridgeEvent, Callback>>,
    listeners: RefCell<Vec<ListenerId>>,
}

impl BridgeInner {
    fn listen(&self, event: &str, handler: impl Fn(Value) + 'static) -> Result<(), BridgeError> {
        let id = self
            .services
            .bus
            .listen(event, Rc::new(handler))
            .map_err(BridgeError::Transport)?;
        self.listeners.borrow_mut().push(id);
        Ok(())
    }

    fn subscribe(self: &Rc<Self>) -> Result<(), BridgeError> {
        let weak = Rc::downgrade(self);
        self.listen(TAB_PRIORITY, move |detail| {
            if is_truthy(&detail) {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                tracing::debug!(service = %inner.metadata.service, "tab priority lost, clearing activity");
                inner.clear_activity();
            }
        })?;

        let weak = Rc::downgrade(self);
        self.listen(UPDATE_DATA, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.emit(BridgeEvent::UpdateData, Value::Null);
            }
        })?;

        let weak = Rc::downgrade(self);
        self.listen(IFRAME_DATA, move |detail| {
            if let Some(inner) = weak.upgrade() {
                inner.emit(BridgeEvent::IframeData, detail);
            }
        })?;

        // One table per reply event: a reply only settles requests of its own kind.
        for (reply_event, pending) in [
            (RECEIVE_EXTENSION_DATA, &self.strings_pending),
            (PAGE_VARIABLE, &self.variables_pending),
        ] {
            let pending = pending.clone();
            self.listen(reply_event, move |detail| {
                pending.resolve(detail);
            })?;
        }
        Ok(())
    }

    fn emit(&self, event: BridgeEvent, payload: Value) {
        let callback = self.callbacks.borrow().get(&event).cloned();
        if let Some(callback) = callback {
            callback(payload);
        }
    }

    fn set_activity(&self, presence: PresenceData, playback: bool) {
        let update = {
            let mut activity = self.activity.borrow_mut();
            activity.presence = presence;
            PresenceUpdate::active(
                self.options.client_id.clone(),
                activity.presence.clone(),
                activity.tray_title.clone(),
                playback,
            )
        };
        self.broadcast(update);
    }

    fn clear_activity(&self) {
        *self.activity.borrow_mut() = ActivityState::default();
        self.broadcast(PresenceUpdate::cleared());
    }

    fn broadcast(&self, update: PresenceUpdate) {
        let result = serde_json::to_value(&update)
            .map_err(|err| err.to_string())
            .and_then(|detail| self.services.bus.dispatch(UPDATE_PRESENCE, detail));
        if let Err(err) = result {
            tracing::warn!(service = %self.metadata.service, "presence update dispatch failed: {err}");
        }
    }
}

impl Drop for BridgeInner {
    fn drop(&mut self) {
        for id in self.listeners.get_mut().drain(..) {
            self.services.bus.unlisten(id);
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Page-context façade over the host bridge.
///
/// Cloning is cheap and shares state. Host listeners are removed when the last clone drops.
#[derive(Clone)]
pub struct PresenceBridge {
    inner: Rc<BridgeInner>,
}

impl PresenceBridge {
    /// Binds a bridge to `metadata` and the injected host `services`.
    ///
    /// Subscribes to host tab-priority changes (losing priority clears the activity), host
    /// update requests, iframe data, and the reply events of correlated requests.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidColor`] for a malformed service color and
    /// [`BridgeError::Transport`] when the bus refuses a subscription.
    pub fn new(
        options: PresenceOptions,
        metadata: ServiceMetadata,
        config: BridgeConfig,
        services: HostServices,
    ) -> Result<Self, BridgeError> {
        let theme = Theme::from_service_color(&metadata.color)?;
        let diagnostics = Diagnostics::new(
            &metadata.service,
            theme,
            config.diagnostics,
            services.console.clone(),
        );
        let settings = SettingsResolver::new(
            services.settings.clone(),
            &metadata.service,
            metadata.settings.clone(),
            config.settings_write_attempts,
        );
        let inner = Rc::new(BridgeInner {
            options,
            metadata,
            config,
            services,
            diagnostics,
            settings,
            strings_pending: PendingRequests::new("strings"),
            variables_pending: PendingRequests::new("variable"),
            activity: RefCell::default(),
            callbacks: RefCell::default(),
            listeners: RefCell::default(),
        });
        inner.subscribe()?;
        Ok(Self { inner })
    }

    /// Returns the bound service metadata.
    pub fn metadata(&self) -> &ServiceMetadata {
        &self.inner.metadata
    }

    /// Returns the diagnostics theme derived from the service color.
    pub fn theme(&self) -> &Theme {
        self.inner.diagnostics.theme()
    }

    /// Replaces the advertised snapshot and broadcasts it with the current tray title.
    ///
    /// Delivery is fire-and-forget; nothing surfaces when no host is listening.
    pub fn set_activity(&self, presence: PresenceData, playback: bool) {
        self.inner.set_activity(presence, playback);
    }

    /// Empties the snapshot and tray title and tells the host to hide the presence.
    pub fn clear_activity(&self) {
        self.inner.clear_activity();
    }

    /// Sets the tray label sent with the next update.
    pub fn set_tray_title(&self, title: impl Into<String>) {
        self.inner.activity.borrow_mut().tray_title = title.into();
    }

    /// Returns the last snapshot set locally. This is not what the host is displaying.
    pub fn get_activity(&self) -> PresenceData {
        self.inner.activity.borrow().presence.clone()
    }

    /// Resolves a strings template (output key to host string id) through the host.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Timeout`] when the host does not answer in time.
    pub async fn get_strings(
        &self,
        template: &BTreeMap<String, String>,
        language: Option<&str>,
    ) -> Result<BTreeMap<String, String>, BridgeError> {
        let inner = &self.inner;
        let reply: StringsReply = pending::request(
            &inner.strings_pending,
            inner.services.timer.as_ref(),
            inner.config.request_timeout(),
            REQUEST_EXTENSION_DATA,
            |correlation_id| {
                let request = StringsRequest {
                    correlation_id: correlation_id.to_string(),
                    strings: template.clone(),
                    language: language.map(str::to_string),
                };
                let detail = serde_json::to_value(request).map_err(|e| e.to_string())?;
                inner.services.bus.dispatch(REQUEST_EXTENSION_DATA, detail)
            },
        )
        .await?;
        Ok(reply.strings)
    }

    /// Reads a global declared by the page itself.
    ///
    /// A missing global reads as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Decode`] when the serialized global is not valid JSON or does not
    /// fit `T`, and [`BridgeError::Timeout`] when the probe never answers.
    pub async fn get_page_variable<T: DeserializeOwned>(&self, name: &str) -> Result<T, BridgeError> {
        let inner = &self.inner;
        let reply: PageVariableReply = pending::request(
            &inner.variables_pending,
            inner.services.timer.as_ref(),
            inner.config.request_timeout(),
            PAGE_VARIABLE,
            |correlation_id| inner.services.page.probe_variable(name, correlation_id),
        )
        .await?;
        let value = match reply.kind {
            VariableKind::String => Value::String(reply.value),
            VariableKind::Json => serde_json::from_str(&reply.value)?,
        };
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the host version, verbatim or reduced to its digits.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidVersion`] when `numeric_only` is set and the version has
    /// no digits (or too many to fit).
    pub fn get_extension_version(&self, numeric_only: bool) -> Result<ExtensionVersion, BridgeError> {
        let raw = self
            .inner
            .services
            .host_info
            .extension_version()
            .map_err(BridgeError::Transport)?;
        if !numeric_only {
            return Ok(ExtensionVersion::Raw(raw));
        }
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        digits
            .parse::<u64>()
            .map(ExtensionVersion::Numeric)
            .map_err(|_| BridgeError::InvalidVersion(raw))
    }

    /// Returns the effective value of a setting.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::SettingNotFound`] when the id is neither persisted nor declared.
    pub async fn get_setting(&self, id: &str) -> Result<Value, BridgeError> {
        self.inner.settings.get_setting(id).await
    }

    /// Hides one or more persisted settings.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PartialFailure`] naming unknown ids after writing the known ones.
    pub async fn hide_setting(&self, ids: impl Into<SettingIds>) -> Result<(), BridgeError> {
        self.inner.settings.hide_setting(ids).await
    }

    /// Shows one or more persisted settings.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PartialFailure`] naming unknown ids after writing the known ones.
    pub async fn show_setting(&self, ids: impl Into<SettingIds>) -> Result<(), BridgeError> {
        self.inner.settings.show_setting(ids).await
    }

    /// Start/end unix seconds for a media element's current position. The end is `None` until
    /// the media reports a finite duration.
    pub fn get_timestamps_from_media(&self, media: &dyn MediaHandle) -> (i64, Option<i64>) {
        timestamps_from_media(media)
    }

    /// Start/end unix seconds for `elapsed` of `duration` seconds.
    pub fn get_timestamps(&self, elapsed: f64, duration: f64) -> (i64, Option<i64>) {
        timestamps(elapsed, duration)
    }

    /// Parses `HH:MM:SS`, `MM:SS`, or `SS` into seconds; `None` for non-numeric segments.
    pub fn timestamp_from_format(&self, text: &str) -> Option<f64> {
        timestamp_from_format(text)
    }

    /// Writes a themed informational line.
    pub fn info(&self, message: &str) {
        self.inner.diagnostics.emit(DiagnosticLevel::Info, message);
    }

    /// Writes a themed success line.
    pub fn success(&self, message: &str) {
        self.inner.diagnostics.emit(DiagnosticLevel::Success, message);
    }

    /// Writes a themed error line.
    pub fn error(&self, message: &str) {
        self.inner.diagnostics.emit(DiagnosticLevel::Error, message);
    }

    /// Sets the callback for `"UpdateData"` or `"iFrameData"`, replacing any previous one.
    ///
    /// Unknown names are reported as a diagnostic error and subscribe nothing.
    pub fn on(&self, event: &str, callback: impl Fn(Value) + 'static) {
        match BridgeEvent::from_name(event) {
            Some(kind) => {
                self.inner
                    .callbacks
                    .borrow_mut()
                    .insert(kind, Rc::new(callback));
            }
            None => self
                .inner
                .diagnostics
                .emit(DiagnosticLevel::Error, &format!("{event} is not a valid event name")),
        }
    }

    /// Returns how many correlated requests are awaiting a reply.
    pub fn pending_requests(&self) -> usize {
        self.inner.strings_pending.len() + self.inner.variables_pending.len()
    }
}
