//! Broadcast event vocabulary and payload shapes.
//!
//! Event names are the wire contract with the host and must not change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::PresenceData;

/// Page to host: presence update or clear.
pub const UPDATE_PRESENCE: &str = "PreMiD_UpdatePresence";
/// Page to host: resolve a strings template.
pub const REQUEST_EXTENSION_DATA: &str = "PreMiD_RequestExtensionData";
/// Host to page: resolved strings.
pub const RECEIVE_EXTENSION_DATA: &str = "PreMiD_ReceiveExtensionData";
/// Injected probe to page: serialized page global.
pub const PAGE_VARIABLE: &str = "PreMiD_PageVariable";
/// Host to page: presence should be recomputed.
pub const UPDATE_DATA: &str = "PreMiD_UpdateData";
/// Host to page: whether this tab drives the displayed presence.
pub const TAB_PRIORITY: &str = "PreMiD_TabPriority";
/// Iframe to main frame: arbitrary payload.
pub const IFRAME_DATA: &str = "PreMiD_iFrameData";
/// Iframe to host: request the iframe URL.
pub const GET_IFRAME_URL: &str = "PreMiD_GetiFrameURL";
/// Host to iframe: the iframe URL.
pub const IFRAME_URL: &str = "PreMiD_iFrameURL";

/// Field carrying the request/reply correlation id in every correlated payload.
pub const CORRELATION_ID_FIELD: &str = "correlationId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`UPDATE_PRESENCE`].
pub struct PresenceUpdate {
    /// Application id the host renders under. Absent when clearing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Snapshot to show; empty when clearing.
    pub presence_data: PresenceData,
    /// Short tray label. Absent when clearing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tray_title: Option<String>,
    /// Whether media is currently playing.
    pub playback: bool,
    /// Set when the presence should be hidden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl PresenceUpdate {
    /// Builds an update advertising `presence_data`.
    pub fn active(
        client_id: impl Into<String>,
        presence_data: PresenceData,
        tray_title: impl Into<String>,
        playback: bool,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            presence_data,
            tray_title: Some(tray_title.into()),
            playback,
            hidden: None,
        }
    }

    /// Builds the clear payload `{presenceData: {}, playback: false, hidden: true}`.
    pub fn cleared() -> Self {
        Self {
            client_id: None,
            presence_data: PresenceData::default(),
            tray_title: None,
            playback: false,
            hidden: Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`REQUEST_EXTENSION_DATA`].
pub struct StringsRequest {
    /// Request correlation id.
    pub correlation_id: String,
    /// Template of output key to host string id.
    pub strings: BTreeMap<String, String>,
    /// Locale tag, `null` for the host's language.
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`RECEIVE_EXTENSION_DATA`].
pub struct StringsReply {
    /// Echoed correlation id.
    pub correlation_id: String,
    /// Template keys mapped to translated text.
    pub strings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How the probe serialized a page global.
pub enum VariableKind {
    /// The global was a string and is sent verbatim.
    String,
    /// The global was JSON-serialized.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`PAGE_VARIABLE`].
pub struct PageVariableReply {
    /// Echoed correlation id.
    pub correlation_id: String,
    /// Serialization used for `value`.
    pub kind: VariableKind,
    /// Raw string or JSON text.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`GET_IFRAME_URL`].
pub struct IframeUrlRequest {
    /// Request correlation id.
    pub correlation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`IFRAME_URL`].
pub struct IframeUrlReply {
    /// Echoed correlation id.
    pub correlation_id: String,
    /// URL of the frame the request came from.
    pub url: String,
}
