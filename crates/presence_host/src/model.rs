//! Presence snapshot, service metadata, and settings models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Presence state advertised to the host. Every field is optional.
pub struct PresenceData {
    /// Second line of the presence card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// First line of the presence card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Absolute start time in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<i64>,
    /// Absolute end time in unix seconds; with a start it renders a remaining-time bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<i64>,
    /// Large image asset key or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image_key: Option<String>,
    /// Hover text for the large image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image_text: Option<String>,
    /// Small image asset key or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image_key: Option<String>,
    /// Hover text for the small image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image_text: Option<String>,
    /// Link buttons shown under the card (hosts render at most two).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<PresenceButton>,
}

impl PresenceData {
    /// Returns whether the snapshot carries nothing to show.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Labeled link rendered under a presence card.
pub struct PresenceButton {
    /// Button caption.
    pub label: String,
    /// Target URL.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Author or contributor identity.
pub struct Contributor {
    /// Display name.
    pub name: String,
    /// Account id.
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// Page URL(s) a service matches.
pub enum UrlPattern {
    /// A single host pattern.
    One(String),
    /// Several host patterns.
    Many(Vec<String>),
}

impl UrlPattern {
    /// Returns every pattern as a slice-like list.
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::One(url) => vec![url.as_str()],
            Self::Many(urls) => urls.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Externally supplied description of one service integration.
///
/// The bridge only reads it; authoring and validation happen elsewhere.
pub struct ServiceMetadata {
    /// Primary author.
    pub author: Contributor,
    /// Additional contributors.
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    /// Human-readable service name. Also scopes persisted settings.
    pub service: String,
    /// Alternative service names.
    #[serde(default)]
    pub altnames: Vec<String>,
    /// Description per locale tag.
    #[serde(default)]
    pub description: BTreeMap<String, String>,
    /// Matching page URL(s).
    pub url: UrlPattern,
    /// Optional URL regular expression overriding `url` matching.
    #[serde(default, rename = "regExp", skip_serializing_if = "Option::is_none")]
    pub reg_exp: Option<String>,
    /// Semantic version of the integration.
    pub version: String,
    /// Logo URL.
    pub logo: String,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Theme color as a hex string.
    pub color: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Store category.
    pub category: String,
    /// Whether the integration also runs inside iframes.
    #[serde(default)]
    pub iframe: bool,
    /// URL regular expression iframes must match.
    #[serde(default, rename = "iFrameRegExp", skip_serializing_if = "Option::is_none")]
    pub iframe_reg_exp: Option<String>,
    /// Whether the integration wants console log access.
    #[serde(default)]
    pub read_logs: bool,
    /// Declared settings with their defaults.
    #[serde(default)]
    pub settings: Vec<SettingDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Setting declared in service metadata.
pub struct SettingDescriptor {
    /// Setting id.
    pub id: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Icon class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Visibility rule: setting id to the value it must hold for this one to show.
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<BTreeMap<String, Value>>,
    /// Input placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Declared default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Enumerated choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    /// Language picker setting resolved by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_language: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Stored override for a declared setting.
pub struct PersistedSetting {
    /// Setting id.
    pub id: String,
    /// Stored value.
    #[serde(default)]
    pub value: Value,
    /// Whether the host hides the setting.
    #[serde(default)]
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn metadata_parses_wire_field_names() {
        let metadata: ServiceMetadata = serde_json::from_value(json!({
            "author": {"name": "dev", "id": "1"},
            "service": "Example",
            "description": {"en": "Example service"},
            "url": ["example.com", "www.example.com"],
            "regExp": "([a-z0-9-]+[.])*example[.]com[/]",
            "version": "1.2.0",
            "logo": "https://example.com/logo.png",
            "thumbnail": "https://example.com/thumb.png",
            "color": "#ff0000",
            "tags": ["video"],
            "category": "videos",
            "iframe": true,
            "iFrameRegExp": ".*",
            "settings": [
                {"id": "buttons", "title": "Show Buttons", "icon": "fas fa-hand", "value": true},
                {"id": "mode", "if": {"buttons": true}, "value": 0, "values": ["a", "b"]}
            ]
        }))
        .expect("metadata should parse");

        assert_eq!(metadata.url.patterns(), vec!["example.com", "www.example.com"]);
        assert!(metadata.iframe);
        assert_eq!(metadata.iframe_reg_exp.as_deref(), Some(".*"));
        let mode = &metadata.settings[1];
        assert_eq!(mode.id, "mode");
        assert_eq!(mode.condition.as_ref().and_then(|c| c.get("buttons")), Some(&json!(true)));
        assert_eq!(mode.values.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn presence_data_omits_unset_fields() {
        let data = PresenceData {
            details: Some("Watching".to_string()),
            start_timestamp: Some(10),
            ..PresenceData::default()
        };
        assert_eq!(
            serde_json::to_value(&data).expect("serialize"),
            json!({"details": "Watching", "startTimestamp": 10})
        );
        assert!(PresenceData::default().is_empty());
        assert!(!data.is_empty());
    }

    #[test]
    fn persisted_setting_defaults_hidden_to_false() {
        let setting: PersistedSetting =
            serde_json::from_value(json!({"id": "a", "value": 3})).expect("parse");
        assert!(!setting.hidden);
    }
}
