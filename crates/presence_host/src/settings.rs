//! Settings resolution over persisted overrides and declared defaults.
//!
//! A service's persisted settings live under [`settings_storage_key`] as a JSON list of
//! [`PersistedSetting`] records. The effective value of a setting is the persisted value when a
//! record exists, else the declared default.

use std::rc::Rc;

use serde_json::Value;

use crate::{
    error::BridgeError,
    model::{PersistedSetting, SettingDescriptor},
    storage::settings_store::SettingsStore,
};

/// Prefix of the per-service settings storage key.
pub const SETTINGS_KEY_PREFIX: &str = "pSettings_";

/// Returns the storage key isolating one service's settings.
pub fn settings_storage_key(service: &str) -> String {
    format!("{SETTINGS_KEY_PREFIX}{service}")
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// One or more setting ids.
pub struct SettingIds(pub Vec<String>);

impl From<&str> for SettingIds {
    fn from(id: &str) -> Self {
        Self(vec![id.to_string()])
    }
}

impl From<String> for SettingIds {
    fn from(id: String) -> Self {
        Self(vec![id])
    }
}

impl From<Vec<String>> for SettingIds {
    fn from(ids: Vec<String>) -> Self {
        Self(ids)
    }
}

impl From<&[&str]> for SettingIds {
    fn from(ids: &[&str]) -> Self {
        Self(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SettingIds {
    fn from(ids: [&str; N]) -> Self {
        Self(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// Resolves and toggles one service's settings.
#[derive(Clone)]
pub struct SettingsResolver {
    store: Rc<dyn SettingsStore>,
    key: String,
    declared: Vec<SettingDescriptor>,
    write_attempts: usize,
}

impl SettingsResolver {
    /// Creates a resolver for `service`. `write_attempts` bounds compare-and-swap retries (min 1).
    pub fn new(
        store: Rc<dyn SettingsStore>,
        service: &str,
        declared: Vec<SettingDescriptor>,
        write_attempts: usize,
    ) -> Self {
        Self {
            store,
            key: settings_storage_key(service),
            declared,
            write_attempts: write_attempts.max(1),
        }
    }

    /// Returns the storage key this resolver reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the effective value of setting `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::SettingNotFound`] when `id` is neither persisted nor declared with a
    /// default, and storage/decode errors from the host store.
    pub async fn get_setting(&self, id: &str) -> Result<Value, BridgeError> {
        let (_, persisted) = self.load().await?;
        if let Some(setting) = persisted.into_iter().find(|setting| setting.id == id) {
            return Ok(setting.value);
        }
        self.declared
            .iter()
            .find(|setting| setting.id == id)
            .and_then(|setting| setting.value.clone())
            .ok_or_else(|| BridgeError::SettingNotFound(id.to_string()))
    }

    /// Marks persisted settings hidden.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PartialFailure`] naming ids without a persisted record; the found
    /// ids are written first.
    pub async fn hide_setting(&self, ids: impl Into<SettingIds>) -> Result<(), BridgeError> {
        self.set_hidden(ids.into(), true).await
    }

    /// Marks persisted settings visible.
    ///
    /// # Errors
    ///
    /// Same as [`Self::hide_setting`].
    pub async fn show_setting(&self, ids: impl Into<SettingIds>) -> Result<(), BridgeError> {
        self.set_hidden(ids.into(), false).await
    }

    async fn load(&self) -> Result<(Option<String>, Vec<PersistedSetting>), BridgeError> {
        let raw = self
            .store
            .load_settings(&self.key)
            .await
            .map_err(BridgeError::Storage)?;
        let settings = match raw.as_deref() {
            Some(text) => serde_json::from_str(text)?,
            None => Vec::new(),
        };
        Ok((raw, settings))
    }

    async fn set_hidden(&self, ids: SettingIds, hidden: bool) -> Result<(), BridgeError> {
        for attempt in 1..=self.write_attempts {
            let (raw, mut settings) = self.load().await?;
            let mut missing = Vec::new();
            let mut changed = false;
            for id in &ids.0 {
                match settings.iter_mut().find(|setting| &setting.id == id) {
                    Some(setting) => {
                        setting.hidden = hidden;
                        changed = true;
                    }
                    None => missing.push(id.clone()),
                }
            }

            if changed {
                let next = serde_json::to_string(&settings)?;
                let swapped = self
                    .store
                    .compare_and_swap(&self.key, raw.as_deref(), &next)
                    .await
                    .map_err(BridgeError::Storage)?;
                if !swapped {
                    tracing::debug!(key = %self.key, attempt, "settings changed during write, retrying");
                    continue;
                }
            }

            return if missing.is_empty() {
                Ok(())
            } else {
                Err(BridgeError::PartialFailure { missing })
            };
        }

        tracing::warn!(key = %self.key, attempts = self.write_attempts, "settings write kept conflicting");
        Err(BridgeError::Conflict {
            key: self.key.clone(),
            attempts: self.write_attempts,
        })
    }
}
