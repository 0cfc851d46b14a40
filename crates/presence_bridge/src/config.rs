//! Bridge tuning knobs.

use std::time::Duration;

use presence_host::BridgeError;
use serde::{Deserialize, Serialize};

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SETTINGS_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Runtime configuration shared by both bridges.
pub struct BridgeConfig {
    /// Deadline for correlated requests, in milliseconds.
    pub request_timeout_ms: u64,
    /// Compare-and-swap attempts for settings visibility writes.
    pub settings_write_attempts: usize,
    /// Emits `info`/`success` diagnostics. Errors are always emitted.
    pub diagnostics: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            settings_write_attempts: DEFAULT_SETTINGS_WRITE_ATTEMPTS,
            diagnostics: true,
        }
    }
}

impl BridgeConfig {
    /// Parses a JSON config; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Decode`] on malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Returns the correlated-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
