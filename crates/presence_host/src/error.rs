//! Error type shared by the bridges and the settings resolver.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced by bridge operations.
///
/// Host adapters report plain `String` errors; the bridge maps those into [`Self::Transport`]
/// or [`Self::Storage`] depending on which boundary produced them.
pub enum BridgeError {
    /// The setting id is neither persisted nor declared by the service metadata.
    #[error("setting not found: {0}")]
    SettingNotFound(String),
    /// Some ids of a batch visibility change were not persisted. The found ids were written.
    #[error("settings not found: {}", missing.join(", "))]
    PartialFailure {
        /// Ids that had no persisted record.
        missing: Vec<String>,
    },
    /// The persisted settings kept changing underneath a compare-and-swap write.
    #[error("settings `{key}` changed concurrently; gave up after {attempts} attempts")]
    Conflict {
        /// Storage key that was contended.
        key: String,
        /// Number of write attempts made.
        attempts: usize,
    },
    /// No correlated reply arrived before the request deadline.
    #[error("no reply to `{event}` within {}ms", after.as_millis())]
    Timeout {
        /// Outbound event name of the request.
        event: String,
        /// Deadline that elapsed.
        after: Duration,
    },
    /// The pending request was dropped before a reply or deadline (bridge torn down).
    #[error("request `{event}` was abandoned before a reply arrived")]
    Disconnected {
        /// Outbound event name of the request.
        event: String,
    },
    /// Event bus or page probe failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Host storage failure.
    #[error("storage error: {0}")]
    Storage(String),
    /// A payload could not be decoded or encoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// The service theme color is not a 3- or 6-digit hex color.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// The host version string carries no usable digits.
    #[error("invalid extension version `{0}`")]
    InvalidVersion(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
