//! Host service bundle injected into the bridges.

use std::rc::Rc;

use crate::{ConsoleSink, EventBus, PageScope, SettingsStore, Timer};

/// Read-only facts about the host extension.
pub trait HostInfo {
    /// Returns the host's reported version string.
    ///
    /// # Errors
    ///
    /// Returns an error when the host runtime is unreachable.
    fn extension_version(&self) -> Result<String, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Host info with a fixed version.
pub struct StaticHostInfo(pub String);

impl HostInfo for StaticHostInfo {
    fn extension_version(&self) -> Result<String, String> {
        Ok(self.0.clone())
    }
}

/// Capability handles the main-frame bridge talks to.
///
/// All environment-specific selection happens before this bundle is built, which keeps the
/// bridges free of browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Broadcast transport shared with the host.
    pub bus: Rc<dyn EventBus>,
    /// Persisted settings storage.
    pub settings: Rc<dyn SettingsStore>,
    /// Page-global probe injection.
    pub page: Rc<dyn PageScope>,
    /// Deadline source for correlated requests.
    pub timer: Rc<dyn Timer>,
    /// Themed diagnostics target.
    pub console: Rc<dyn ConsoleSink>,
    /// Host version source.
    pub host_info: Rc<dyn HostInfo>,
}
