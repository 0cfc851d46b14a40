use std::rc::Rc;

use presence_host::HostServices;

use crate::{
    ExtensionHostInfo, ExtensionSettingsStore, WebConsole, WebPageScope, WebTimer, WindowEventBus,
};

/// Builds the service bundle used by page scripts running in a browser tab.
pub fn browser_host_services() -> HostServices {
    HostServices {
        bus: Rc::new(WindowEventBus::default()),
        settings: Rc::new(ExtensionSettingsStore),
        page: Rc::new(WebPageScope),
        timer: Rc::new(WebTimer),
        console: Rc::new(WebConsole),
        host_info: Rc::new(ExtensionHostInfo),
    }
}
