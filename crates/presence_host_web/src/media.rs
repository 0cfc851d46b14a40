//! `<audio>`/`<video>` adapter for [`presence_host::MediaHandle`].

use presence_host::MediaHandle;

#[derive(Debug, Clone)]
/// Page media element usable with [`presence_host::timestamps_from_media`].
pub struct WebMediaElement(pub web_sys::HtmlMediaElement);

impl MediaHandle for WebMediaElement {
    fn current_time(&self) -> f64 {
        self.0.current_time()
    }

    fn duration(&self) -> f64 {
        self.0.duration()
    }
}
