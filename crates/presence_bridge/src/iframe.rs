//! Reduced bridge for subordinate frames.
//!
//! An iframe cannot reach the host directly: it pushes payloads up to the main-frame bridge,
//! asks for its own URL, and listens for host update requests.

use std::{cell::RefCell, rc::Rc};

use presence_host::{
    BridgeError, EventBus, IframeUrlReply, IframeUrlRequest, ListenerId, Timer, GET_IFRAME_URL,
    IFRAME_DATA, IFRAME_URL, UPDATE_DATA,
};
use serde_json::Value;

use crate::{
    config::BridgeConfig,
    pending::{self, PendingRequests},
};

type Callback = Rc<dyn Fn(Value)>;

/// Iframe-side façade over the bridge.
pub struct IframeBridge {
    bus: Rc<dyn EventBus>,
    timer: Rc<dyn Timer>,
    config: BridgeConfig,
    pending: Rc<PendingRequests>,
    update_data: Rc<RefCell<Option<Callback>>>,
    listeners: Vec<ListenerId>,
}

impl IframeBridge {
    /// Creates an iframe bridge listening for host updates and URL replies on `bus`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] when the bus refuses a subscription.
    pub fn new(
        bus: Rc<dyn EventBus>,
        timer: Rc<dyn Timer>,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let mut bridge = Self {
            bus,
            timer,
            config,
            pending: PendingRequests::new("iframe"),
            update_data: Rc::default(),
            listeners: Vec::new(),
        };

        let update_data = bridge.update_data.clone();
        let id = bridge
            .bus
            .listen(
                UPDATE_DATA,
                Rc::new(move |_| {
                    let callback = update_data.borrow().clone();
                    if let Some(callback) = callback {
                        callback(Value::Null);
                    }
                }),
            )
            .map_err(BridgeError::Transport)?;
        bridge.listeners.push(id);

        let pending = bridge.pending.clone();
        let id = bridge
            .bus
            .listen(
                IFRAME_URL,
                Rc::new(move |detail| {
                    pending.resolve(detail);
                }),
            )
            .map_err(BridgeError::Transport)?;
        bridge.listeners.push(id);

        Ok(bridge)
    }

    /// Pushes `payload` to the main frame's `"iFrameData"` callback. Fire-and-forget.
    pub fn send(&self, payload: Value) {
        if let Err(err) = self.bus.dispatch(IFRAME_DATA, payload) {
            tracing::warn!("iframe data dispatch failed: {err}");
        }
    }

    /// Asks the host for this frame's URL.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Timeout`] when the host does not answer in time.
    pub async fn get_url(&self) -> Result<String, BridgeError> {
        let reply: IframeUrlReply = pending::request(
            &self.pending,
            self.timer.as_ref(),
            self.config.request_timeout(),
            GET_IFRAME_URL,
            |correlation_id| {
                let request = IframeUrlRequest {
                    correlation_id: correlation_id.to_string(),
                };
                let detail = serde_json::to_value(request).map_err(|e| e.to_string())?;
                self.bus.dispatch(GET_IFRAME_URL, detail)
            },
        )
        .await?;
        Ok(reply.url)
    }

    /// Sets the `"UpdateData"` callback, replacing any previous one. Other names are rejected
    /// with an error log.
    pub fn on(&self, event: &str, callback: impl Fn(Value) + 'static) {
        if event == "UpdateData" {
            *self.update_data.borrow_mut() = Some(Rc::new(callback));
        } else {
            tracing::error!("{event} is not a valid iframe event name");
        }
    }

    /// Returns how many URL requests are awaiting a reply.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for IframeBridge {
    fn drop(&mut self) {
        for id in self.listeners.drain(..) {
            self.bus.unlisten(id);
        }
    }
}
