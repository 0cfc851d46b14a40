//! Correlated request/reply over a broadcast bus.
//!
//! Each outbound request gets a fresh correlation id; the responder echoes it and the reply
//! listener routes the payload to exactly that waiter. Entries leave the table on reply, on
//! deadline, or when the request future is dropped.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
    time::Duration,
};

use futures::{
    channel::oneshot,
    future::{select, Either},
};
use presence_host::{unix_time_ms_now, BridgeError, Timer, CORRELATION_ID_FIELD};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) struct PendingRequests {
    prefix: String,
    next_seq: Cell<u64>,
    waiters: RefCell<HashMap<String, oneshot::Sender<Value>>>,
}

impl PendingRequests {
    pub(crate) fn new(scope: &str) -> Rc<Self> {
        Rc::new(Self {
            prefix: format!("{scope}-{}", unix_time_ms_now()),
            next_seq: Cell::new(0),
            waiters: RefCell::default(),
        })
    }

    fn register(&self) -> (String, oneshot::Receiver<Value>) {
        let seq = self.next_seq.get() + 1;
        self.next_seq.set(seq);
        let id = format!("{}-{seq}", self.prefix);
        let (tx, rx) = oneshot::channel();
        self.waiters.borrow_mut().insert(id.clone(), tx);
        (id, rx)
    }

    fn forget(&self, id: &str) {
        self.waiters.borrow_mut().remove(id);
    }

    /// Routes a reply to its waiter. Returns whether one was waiting.
    pub(crate) fn resolve(&self, detail: Value) -> bool {
        let Some(id) = detail.get(CORRELATION_ID_FIELD).and_then(Value::as_str) else {
            tracing::debug!("dropping reply without correlation id");
            return false;
        };
        let waiter = self.waiters.borrow_mut().remove(id);
        match waiter {
            Some(tx) => tx.send(detail).is_ok(),
            None => {
                tracing::debug!(correlation_id = id, "dropping reply with no pending request");
                false
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.waiters.borrow().len()
    }
}

struct PendingGuard<'a> {
    pending: &'a PendingRequests,
    id: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.forget(&self.id);
    }
}

/// Issues one correlated request and waits for its reply or `timeout`.
///
/// `send` receives the correlation id and performs the outbound side effect.
pub(crate) async fn request<T, F>(
    pending: &PendingRequests,
    timer: &dyn Timer,
    timeout: Duration,
    event: &str,
    send: F,
) -> Result<T, BridgeError>
where
    T: DeserializeOwned,
    F: FnOnce(&str) -> Result<(), String>,
{
    let (id, rx) = pending.register();
    let _guard = PendingGuard {
        pending,
        id: id.clone(),
    };
    send(&id).map_err(BridgeError::Transport)?;

    match select(rx, timer.sleep(timeout)).await {
        Either::Left((Ok(detail), _)) => Ok(serde_json::from_value(detail)?),
        Either::Left((Err(_), _)) => Err(BridgeError::Disconnected {
            event: event.to_string(),
        }),
        Either::Right(((), _)) => {
            tracing::warn!(event, correlation_id = %id, "request timed out");
            Err(BridgeError::Timeout {
                event: event.to_string(),
                after: timeout,
            })
        }
    }
}
