//! `setTimeout`-backed deadline source implementing [`presence_host::Timer`].

use std::time::Duration;

use presence_host::{Timer, TimerFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Timer resolving after a browser `setTimeout`. Off-browser it never fires, like
/// [`presence_host::NeverTimer`], so native builds hold no OS resources per request.
pub struct WebTimer;

impl Timer for WebTimer {
    fn sleep(&self, duration: Duration) -> TimerFuture {
        #[cfg(target_arch = "wasm32")]
        {
            let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
            Box::pin(async move {
                let promise = js_sys::Promise::new(&mut |resolve, _reject| {
                    let Some(window) = web_sys::window() else {
                        tracing::warn!("window unavailable; timer will never fire");
                        return;
                    };
                    if let Err(err) = window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
                    {
                        tracing::warn!("setTimeout failed: {err:?}");
                    }
                });
                let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = duration;
            Box::pin(futures::future::pending())
        }
    }
}
