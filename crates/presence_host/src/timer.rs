//! Timer contract used to bound cross-context requests.

use std::{future::Future, pin::Pin, time::Duration};

/// Object-safe boxed future returned by [`Timer::sleep`].
pub type TimerFuture = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Host timer service.
pub trait Timer {
    /// Returns a future completing once `duration` has elapsed.
    fn sleep(&self, duration: Duration) -> TimerFuture;
}

#[derive(Debug, Clone, Copy, Default)]
/// Timer whose deadlines elapse immediately.
pub struct ImmediateTimer;

impl Timer for ImmediateTimer {
    fn sleep(&self, _duration: Duration) -> TimerFuture {
        Box::pin(async {})
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Timer whose deadlines never elapse.
pub struct NeverTimer;

impl Timer for NeverTimer {
    fn sleep(&self, _duration: Duration) -> TimerFuture {
        Box::pin(futures::future::pending())
    }
}
