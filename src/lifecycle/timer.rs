//! Owned, cancellable timers.

use std::time::Duration;

use tokio::task::AbortHandle;

/// A callback scheduled to run once after a delay.
///
/// The handle owns the registration: cancelling it or dropping it
/// guarantees the callback will not run if it has not started yet.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    /// Schedule `callback` to run after `delay` on the current runtime.
    pub fn schedule<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        Self {
            abort: task.abort_handle(),
        }
    }

    /// Cancel the timer.
    pub fn cancel(self) {
        drop(self);
    }

    /// True once the callback ran or the timer was cancelled.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}
