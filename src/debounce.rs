//! Value debouncing.
//!
//! A pushed value only becomes current after no newer value was pushed for
//! the configured delay. Typical use is coalescing keystrokes before a search
//! refetch.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::DebounceConfig;
use crate::lifecycle::TimerHandle;
use crate::observability::metrics;

pub struct Debouncer<T> {
    delay: Duration,
    value: Arc<watch::Sender<T>>,
    pending: Mutex<Option<TimerHandle>>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (value, _) = watch::channel(initial);
        Self {
            delay,
            value: Arc::new(value),
            pending: Mutex::new(None),
        }
    }

    pub fn from_config(initial: T, config: &DebounceConfig) -> Self {
        Self::new(initial, config.delay())
    }

    /// Push a new raw value, restarting the quiet period.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn push(&self, next: T) {
        let value = Arc::clone(&self.value);
        let timer = TimerHandle::schedule(self.delay, move || {
            let changed = value.send_if_modified(|current| {
                if *current == next {
                    false
                } else {
                    *current = next;
                    true
                }
            });
            if changed {
                metrics::record_debounce_published();
            }
        });

        // Replacing the handle cancels the previous timer.
        *self.pending.lock() = Some(timer);
    }

    /// Drop the pending value, keeping the current one.
    pub fn cancel(&self) {
        if let Some(timer) = self.pending.lock().take() {
            timer.cancel();
        }
    }

    /// The last published value.
    pub fn current(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
