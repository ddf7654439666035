//! Teardown coordination.

use tokio::sync::watch;

/// Coordinator an owning context uses to announce it is going away.
///
/// Backed by a watch channel, so a signal obtained after [`trigger`] still
/// observes the teardown.
///
/// [`trigger`]: Teardown::trigger
#[derive(Debug)]
pub struct Teardown {
    tx: watch::Sender<bool>,
}

impl Teardown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Get a signal that resolves once teardown is triggered.
    pub fn signal(&self) -> TeardownSignal {
        TeardownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger teardown. Repeated calls have no further effect.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|torn_down| !std::mem::replace(torn_down, true));
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of signals still held by listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side of a [`Teardown`].
#[derive(Debug, Clone)]
pub struct TeardownSignal {
    rx: watch::Receiver<bool>,
}

impl TeardownSignal {
    /// Wait for teardown.
    ///
    /// Also resolves if the coordinator itself is dropped.
    pub async fn triggered(&mut self) {
        let _ = self.rx.wait_for(|torn_down| *torn_down).await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}
