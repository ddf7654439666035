//! Resilient fetch controller.
//!
//! # Responsibilities
//! - Run the producer on creation and on every `refetch`
//! - Retry failed attempts with backoff, up to `max_retries`
//! - Publish `FetchState` to the presentation layer
//! - Stop applying results once disposed or superseded
//!
//! # Design Decisions
//! - Every guard check and the state write it protects happen under one lock
//! - The lock is never held across an await or while user callbacks run
//! - Disposal never aborts an in-flight producer call; its result is discarded
//! - A retry timer only spawns the next attempt, so cancelling it cannot
//!   interrupt a producer that already started

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::FetchConfig;
use crate::error::{AttemptError, ErrorInfo, FetchError, FetchResult};
use crate::fetch::options::FetchOptions;
use crate::fetch::producer::Producer;
use crate::fetch::state::{FetchPhase, FetchState, Generation};
use crate::lifecycle::{TeardownSignal, TimerHandle};
use crate::observability::metrics::{self, Outcome};
use crate::resilience::timeouts::run_attempt;
use crate::resilience::{Backoff, RetryCounter};

type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&ErrorInfo) + Send + Sync>;

/// Mutable bookkeeping, always accessed under `Shared::core`.
struct Core {
    live: bool,
    generation: Generation,
    retries: RetryCounter,
    phase: FetchPhase,
    pending_retry: Option<TimerHandle>,
}

impl Core {
    fn accepts(&self, generation: Generation) -> bool {
        self.live && self.generation == generation
    }
}

struct Shared<T> {
    id: Uuid,
    producer: Box<dyn Producer<T>>,
    options: FetchOptions,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
    core: Mutex<Core>,
    state: watch::Sender<FetchState<T>>,
    liveness: watch::Sender<bool>,
    attempts: AtomicU64,
}

impl<T> Shared<T> {
    fn dispose(&self) {
        let pending = {
            let mut core = self.core.lock();
            if !core.live {
                return;
            }
            core.live = false;
            core.phase = FetchPhase::Disposed;
            self.liveness.send_replace(false);
            core.pending_retry.take()
        };

        if let Some(timer) = pending {
            timer.cancel();
            tracing::debug!(controller = %self.id, "Cancelled pending retry on dispose");
        }
        tracing::debug!(controller = %self.id, "Controller disposed");
    }

    fn discard(&self, generation: Generation, reason: &'static str) {
        metrics::record_outcome(Outcome::Discarded);
        tracing::debug!(controller = %self.id, generation = %generation, reason, "Discarding attempt result");
    }
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn refetch(self: &Arc<Self>) -> FetchResult<Generation> {
        let generation = {
            let mut core = self.core.lock();
            if !core.live {
                return Err(FetchError::Disposed);
            }
            core.generation = core.generation.next();
            core.retries.reset();
            if let Some(timer) = core.pending_retry.take() {
                timer.cancel();
                tracing::debug!(controller = %self.id, "Superseded pending retry");
            }
            core.phase = FetchPhase::Loading;
            self.state.send_modify(|state| {
                state.is_loading = true;
                state.error = None;
            });
            core.generation
        };

        tracing::debug!(controller = %self.id, generation = %generation, "Fetch started");
        Self::spawn_attempt(Arc::clone(self), generation);
        Ok(generation)
    }

    fn spawn_attempt(shared: Arc<Self>, generation: Generation) {
        tokio::spawn(shared.attempt(generation));
    }

    async fn attempt(self: Arc<Self>, generation: Generation) {
        let attempt = {
            let mut core = self.core.lock();
            if !core.accepts(generation) {
                drop(core);
                self.discard(generation, "superseded before start");
                return;
            }
            core.pending_retry = None;
            core.phase = FetchPhase::Loading;
            self.attempts.fetch_add(1, Ordering::SeqCst) + 1
        };

        metrics::record_attempt();
        tracing::debug!(controller = %self.id, generation = %generation, attempt, "Invoking producer");

        let started = Instant::now();
        let outcome = run_attempt(self.producer.produce(), self.options.attempt_timeout).await;
        metrics::record_attempt_duration(started.elapsed());

        match outcome {
            Ok(value) => self.settle_success(generation, value),
            Err(err) => self.handle_failure(generation, err),
        }
    }

    fn settle_success(&self, generation: Generation, value: T) {
        let callback_value = {
            let mut core = self.core.lock();
            if !core.accepts(generation) {
                drop(core);
                self.discard(generation, "stale success");
                return;
            }
            core.retries.reset();
            core.phase = FetchPhase::Succeeded;
            let callback_value = self.on_success.as_ref().map(|_| value.clone());
            self.state.send_modify(|state| {
                state.data = Some(value);
                state.error = None;
                state.is_loading = false;
            });
            callback_value
        };

        metrics::record_outcome(Outcome::Success);
        tracing::info!(controller = %self.id, generation = %generation, "Fetch succeeded");

        if let (Some(callback), Some(value)) = (&self.on_success, callback_value) {
            callback(&value);
        }
    }

    fn handle_failure(self: &Arc<Self>, generation: Generation, err: AttemptError) {
        let info = ErrorInfo::from(&err);
        let mut core = self.core.lock();
        if !core.accepts(generation) {
            drop(core);
            self.discard(generation, "stale failure");
            return;
        }

        if let Some(retry) = core.retries.try_increment() {
            let delay = self.options.backoff.delay(retry);
            core.phase = FetchPhase::RetryScheduled;
            let shared = Arc::clone(self);
            core.pending_retry = Some(TimerHandle::schedule(delay, move || {
                Self::spawn_attempt(shared, generation)
            }));
            drop(core);

            metrics::record_retry_scheduled(delay);
            tracing::warn!(
                controller = %self.id,
                generation = %generation,
                retry,
                max_retries = self.options.max_retries,
                delay_ms = delay_millis(delay),
                error = %info,
                "Attempt failed, retry scheduled"
            );
            return;
        }

        core.phase = FetchPhase::Failed;
        self.state.send_modify(|state| {
            state.data = None;
            state.error = Some(info.clone());
            state.is_loading = false;
        });
        drop(core);

        metrics::record_outcome(Outcome::Failure);
        tracing::warn!(
            controller = %self.id,
            generation = %generation,
            max_retries = self.options.max_retries,
            error = %info,
            "Fetch failed, retries exhausted"
        );

        if let Some(callback) = &self.on_error {
            callback(&info);
        }
    }
}

fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Builder for [`FetchController`].
pub struct FetchControllerBuilder<T> {
    producer: Box<dyn Producer<T>>,
    options: FetchOptions,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> FetchControllerBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.options.max_retries = max_retries;
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.options.backoff = backoff;
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.options.attempt_timeout = Some(timeout);
        self
    }

    /// Replace every retry option at once.
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Called with the value of every successful settle.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Called once retries are exhausted.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ErrorInfo) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Create the controller and begin the first attempt.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> FetchController<T> {
        let (state, _) = watch::channel(FetchState::loading());
        let (liveness, _) = watch::channel(true);
        let shared = Arc::new(Shared {
            id: Uuid::new_v4(),
            producer: self.producer,
            options: self.options,
            on_success: self.on_success,
            on_error: self.on_error,
            core: Mutex::new(Core {
                live: true,
                generation: Generation(0),
                retries: RetryCounter::new(self.options.max_retries),
                phase: FetchPhase::Idle,
                pending_retry: None,
            }),
            state,
            liveness,
            attempts: AtomicU64::new(0),
        });

        tracing::debug!(
            controller = %shared.id,
            max_retries = shared.options.max_retries,
            "Fetch controller created"
        );

        let controller = FetchController { shared };
        // A fresh controller is live, so the first refetch cannot fail.
        let _ = controller.refetch();
        controller
    }
}

/// Manages one retrieval with bounded automatic retries.
///
/// Dropping the controller disposes it.
///
/// ```no_run
/// # async fn demo() {
/// use resilient_fetch::FetchController;
///
/// let controller = FetchController::builder(|| async { Ok::<_, std::io::Error>(42u32) })
///     .max_retries(2)
///     .start();
///
/// let state = controller.settled().await.expect("not disposed");
/// assert_eq!(state.data, Some(42));
/// # }
/// ```
pub struct FetchController<T> {
    shared: Arc<Shared<T>>,
}

impl<T> FetchController<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn builder<P>(producer: P) -> FetchControllerBuilder<T>
    where
        P: Producer<T>,
    {
        FetchControllerBuilder {
            producer: Box::new(producer),
            options: FetchOptions::default(),
            on_success: None,
            on_error: None,
        }
    }

    /// Start a controller with retry options taken from `config`.
    pub fn from_config<P>(producer: P, config: &FetchConfig) -> Self
    where
        P: Producer<T>,
    {
        Self::builder(producer)
            .options(FetchOptions::from(config))
            .start()
    }

    /// Start a new attempt, superseding anything pending.
    pub fn refetch(&self) -> FetchResult<Generation> {
        self.shared.refetch()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }

    /// Read-only view for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    /// Wait for the current invocation to settle.
    ///
    /// Returns `None` if the controller is disposed before that.
    pub async fn settled(&self) -> Option<FetchState<T>> {
        let mut state = self.shared.state.subscribe();
        let mut liveness = self.shared.liveness.subscribe();

        tokio::select! {
            biased;
            settled = state.wait_for(|s| !s.is_loading) => settled.ok().map(|s| (*s).clone()),
            _ = liveness.wait_for(|live| !*live) => None,
        }
    }

    /// Dispose the controller when `signal` fires.
    pub fn dispose_on(&self, mut signal: TeardownSignal) {
        let shared: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        let mut liveness = self.shared.liveness.subscribe();

        tokio::spawn(async move {
            tokio::select! {
                _ = signal.triggered() => {
                    if let Some(shared) = shared.upgrade() {
                        tracing::debug!(controller = %shared.id, "Teardown signalled");
                        shared.dispose();
                    }
                }
                _ = liveness.wait_for(|live| !*live) => {}
            }
        });
    }
}

impl<T> FetchController<T> {
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn phase(&self) -> FetchPhase {
        self.shared.core.lock().phase
    }

    pub fn generation(&self) -> Generation {
        self.shared.core.lock().generation
    }

    /// Retries used by the current invocation.
    pub fn retry_count(&self) -> u32 {
        self.shared.core.lock().retries.current()
    }

    /// Total producer invocations over the controller's lifetime.
    pub fn attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    pub fn options(&self) -> &FetchOptions {
        &self.shared.options
    }

    pub fn is_live(&self) -> bool {
        self.shared.core.lock().live
    }

    /// Stop applying state changes and cancel any pending retry.
    ///
    /// An in-flight producer call keeps running; its result is ignored.
    pub fn dispose(&self) {
        self.shared.dispose();
    }
}

impl<T> Drop for FetchController<T> {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

impl<T> fmt::Debug for FetchController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.lock();
        f.debug_struct("FetchController")
            .field("id", &self.shared.id)
            .field("phase", &core.phase)
            .field("generation", &core.generation)
            .field("retries", &core.retries.current())
            .finish()
    }
}
