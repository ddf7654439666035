//! Shared producers for integration tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::time::Instant;

use resilient_fetch::{BoxError, Producer};

/// What one scripted invocation does.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Step<T> {
    Ok(T),
    Err(&'static str),
    /// Resolve with `Ok` after a delay.
    SlowOk(T, Duration),
    /// Hang until the attempt deadline fires.
    Hang,
    Panic(&'static str),
}

/// Producer that replays a script and records when each call happened.
///
/// Once the script runs out, the last step repeats.
#[derive(Clone)]
pub struct ScriptedProducer<T> {
    inner: Arc<Mutex<Script<T>>>,
}

struct Script<T> {
    steps: VecDeque<Step<T>>,
    last: Option<Step<T>>,
    calls: Vec<Instant>,
}

#[allow(dead_code)]
impl<T: Clone + Send + Sync + 'static> ScriptedProducer<T> {
    pub fn new(steps: impl IntoIterator<Item = Step<T>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                steps: steps.into_iter().collect(),
                last: None,
                calls: Vec::new(),
            })),
        }
    }

    pub fn always_failing(message: &'static str) -> Self {
        Self::new([Step::Err(message)])
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }

    /// Time between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = &self.inner.lock().calls;
        calls.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    fn next_step(&self) -> Step<T> {
        let mut script = self.inner.lock();
        script.calls.push(Instant::now());
        match script.steps.pop_front() {
            Some(step) => {
                script.last = Some(step.clone());
                step
            }
            None => script
                .last
                .clone()
                .unwrap_or(Step::Err("script is empty")),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Producer<T> for ScriptedProducer<T> {
    fn produce(&self) -> BoxFuture<'static, Result<T, BoxError>> {
        let step = self.next_step();
        async move {
            match step {
                Step::Ok(value) => Ok(value),
                Step::Err(message) => Err(message.into()),
                Step::SlowOk(value, delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(value)
                }
                Step::Hang => std::future::pending().await,
                Step::Panic(message) => panic!("{message}"),
            }
        }
        .boxed()
    }
}

/// Assert a measured gap is the expected delay, give or take timer rounding.
#[allow(dead_code)]
pub fn assert_gap(actual: Duration, expected: Duration) {
    let tolerance = Duration::from_millis(10);
    assert!(
        actual >= expected && actual <= expected + tolerance,
        "expected gap of ~{expected:?}, got {actual:?}"
    );
}
