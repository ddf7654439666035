//! Failure injection tests for the fetch controller.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use resilient_fetch::{
    Backoff, ErrorInfo, FetchConfig, FetchController, FetchPhase, FetchState,
};

mod common;
use common::{assert_gap, ScriptedProducer, Step};

#[tokio::test(start_paused = true)]
async fn test_retry_then_success_with_linear_backoff() {
    let producer = ScriptedProducer::new([Step::Err("e1"), Step::Err("e2"), Step::Ok(42)]);
    let successes = Arc::new(AtomicU32::new(0));
    let s = successes.clone();

    let controller = FetchController::builder(producer.clone())
        .max_retries(2)
        .backoff(Backoff::linear(Duration::from_millis(1000)))
        .on_success(move |value| {
            assert_eq!(*value, 42);
            s.fetch_add(1, Ordering::SeqCst);
        })
        .start();

    let state = controller.settled().await.expect("controller is live");
    assert_eq!(
        state,
        FetchState {
            data: Some(42),
            is_loading: false,
            error: None,
        }
    );
    assert_eq!(producer.call_count(), 3);
    assert_eq!(controller.attempts(), 3);
    assert_eq!(controller.retry_count(), 0);
    assert_eq!(controller.phase(), FetchPhase::Succeeded);
    assert_eq!(successes.load(Ordering::SeqCst), 1);

    let gaps = producer.gaps();
    assert_eq!(gaps.len(), 2);
    assert_gap(gaps[0], Duration::from_millis(1000));
    assert_gap(gaps[1], Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn test_no_retries_surfaces_first_error() {
    let producer = ScriptedProducer::<u32>::always_failing("boom");
    let errors: Arc<Mutex<Vec<ErrorInfo>>> = Arc::default();
    let e = errors.clone();

    let controller = FetchController::builder(producer.clone())
        .max_retries(0)
        .on_error(move |error| e.lock().push(error.clone()))
        .start();

    let state = controller.settled().await.expect("controller is live");
    assert_eq!(state.data, None);
    assert!(!state.is_loading);
    assert_eq!(state.error.as_ref().map(|e| e.message.as_str()), Some("boom"));
    assert_eq!(producer.call_count(), 1);
    assert_eq!(controller.phase(), FetchPhase::Failed);

    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "boom");
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_attempts_exactly_max_plus_one() {
    for max_retries in 0..=4u32 {
        let producer = ScriptedProducer::<u32>::always_failing("down");
        let controller = FetchController::builder(producer.clone())
            .max_retries(max_retries)
            .backoff(Backoff::linear(Duration::from_millis(100)))
            .start();

        let state = controller.settled().await.expect("controller is live");
        assert!(state.is_failure());
        assert_eq!(producer.call_count(), max_retries as usize + 1);
        assert_eq!(controller.retry_count(), max_retries);

        // Nothing else fires once failed.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(producer.call_count(), max_retries as usize + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_fails_k_times_then_succeeds() {
    let max_retries = 4;
    for fails in 0..=max_retries {
        let mut steps: Vec<Step<u32>> = (0..fails).map(|_| Step::Err("flaky")).collect();
        steps.push(Step::Ok(fails));
        let producer = ScriptedProducer::new(steps);

        let controller = FetchController::builder(producer.clone())
            .max_retries(max_retries)
            .backoff(Backoff::linear(Duration::from_millis(50)))
            .start();

        let state = controller.settled().await.expect("controller is live");
        assert_eq!(state.data, Some(fails));
        assert!(state.error.is_none());
        assert_eq!(controller.retry_count(), 0);
        assert_eq!(producer.call_count(), fails as usize + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_failure_clears_previous_data() {
    let producer = ScriptedProducer::new([Step::Ok(1u32), Step::Err("gone")]);
    let controller = FetchController::builder(producer.clone()).start();
    assert_eq!(controller.settled().await.unwrap().data, Some(1));

    controller.refetch().unwrap();
    let state = controller.settled().await.unwrap();
    assert_eq!(state.data, None);
    assert_eq!(state.error.unwrap().message, "gone");
}

#[tokio::test(start_paused = true)]
async fn test_error_hidden_while_retry_is_pending() {
    let producer = ScriptedProducer::new([Step::Err("first"), Step::Ok(9u32)]);
    let controller = FetchController::builder(producer.clone())
        .max_retries(1)
        .start();
    let mut states = controller.subscribe();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(controller.phase(), FetchPhase::RetryScheduled);
    let pending = controller.state();
    assert!(pending.is_loading);
    assert!(pending.error.is_none());

    let state = controller.settled().await.unwrap();
    assert_eq!(state.data, Some(9));

    // Only the final settle reached the presentation layer after subscribing.
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), state);
}

#[tokio::test(start_paused = true)]
async fn test_attempt_timeout_counts_as_failure() {
    let producer = ScriptedProducer::new([Step::Hang, Step::Ok(5u32)]);
    let controller = FetchController::builder(producer.clone())
        .max_retries(1)
        .attempt_timeout(Duration::from_millis(300))
        .backoff(Backoff::constant(Duration::from_millis(100)))
        .start();

    let state = controller.settled().await.unwrap();
    assert_eq!(state.data, Some(5));
    assert_eq!(producer.call_count(), 2);
    assert_gap(producer.gaps()[0], Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_message_surfaces_when_exhausted() {
    let producer = ScriptedProducer::<u32>::new([Step::Hang]);
    let controller = FetchController::builder(producer)
        .attempt_timeout(Duration::from_millis(250))
        .start();

    let state = controller.settled().await.unwrap();
    assert_eq!(
        state.error.unwrap().message,
        "attempt timed out after 250ms"
    );
}

#[tokio::test(start_paused = true)]
async fn test_producer_panic_is_absorbed() {
    let producer = ScriptedProducer::new([Step::Panic("kaboom"), Step::Ok(1u32)]);
    let controller = FetchController::builder(producer.clone())
        .max_retries(1)
        .start();

    let state = controller.settled().await.unwrap();
    assert_eq!(state.data, Some(1));
    assert_eq!(producer.call_count(), 2);

    let producer = ScriptedProducer::<u32>::new([Step::Panic("kaboom")]);
    let controller = FetchController::builder(producer).start();
    let state = controller.settled().await.unwrap();
    assert_eq!(state.error.unwrap().message, "producer panicked: kaboom");
}

#[tokio::test(start_paused = true)]
async fn test_from_config() {
    let mut config = FetchConfig::default();
    config.retries.max_retries = 2;
    config.retries.base_delay_ms = 200;

    let producer = ScriptedProducer::new([Step::Err("a"), Step::Err("b"), Step::Ok("ok".to_string())]);
    let controller = FetchController::from_config(producer.clone(), &config);

    let state = controller.settled().await.unwrap();
    assert_eq!(state.data.as_deref(), Some("ok"));
    let gaps = producer.gaps();
    assert_gap(gaps[0], Duration::from_millis(200));
    assert_gap(gaps[1], Duration::from_millis(400));
}
