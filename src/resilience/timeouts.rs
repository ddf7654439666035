//! Attempt execution with deadline and panic capture.
//!
//! # Responsibilities
//! - Run one producer future to completion
//! - Enforce the optional per-attempt deadline
//! - Turn a panicking producer into an ordinary failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from producer errors
//! - A timed-out producer future is dropped, which is the only case where
//!   the controller stops a producer call itself

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;

use crate::error::{AttemptError, BoxError};

/// Run a producer future, mapping every way it can fail to [`AttemptError`].
pub async fn run_attempt<T, F>(future: F, deadline: Option<Duration>) -> Result<T, AttemptError>
where
    F: Future<Output = Result<T, BoxError>>,
{
    let guarded = AssertUnwindSafe(future).catch_unwind();

    let outcome = match deadline {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(AttemptError::Timeout(limit)),
        },
        None => guarded.await,
    };

    match outcome {
        Ok(result) => result.map_err(AttemptError::Producer),
        Err(payload) => Err(AttemptError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
