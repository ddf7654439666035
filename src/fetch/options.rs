//! Controller options.

use std::time::Duration;

use crate::config::FetchConfig;
use crate::resilience::Backoff;

/// Retry behaviour for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    /// Retries allowed after the first failed attempt.
    pub max_retries: u32,
    /// Delay policy between failed attempts.
    pub backoff: Backoff,
    /// Deadline for a single producer invocation.
    pub attempt_timeout: Option<Duration>,
}

impl From<&FetchConfig> for FetchOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.retries.max_retries,
            backoff: config.retries.backoff(),
            attempt_timeout: config.timeouts.attempt_timeout(),
        }
    }
}
