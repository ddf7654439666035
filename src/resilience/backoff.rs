//! Retry delay calculation.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the delay grows with the retry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay before every retry.
    Constant,
    /// `base * retry` (1x, 2x, 3x, ...).
    #[default]
    Linear,
    /// `base * 2^(retry - 1)` (1x, 2x, 4x, ...).
    Exponential,
}

/// Delay policy applied between failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub strategy: BackoffStrategy,
    pub base: Duration,
    pub max: Duration,
    pub jitter: bool,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::linear(Duration::from_millis(1000))
    }
}

impl Backoff {
    /// Linear backoff with no practical cap and no jitter.
    pub fn linear(base: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Linear,
            base,
            max: Duration::MAX,
            jitter: false,
        }
    }

    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            base,
            max,
            jitter: false,
        }
    }

    pub fn constant(delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Constant,
            base: delay,
            max: Duration::MAX,
            jitter: false,
        }
    }

    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let base_ms = u64::try_from(self.base.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        calculate_backoff(self.strategy, retry, base_ms, max_ms, self.jitter)
    }
}

/// Calculate the delay for `attempt` with optional jitter.
pub fn calculate_backoff(
    strategy: BackoffStrategy,
    attempt: u32,
    base_ms: u64,
    max_ms: u64,
    jitter: bool,
) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = match strategy {
        BackoffStrategy::Constant => base_ms,
        BackoffStrategy::Linear => base_ms.saturating_mul(u64::from(attempt)),
        BackoffStrategy::Exponential => {
            base_ms.saturating_mul(2u64.saturating_pow(attempt - 1))
        }
    };
    let capped_delay = delay_ms.min(max_ms);

    if !jitter {
        return Duration::from_millis(capped_delay);
    }

    // 0 to 10% of the delay
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}
