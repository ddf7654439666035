//! Observable fetch state.

use serde::Serialize;

use crate::error::ErrorInfo;

/// What the presentation layer reads.
///
/// Once settled exactly one of `data` and `error` is present. Both are
/// absent while the first attempt is loading; a refetch keeps the previous
/// `data` visible until it settles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ErrorInfo>,
}

impl<T> FetchState<T> {
    /// State of a controller whose first attempt has not settled.
    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }

    pub fn is_success(&self) -> bool {
        !self.is_loading && self.data.is_some() && self.error.is_none()
    }

    pub fn is_failure(&self) -> bool {
        !self.is_loading && self.error.is_some()
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::loading()
    }
}

/// Position in the controller state machine.
///
/// ```text
/// Idle → Loading → Succeeded
///                → RetryScheduled → Loading
///                → Failed
/// any → Disposed (absorbing)
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPhase {
    Idle = 0,
    Loading = 1,
    RetryScheduled = 2,
    Succeeded = 3,
    Failed = 4,
    Disposed = 5,
}

impl FetchPhase {
    /// True for phases that wait on a producer or a retry timer.
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchPhase::Loading | FetchPhase::RetryScheduled)
    }
}

/// Identifies one `refetch` invocation and the attempts that belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(pub u64);

impl Generation {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
