//! Error types for the fetch controller.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Boxed error accepted from producers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for controller operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors returned by the controller API itself.
///
/// Producer failures never show up here; they are absorbed and surfaced
/// through [`FetchState::error`](crate::FetchState) instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The controller was disposed; the call had no effect.
    #[error("controller has been disposed")]
    Disposed,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Why a single attempt failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The producer returned an error.
    #[error("{0}")]
    Producer(BoxError),

    /// The producer did not resolve before the attempt deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The producer panicked while running.
    #[error("producer panicked: {0}")]
    Panicked(String),
}

/// Normalized failure information exposed to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct ErrorInfo {
    /// Human readable failure message.
    pub message: String,
    /// Message of the underlying cause, if the failure carried one.
    pub cause: Option<String>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl From<&AttemptError> for ErrorInfo {
    fn from(err: &AttemptError) -> Self {
        let info = ErrorInfo::new(err.to_string());
        match err {
            AttemptError::Producer(inner) => match inner.source() {
                Some(source) => info.with_cause(source.to_string()),
                None => info,
            },
            _ => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("request failed")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_producer_error_keeps_message() {
        let err = AttemptError::Producer("boom".into());
        let info = ErrorInfo::from(&err);
        assert_eq!(info.message, "boom");
        assert_eq!(info.cause, None);
    }

    #[test]
    fn test_producer_error_records_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = AttemptError::Producer(Box::new(Outer(io)));
        let info = ErrorInfo::from(&err);
        assert_eq!(info.message, "request failed");
        assert_eq!(info.cause.as_deref(), Some("reset by peer"));
    }

    #[test]
    fn test_timeout_message() {
        let info = ErrorInfo::from(&AttemptError::Timeout(Duration::from_millis(250)));
        assert_eq!(info.message, "attempt timed out after 250ms");
    }
}
