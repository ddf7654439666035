//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays, retry bounds, addresses, log levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FetchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::FetchConfig;

/// Upper bound on configured retries.
pub const MAX_RETRIES_LIMIT: u32 = 100;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("retries.max_retries must be at most {limit}, got {value}")]
    TooManyRetries { value: u32, limit: u32 },

    #[error("retries.max_delay_ms ({max}) must not be below retries.base_delay_ms ({base})")]
    DelayBoundsInverted { base: u64, max: u64 },

    #[error("debounce.delay_ms must be greater than zero")]
    ZeroDebounceDelay,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &FetchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let retries = &config.retries;
    if retries.max_retries > MAX_RETRIES_LIMIT {
        errors.push(ValidationError::TooManyRetries {
            value: retries.max_retries,
            limit: MAX_RETRIES_LIMIT,
        });
    }
    if retries.max_delay_ms < retries.base_delay_ms {
        errors.push(ValidationError::DelayBoundsInverted {
            base: retries.base_delay_ms,
            max: retries.max_delay_ms,
        });
    }

    if config.debounce.delay_ms == 0 {
        errors.push(ValidationError::ZeroDebounceDelay);
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
