//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Producer invocation:
//!     → timeouts.rs (deadline + panic capture)
//!     → On failure: retries.rs (retry budget left?)
//!     → backoff.rs (how long to wait before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Every failure is retried the same way; no transient/permanent split
//! - Linear backoff by default, exponential and constant available
//! - Counters are plain values owned by the controller, guarded by its lock

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::{Backoff, BackoffStrategy};
pub use retries::RetryCounter;
