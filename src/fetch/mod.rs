//! Resilient fetch subsystem.
//!
//! # Data Flow
//! ```text
//! start() / refetch()
//!     → new Generation, retry counter reset, is_loading = true
//!     → producer.rs (one invocation)
//!     → resilience::timeouts (deadline + panic capture)
//!     → success: state.rs published { data, is_loading: false }
//!     → failure: resilience::retries → resilience::backoff
//!         → lifecycle::timer schedules the next attempt
//!         → or, once exhausted: state.rs published { error, is_loading: false }
//!
//! dispose() / drop / teardown signal
//!     → liveness off, pending retry cancelled, later results discarded
//! ```
//!
//! # Design Decisions
//! - Presentation reads state through a watch channel, never mutates it
//! - A result is applied only if the controller is live and its
//!   generation is still the current one

pub mod controller;
pub mod options;
pub mod producer;
pub mod state;

pub use controller::{FetchController, FetchControllerBuilder};
pub use options::FetchOptions;
pub use producer::Producer;
pub use state::{FetchPhase, FetchState, Generation};
