//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Timers (timer.rs):
//!     schedule(delay, callback) → TimerHandle
//!     cancel / drop handle → callback never runs
//!
//! Teardown (teardown.rs):
//!     Owner triggers → every TeardownSignal resolves → controllers dispose
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary triggers teardown
//! ```
//!
//! # Design Decisions
//! - Registrations are owned handles, released on drop
//! - Teardown is sticky: late listeners still observe it

pub mod signals;
pub mod teardown;
pub mod timer;

pub use teardown::{Teardown, TeardownSignal};
pub use timer::TimerHandle;
