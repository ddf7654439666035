//! Resilient fetch controller library.
//!
//! Runs one asynchronous retrieval with bounded automatic retries, exposes
//! `{ data, is_loading, error }` to a presentation layer, and never applies
//! a result after its owner has disposed it or superseded it with a newer
//! `refetch`.

pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::FetchConfig;
pub use debounce::Debouncer;
pub use error::{BoxError, ErrorInfo, FetchError, FetchResult};
pub use fetch::{FetchController, FetchControllerBuilder, FetchOptions, FetchPhase, FetchState, Generation, Producer};
pub use lifecycle::{Teardown, TeardownSignal};
pub use resilience::{Backoff, BackoffStrategy};
