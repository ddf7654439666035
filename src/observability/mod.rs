//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controllers and debouncers produce:
//!     → tracing events (controller id, generation, retry, delay)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Controller id flows through every event it emits
//! - Metrics are cheap when no recorder is installed

pub mod logging;
pub mod metrics;
