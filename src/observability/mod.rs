//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline produces:
//!     → access_log.rs (one line per terminal outcome)
//!     → metrics.rs (counters, histograms)
//!     → logging.rs (subscriber setup for both of the above)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing
//! - Request ID flows through every access line
//! - Metrics are cheap (no-ops without an exporter)

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::{AccessEntry, Outcome};
