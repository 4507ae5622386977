//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the backend client produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and histograms via `metrics`)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! The request ID set by the HTTP layer is attached to every request span.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
