//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend (upstream::client):
//!     → timeouts.rs (hard deadline per attempt, and per routed request)
//!     → retries.rs (retryable? attempts left?)
//!     → backoff.rs (min(base * 2^attempt, cap) before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No jitter, no circuit breaker, no rate limiting: single-flight per call
//! - Writes default to zero retries (see RetryConfig::mutating_max_retries)

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{is_retryable, RetryPolicy};
pub use timeouts::request_deadline;
