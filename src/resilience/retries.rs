//! Retry policy.
//!
//! # Design Decisions
//! - Transport failures (timeout, connect, DNS) are always retryable
//! - Only 5xx responses are retryable; 2xx-4xx are application answers
//! - Attempts are sequential; total attempts = max_retries + 1

use axum::http::StatusCode;
use std::time::Duration;

use crate::config::{RetryConfig, TimeoutConfig};
use crate::resilience::backoff::calculate_backoff;

/// Per-call retry and timeout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Hard limit for a single attempt.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy for read-only calls.
    pub fn for_reads(retries: &RetryConfig, timeouts: &TimeoutConfig) -> Self {
        Self::build(retries.max_retries, retries, timeouts)
    }

    /// Policy for calls that change backend state.
    pub fn for_writes(retries: &RetryConfig, timeouts: &TimeoutConfig) -> Self {
        Self::build(retries.mutating_max_retries, retries, timeouts)
    }

    fn build(max_retries: u32, retries: &RetryConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            timeout: Duration::from_millis(timeouts.backend_ms),
            max_retries,
            base_delay: Duration::from_millis(retries.base_delay_ms),
            max_delay: Duration::from_millis(retries.max_delay_ms),
        }
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the attempt that follows `attempt` (zero-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.base_delay.as_millis() as u64,
            self.max_delay.as_millis() as u64,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_reads(&RetryConfig::default(), &TimeoutConfig::default())
    }
}

/// Whether a backend outcome should be retried.
///
/// `status` is `None` when the attempt failed at the transport level.
pub fn is_retryable(status: Option<StatusCode>) -> bool {
    match status {
        None => true,
        Some(s) => s.is_server_error(),
    }
}
