//! Exponential backoff with a ceiling.

use std::time::Duration;

/// Delay to wait after the failed attempt `attempt` (zero-based).
///
/// `min(base * 2^attempt, max)`, without jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exponential_base = 2u64.saturating_pow(attempt);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    Duration::from_millis(delay_ms.min(max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        assert_eq!(calculate_backoff(0, 1000, 5000), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(1, 1000, 5000), Duration::from_millis(2000));
        assert_eq!(calculate_backoff(2, 1000, 5000), Duration::from_millis(4000));
        assert_eq!(calculate_backoff(3, 1000, 5000), Duration::from_millis(5000));
    }

    #[test]
    fn test_backoff_saturates() {
        assert_eq!(calculate_backoff(200, 1000, 5000), Duration::from_millis(5000));
        assert_eq!(calculate_backoff(63, u64::MAX, u64::MAX), Duration::from_millis(u64::MAX));
    }
}
