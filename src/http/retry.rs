//! Retry policy
//!
//! Aircall allows 60 requests per minute. Waiting a fixed 90 seconds after a
//! throttled or failed request always clears the window, where exponential
//! backoff would either wake too early or sleep far too long.

use std::time::Duration;

/// Default wait between attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(90);

/// Default total number of attempts (first request included)
pub const DEFAULT_MAX_TRIES: u32 = 2;

/// Fixed-interval retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first request
    pub max_tries: u32,
    /// Constant wait between two attempts
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_tries: u32, interval: Duration) -> Self {
        Self {
            max_tries,
            interval,
        }
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_tries: 1,
            interval: Duration::ZERO,
        }
    }

    /// Whether another attempt is allowed after `attempt` attempts were made
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_tries.max(1)
    }

    /// Wait before the next attempt. Constant regardless of the attempt number.
    pub fn delay(&self, _attempt: u32) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod retry_tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_tries, 2);
        assert_eq!(policy.interval, Duration::from_secs(90));
    }

    #[test]
    fn test_should_retry_bound() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn test_delay_is_constant() {
        let policy = RetryPolicy::new(5, Duration::from_secs(90));
        assert_eq!(policy.delay(1), policy.delay(4));
    }

    #[test]
    fn test_no_retry_and_zero_tries() {
        assert!(!RetryPolicy::no_retry().should_retry(1));
        // A zero budget still allows the first request and nothing more
        assert!(!RetryPolicy::new(0, Duration::ZERO).should_retry(1));
    }
}
