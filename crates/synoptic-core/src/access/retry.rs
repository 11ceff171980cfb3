// Retry budget and exponential backoff schedule for producer calls.

use std::time::Duration;

use crate::config::DataAccessConfig;

/// How many times a producer is tried and how long to wait between tries.
///
/// After failed attempt `n` (1-based) the wait is `base_delay * 2^n`, so the
/// default policy waits 200 ms after the first failure and 400 ms after the
/// second. No wait follows the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &DataAccessConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
        )
    }

    /// Wait after failed attempt `attempt` before the next one.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another attempt follows failed attempt `attempt`.
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// The full wait schedule between attempts, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|n| self.backoff(n)).collect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_from_two_hundred() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(
            policy.schedule(),
            vec![Duration::from_millis(200), Duration::from_millis(400)]
        );
    }

    #[test]
    fn last_attempt_has_no_successor() {
        let policy = RetryPolicy::default();
        assert!(policy.has_next(1));
        assert!(policy.has_next(2));
        assert!(!policy.has_next(3));
    }

    #[test]
    fn single_attempt_policy_never_waits() {
        let policy = RetryPolicy::new(1, Duration::from_millis(100));
        assert!(policy.schedule().is_empty());
        assert!(!policy.has_next(1));
    }

    #[test]
    fn zero_attempts_is_raised_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(64), Duration::from_millis(100).saturating_mul(u32::MAX));
    }

    #[test]
    fn built_from_config() {
        let policy = RetryPolicy::from_config(&DataAccessConfig {
            max_attempts: 5,
            backoff_base_ms: 50,
        });
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }
}
