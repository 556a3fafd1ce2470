//! Retry control flow for request attempts
//!
//! Every failed attempt is retried uniformly until the configured number of
//! retries is spent. The delay before each retry is a blocking sleep on the
//! calling thread.

use std::fmt::Display;
use std::time::Duration;

use backoff::backoff::Backoff as _;
use backoff::ExponentialBackoff;

/// Default delay before each retry
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// How the delay evolves between retries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same delay before every retry
    Fixed,
    /// Delay multiplied after every retry, capped at `max_delay`
    Exponential { multiplier: f64, max_delay: Duration },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Number of retries beyond the first attempt
    pub retries: u32,
    /// Delay before each retry
    pub delay: Duration,
    /// Delay progression
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            delay: DEFAULT_RETRY_DELAY,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Create a fixed-delay retry policy
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self {
            retries,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Build a policy from possibly negative config values, clamping both to zero
    pub fn clamped(retries: i64, delay_ms: i64) -> Self {
        let retries = u32::try_from(retries.max(0)).unwrap_or(u32::MAX);
        let delay = Duration::from_millis(delay_ms.max(0) as u64);
        Self::new(retries, delay)
    }

    /// Grow the delay exponentially between retries
    pub fn with_exponential_backoff(mut self, multiplier: f64, max_delay: Duration) -> Self {
        self.backoff = Backoff::Exponential {
            multiplier,
            max_delay,
        };
        self
    }

    /// Total number of attempts allowed by this policy
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

/// Computes the delay before each retry of a single request
#[derive(Debug)]
pub struct RetryHandler {
    policy: RetryPolicy,
    exponential: Option<ExponentialBackoff>,
}

impl RetryHandler {
    /// Create a new retry handler with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        let exponential = match policy.backoff {
            Backoff::Fixed => None,
            Backoff::Exponential {
                multiplier,
                max_delay,
            } => Some(ExponentialBackoff {
                current_interval: policy.delay,
                initial_interval: policy.delay,
                randomization_factor: 0.0,
                multiplier,
                max_interval: max_delay,
                max_elapsed_time: None,
                ..Default::default()
            }),
        };

        Self {
            policy,
            exponential,
        }
    }

    /// Delay to wait before the next retry
    pub fn next_delay(&mut self) -> Duration {
        match self.exponential.as_mut() {
            Some(backoff) => backoff.next_backoff().unwrap_or(backoff.max_interval),
            None => self.policy.delay,
        }
    }
}

/// Result of running an operation under a retry policy
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// Result of the final attempt
    pub result: Result<T, E>,
    /// Total attempts made, including the first
    pub attempts: u32,
}

/// Run `attempt_fn` until it succeeds or the policy's retries are spent.
///
/// The closure receives the 1-based attempt number. Before every attempt
/// after the first, the calling thread sleeps for the policy delay.
pub fn execute_with_retry<F, T, E>(policy: &RetryPolicy, mut attempt_fn: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    E: Display,
{
    let mut handler = RetryHandler::new(policy.clone());
    let mut attempts = 0u32;

    loop {
        if attempts > 0 {
            let delay = handler.next_delay();
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }

        attempts += 1;
        match attempt_fn(attempts) {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    attempts,
                }
            }
            Err(error) if attempts <= policy.retries => {
                log::warn!(
                    "Request failed (attempt {} of {}), retrying: {}",
                    attempts,
                    policy.max_attempts(),
                    error
                );
            }
            Err(error) => {
                if policy.retries > 0 {
                    log::error!(
                        "Request failed after {} attempts, not retrying: {}",
                        attempts,
                        error
                    );
                }
                return RetryOutcome {
                    result: Err(error),
                    attempts,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 0);
        assert_eq!(policy.delay, Duration::from_millis(1000));
        assert_eq!(policy.backoff, Backoff::Fixed);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_clamping_negative_values() {
        let policy = RetryPolicy::clamped(-3, -50);
        assert_eq!(policy.retries, 0);
        assert_eq!(policy.delay, Duration::ZERO);

        let policy = RetryPolicy::clamped(2, 250);
        assert_eq!(policy.retries, 2);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_fixed_delay_is_constant() {
        let mut handler = RetryHandler::new(RetryPolicy::new(3, Duration::from_millis(20)));
        assert_eq!(handler.next_delay(), Duration::from_millis(20));
        assert_eq!(handler.next_delay(), Duration::from_millis(20));
    }

    #[test]
    fn test_exponential_delay_grows_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100))
            .with_exponential_backoff(2.0, Duration::from_millis(300));
        let mut handler = RetryHandler::new(policy);

        assert_eq!(handler.next_delay().as_millis(), 100);
        assert_eq!(handler.next_delay().as_millis(), 200);
        assert_eq!(handler.next_delay().as_millis(), 300);
        assert_eq!(handler.next_delay().as_millis(), 300);
    }

    #[test]
    fn test_retry_stops_on_first_success() {
        let policy = RetryPolicy::new(4, Duration::ZERO);
        let outcome = execute_with_retry(&policy, |attempt| {
            if attempt < 3 {
                Err("boom")
            } else {
                Ok(attempt)
            }
        });

        assert_eq!(outcome.result, Ok(3));
        assert_eq!(outcome.attempts, 3);
    }

    #[test]
    fn test_retry_exhausts_attempts() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let mut calls = 0;
        let outcome: RetryOutcome<(), &str> = execute_with_retry(&policy, |_| {
            calls += 1;
            Err("down")
        });

        assert_eq!(outcome.result, Err("down"));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls, 3);
    }
}
