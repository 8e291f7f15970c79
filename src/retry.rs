//! Bounded retry of source queries
//!
//! Only transient timeouts ([`Error::QueryTimedOut`]) are retried. A budget of
//! `retries` allows `retries + 1` attempts in total; when every attempt times
//! out the query fails with [`Error::SourceUnreachable`]. Any other error is
//! returned after the first attempt.

use crate::error::{Error, Result};
use crate::types::{BackoffType, FetchTarget};
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 3;

/// Retry budget and backoff for source queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub retries: u32,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Maximum delay between retries
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            backoff_type: BackoffType::Exponential,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Policy with the given retry budget and no delay between attempts
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }

    /// Create a new policy builder
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Total attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Calculate backoff delay before retry number `attempt` (0-based)
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }

    /// Run `query` until it succeeds, fails fatally, or the budget runs out.
    pub fn run<T, F>(&self, target: FetchTarget, mut query: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        while attempt < max_attempts {
            match query() {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("{} succeeded after {} attempts", target, attempt + 1);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() => {
                    attempt += 1;
                    if attempt < max_attempts {
                        let delay = self.calculate_backoff(attempt - 1);
                        warn!(
                            "Query for {} timed out, attempt {}/{}, retrying in {:?}",
                            target, attempt, max_attempts, delay
                        );
                        if !delay.is_zero() {
                            std::thread::sleep(delay);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        warn!("Query for {} timed out {} times, giving up", target, attempt);
        Err(Error::SourceUnreachable {
            target,
            attempts: attempt,
        })
    }
}

/// Builder for [`RetryPolicy`]
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Set the retry budget
    pub fn retries(mut self, retries: u32) -> Self {
        self.policy.retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.policy.backoff_type = backoff_type;
        self.policy.initial_backoff = initial;
        self.policy.max_backoff = max;
        self
    }

    /// Build the policy
    pub fn build(self) -> RetryPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.initial_backoff, Duration::ZERO);
        assert_eq!(policy.calculate_backoff(5), Duration::ZERO);
    }

    #[test]
    fn test_builder() {
        let policy = RetryPolicy::builder()
            .retries(5)
            .backoff(
                BackoffType::Linear,
                Duration::from_millis(200),
                Duration::from_secs(30),
            )
            .build();

        assert_eq!(policy.retries, 5);
        assert_eq!(policy.backoff_type, BackoffType::Linear);
        assert_eq!(policy.initial_backoff, Duration::from_millis(200));
        assert_eq!(policy.max_backoff, Duration::from_secs(30));
    }

    #[test]
    fn test_calculate_backoff() {
        let base = Duration::from_millis(100);
        let max = Duration::from_millis(500);

        let constant = RetryPolicy::builder()
            .backoff(BackoffType::Constant, base, max)
            .build();
        assert_eq!(constant.calculate_backoff(0), base);
        assert_eq!(constant.calculate_backoff(4), base);

        let linear = RetryPolicy::builder()
            .backoff(BackoffType::Linear, base, max)
            .build();
        assert_eq!(linear.calculate_backoff(0), Duration::from_millis(100));
        assert_eq!(linear.calculate_backoff(2), Duration::from_millis(300));
        assert_eq!(linear.calculate_backoff(9), max);

        let exponential = RetryPolicy::builder()
            .backoff(BackoffType::Exponential, base, max)
            .build();
        assert_eq!(exponential.calculate_backoff(0), Duration::from_millis(100));
        assert_eq!(exponential.calculate_backoff(2), Duration::from_millis(400));
        assert_eq!(exponential.calculate_backoff(3), max);
    }

    #[test]
    fn test_run_succeeds_after_timeouts() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::with_retries(3);

        let result = policy.run(FetchTarget::Page(0), || {
            calls.set(calls.get() + 1);
            if calls.get() <= 3 {
                Err(Error::timed_out(FetchTarget::Page(0)))
            } else {
                Ok("page")
            }
        });

        assert_eq!(result.unwrap(), "page");
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_run_exhausts_budget() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::with_retries(3);

        let result: Result<()> = policy.run(FetchTarget::Page(1), || {
            calls.set(calls.get() + 1);
            Err(Error::timed_out(FetchTarget::Page(1)))
        });

        assert!(matches!(
            result,
            Err(Error::SourceUnreachable {
                target: FetchTarget::Page(1),
                attempts: 4
            })
        ));
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_run_zero_retries_is_single_attempt() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::with_retries(0);

        let result: Result<()> = policy.run(FetchTarget::Totals, || {
            calls.set(calls.get() + 1);
            Err(Error::timed_out(FetchTarget::Totals))
        });

        assert!(matches!(
            result,
            Err(Error::SourceUnreachable { attempts: 1, .. })
        ));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_run_does_not_retry_fatal_errors() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::with_retries(3);

        let result: Result<()> = policy.run(FetchTarget::Page(0), || {
            calls.set(calls.get() + 1);
            Err(Error::http_status(500, "boom"))
        });

        assert!(matches!(result, Err(Error::HttpStatus { status: 500, .. })));
        assert_eq!(calls.get(), 1);
    }
}
