//! Exponential-backoff retry executor with symmetric jitter
//!
//! The executor re-invokes an operation in full on every attempt, so callers
//! must only wrap operations that are safe to repeat. Each outcome (success
//! or failure) is handed to a [`RetryPredicate`]; a retryable outcome on the
//! final attempt ends the sequence with [`RetryError::Exhausted`], which
//! carries the last observed result instead of discarding it.
//!
//! Backoff for the retry after 0-based attempt `n`:
//! `delay = min(base_delay * 2^n, max_delay)`, and the actual wait is
//! `delay ± jitter_ratio * delay`, drawn uniformly so that concurrent callers
//! do not retry in lockstep.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

/// Error code reported when the retry budget is spent.
pub const MAX_RETRIES_EXCEEDED: &str = "max_retries_exceeded";

/// Terminal failure of a retried operation
#[derive(Debug, Error)]
pub enum RetryError<T, E> {
    /// The operation failed with an outcome the predicate declined to retry
    #[error("operation failed: {0}")]
    Operation(E),

    /// Every attempt produced a retryable outcome
    #[error("max retries exceeded after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        /// Final observed outcome, which may be a successful-but-retryable value
        /// such as an HTTP 503 response.
        last: Result<T, E>,
    },

    /// The policy itself is unusable
    #[error("invalid retry policy: {0}")]
    InvalidPolicy(String),
}

impl<T, E> RetryError<T, E> {
    /// Stable error code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Operation(_) => "operation_failed",
            Self::Exhausted { .. } => MAX_RETRIES_EXCEEDED,
            Self::InvalidPolicy(_) => "invalid_retry_policy",
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Result type for retried operations
pub type RetryResult<T, E> = Result<T, RetryError<T, E>>;

/// Attempt budget and backoff shape
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first call
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of the computed delay used as the ± jitter window
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            jitter_ratio: 0.25,
        }
    }
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.base_delay > self.max_delay {
            return Err("base_delay must not exceed max_delay".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter_ratio) {
            return Err("jitter_ratio must be within [0, 1]".to_string());
        }
        Ok(())
    }

    /// Un-jittered delay before the retry that follows 0-based `attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Draw a signed jitter offset in milliseconds for `delay`.
    fn jitter_ms(&self, delay: Duration) -> i64 {
        let span = (delay.as_millis() as f64 * self.jitter_ratio).floor() as i64;
        if span <= 0 {
            return 0;
        }
        rand::thread_rng().gen_range(-span..=span)
    }
}

/// Builder for [`RetryPolicy`] with fluent API
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.policy.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    pub fn jitter_ratio(mut self, ratio: f64) -> Self {
        self.policy.jitter_ratio = ratio;
        self
    }

    pub fn no_jitter(self) -> Self {
        self.jitter_ratio(0.0)
    }

    pub fn build(self) -> Result<RetryPolicy, String> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}

/// Ephemeral state describing one scheduled retry. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// 1-based number of the attempt that just failed
    pub attempt: u32,
    /// Backoff delay before jitter
    pub delay: Duration,
    /// Signed jitter offset applied to `delay`
    pub jitter_ms: i64,
}

impl RetryContext {
    /// Actual wait before the next attempt.
    pub fn wait(&self) -> Duration {
        let base = i64::try_from(self.delay.as_millis()).unwrap_or(i64::MAX);
        let total = base.saturating_add(self.jitter_ms).max(0);
        Duration::from_millis(total.unsigned_abs())
    }
}

/// Whether an outcome warrants another attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { reason: String },
    Stop,
}

impl RetryDecision {
    pub fn retry(reason: impl Into<String>) -> Self {
        Self::Retry { reason: reason.into() }
    }
}

/// Classifies an attempt's outcome.
pub trait RetryPredicate<T, E> {
    fn decide(&self, outcome: &Result<T, E>) -> RetryDecision;
}

/// Callback invoked before each backoff sleep.
pub type RetryListener = Arc<dyn Fn(&RetryContext, &str) + Send + Sync>;

/// Runs an operation under a [`RetryPolicy`]
pub struct RetryExecutor<P> {
    policy: RetryPolicy,
    predicate: P,
    listener: Option<RetryListener>,
}

impl<P> RetryExecutor<P> {
    pub fn new(policy: RetryPolicy, predicate: P) -> Self {
        Self { policy, predicate, listener: None }
    }

    /// Observe every scheduled retry (attempt number, delay, reason).
    #[must_use]
    pub fn with_listener(mut self, listener: RetryListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `operation` until it produces a non-retryable outcome or the
    /// attempt budget is spent.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPredicate<T, E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Err(message) = self.policy.validate() {
            return Err(RetryError::InvalidPolicy(message));
        }

        let max_attempts = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            debug!(attempt, max_attempts, "executing operation");
            let outcome = operation().await;

            let reason = match self.predicate.decide(&outcome) {
                RetryDecision::Stop => {
                    if attempt > 1 {
                        debug!(attempt, "operation settled after retries");
                    }
                    return outcome.map_err(RetryError::Operation);
                }
                RetryDecision::Retry { reason } => reason,
            };

            if attempt >= max_attempts {
                warn!(attempts = attempt, %reason, code = MAX_RETRIES_EXCEEDED, "retry attempts exhausted");
                return Err(RetryError::Exhausted { attempts: attempt, last: outcome });
            }

            let delay = self.policy.backoff_delay(attempt - 1);
            let context =
                RetryContext { attempt, delay, jitter_ms: self.policy.jitter_ms(delay) };
            let wait = context.wait();

            warn!(attempt, delay_ms = wait.as_millis() as u64, %reason, "operation failed, retrying");
            if let Some(listener) = &self.listener {
                listener(&context, &reason);
            }

            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

impl<P> fmt::Debug for RetryExecutor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

/// Pre-defined predicates
pub mod policies {
    use std::fmt::Display;

    use super::{RetryDecision, RetryPredicate};

    /// Retries every `Err`, accepts every `Ok`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RetryOnError;

    impl<T, E: Display> RetryPredicate<T, E> for RetryOnError {
        fn decide(&self, outcome: &Result<T, E>) -> RetryDecision {
            match outcome {
                Ok(_) => RetryDecision::Stop,
                Err(err) => RetryDecision::retry(err.to_string()),
            }
        }
    }

    #[derive(Debug, Clone, Copy, Default)]
    pub struct NeverRetry;

    impl<T, E> RetryPredicate<T, E> for NeverRetry {
        fn decide(&self, _outcome: &Result<T, E>) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry over the whole outcome
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, T, E> RetryPredicate<T, E> for PredicateRetry<F>
    where
        F: Fn(&Result<T, E>) -> bool,
    {
        fn decide(&self, outcome: &Result<T, E>) -> RetryDecision {
            if (self.predicate)(outcome) {
                RetryDecision::retry("retryable outcome")
            } else {
                RetryDecision::Stop
            }
        }
    }
}
