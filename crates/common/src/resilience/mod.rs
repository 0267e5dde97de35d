//! Resilience patterns for transient failures
//!
//! Currently a single primitive: [`RetryExecutor`], an exponential-backoff
//! retry loop with symmetric jitter. Outcome classification is delegated to a
//! [`RetryPredicate`], so the same executor serves both error-only retries and
//! "successful but retryable" results such as HTTP 5xx responses.

pub mod retry;

pub use retry::{
    policies, RetryContext, RetryDecision, RetryError, RetryExecutor, RetryListener,
    RetryPolicy, RetryPolicyBuilder, RetryPredicate, RetryResult, MAX_RETRIES_EXCEEDED,
};
