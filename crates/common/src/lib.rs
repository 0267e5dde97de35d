//! Shared utilities for the AdPublish crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: privacy helpers (log payload redaction)
//! - `runtime`: async infrastructure (retry with backoff and jitter)
//! - `observability`: tracing output from runtime modules

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod privacy;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use privacy::{is_sensitive_key, mask_value, sanitize, REDACTED_PLACEHOLDER};
#[cfg(feature = "runtime")]
pub use resilience::{
    RetryContext, RetryDecision, RetryError, RetryExecutor, RetryListener, RetryPolicy,
    RetryPredicate, RetryResult, MAX_RETRIES_EXCEEDED,
};
