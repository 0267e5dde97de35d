//! Privacy helpers for structured log payloads
//!
//! Credentials routinely end up in log contexts (request payloads, connection
//! records). Everything emitted through the publish logger is passed through
//! [`sanitize`] first.

pub mod redaction;

pub use redaction::{
    is_sensitive_key, mask_value, sanitize, REDACTED_PLACEHOLDER, SENSITIVE_KEY_FRAGMENTS,
};
