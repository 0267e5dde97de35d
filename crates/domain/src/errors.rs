//! Error types used throughout the publish pipeline

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for publish orchestration
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum PublishError {
    /// Publish config is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No usable platform connection for the campaign.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("External API error: {0}")]
    ExternalApi(PlatformError),

    /// Pause/resume requested before a complete publish.
    #[error("Campaign not published: {0}")]
    NotPublished(String),

    #[error("Retry budget exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PublishError {
    /// Stable label suitable for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Connection(_) => "connection_error",
            Self::ExternalApi(_) => "external_api_error",
            Self::NotPublished(_) => "not_published",
            Self::RetryExhausted { .. } => "max_retries_exceeded",
            Self::Database(_) => "database_error",
            Self::Network(_) => "network_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Platform diagnostics, when the failure came from the ad platform.
    pub fn platform(&self) -> Option<&PlatformError> {
        match self {
            Self::ExternalApi(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PlatformError> for PublishError {
    fn from(value: PlatformError) -> Self {
        Self::ExternalApi(value)
    }
}

/// Error reported by the external ad platform.
///
/// Every diagnostic field the platform may attach is explicit and optional so
/// callers never have to probe an untyped payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlatformError {
    /// HTTP status, absent when the response was 2xx but unusable.
    pub status: Option<u16>,
    pub message: String,
    pub code: Option<i64>,
    pub subcode: Option<i64>,
    pub error_type: Option<String>,
    pub trace_id: Option<String>,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// A 2xx response whose body could not be used.
    pub fn malformed(detail: impl fmt::Display) -> Self {
        Self::new(format!("Malformed response from ad platform: {detail}"))
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(code) = self.code {
            write!(f, " (code {code}")?;
            if let Some(subcode) = self.subcode {
                write!(f, ", subcode {subcode}")?;
            }
            f.write_str(")")?;
        }
        if let Some(trace_id) = &self.trace_id {
            write!(f, " [trace {trace_id}]")?;
        }
        Ok(())
    }
}

/// Result type alias for publish operations
pub type Result<T> = std::result::Result<T, PublishError>;
