//! Application configuration structures

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACCOUNT_PREFIX, DEFAULT_API_VERSION, DEFAULT_PLATFORM_BASE_URL,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_JITTER_RATIO, DEFAULT_RETRY_MAX_ATTEMPTS,
    DEFAULT_RETRY_MAX_DELAY_MS,
};
use crate::{PublishError, Result};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub internal_api: InternalApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Configuration with defaults for everything but the database path.
    pub fn with_database_path(path: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig { path: path.into(), pool_size: default_pool_size() },
            platform: PlatformConfig::default(),
            retry: RetrySettings::default(),
            internal_api: InternalApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns [`PublishError::Configuration`] describing the first invalid
    /// field.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(PublishError::Configuration("database.path must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(PublishError::Configuration("database.pool_size must be at least 1".into()));
        }
        if self.platform.api_version.trim().is_empty() {
            return Err(PublishError::Configuration("platform.api_version must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(PublishError::Configuration("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(PublishError::Configuration(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_ratio) {
            return Err(PublishError::Configuration(
                "retry.jitter_ratio must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    4
}

/// External ad platform endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub base_url: String,
    pub api_version: String,
    /// Prefix the platform expects on ad account ids.
    pub account_prefix: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PLATFORM_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
        }
    }
}

/// Backoff settings for internal API calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ratio: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
            jitter_ratio: DEFAULT_RETRY_JITTER_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalApiConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
