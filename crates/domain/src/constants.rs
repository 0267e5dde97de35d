//! Domain constants
//!
//! Centralized location for platform defaults and publish pipeline values.

// Ad platform
pub const DEFAULT_PLATFORM_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v19.0";
pub const DEFAULT_ACCOUNT_PREFIX: &str = "act_";

// Remote objects are created paused so nothing spends before activation
pub const CREATE_STATUS: &str = "PAUSED";

// Ad set budget field: config name → platform name (minor units)
pub const DAILY_BUDGET_CONFIG_KEY: &str = "dailyBudget";
pub const DAILY_BUDGET_PLATFORM_KEY: &str = "daily_budget";
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

// Retry defaults (internal API calls)
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 10_000;
pub const DEFAULT_RETRY_JITTER_RATIO: f64 = 0.25;

// Log categories
pub const LOG_CATEGORY_PUBLISH: &str = "publish";
