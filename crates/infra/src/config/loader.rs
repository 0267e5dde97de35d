//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `ADPUBLISH_DB_PATH` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. JSON and TOML are both accepted, chosen by extension
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `ADPUBLISH_DB_PATH` (required): SQLite database file
//! - `ADPUBLISH_DB_POOL_SIZE`: connection pool size
//! - `ADPUBLISH_PLATFORM_BASE_URL`: ad platform host
//! - `ADPUBLISH_PLATFORM_API_VERSION`: ad platform API version segment
//! - `ADPUBLISH_ACCOUNT_PREFIX`: ad account id prefix
//! - `ADPUBLISH_RETRY_MAX_ATTEMPTS`, `ADPUBLISH_RETRY_BASE_DELAY_MS`,
//!   `ADPUBLISH_RETRY_MAX_DELAY_MS`: internal API retry budget
//! - `ADPUBLISH_INTERNAL_API_URL`: internal API root
//! - `ADPUBLISH_LOG_LEVEL`: default log filter
//! - `ADPUBLISH_LOG_JSON`: JSON log output (true/false)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use adpublish_domain::{AppConfig, PublishError, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["adpublish.toml", "adpublish.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// The environment is used whenever `ADPUBLISH_DB_PATH` is set; config files
/// are only probed without it.
///
/// # Errors
/// Returns `PublishError::Configuration` if the chosen source does not yield
/// a valid configuration.
pub fn load() -> Result<AppConfig> {
    if env_opt("ADPUBLISH_DB_PATH").is_none() {
        tracing::debug!("ADPUBLISH_DB_PATH not set, trying config files");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `ADPUBLISH_DB_PATH` is required; everything else falls back to the
/// defaults in [`AppConfig`].
///
/// # Errors
/// Returns `PublishError::Configuration` if the database path is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::with_database_path(env_var("ADPUBLISH_DB_PATH")?);

    if let Some(pool_size) = env_parse("ADPUBLISH_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    if let Some(base_url) = env_opt("ADPUBLISH_PLATFORM_BASE_URL") {
        config.platform.base_url = base_url;
    }
    if let Some(api_version) = env_opt("ADPUBLISH_PLATFORM_API_VERSION") {
        config.platform.api_version = api_version;
    }
    if let Some(prefix) = env_opt("ADPUBLISH_ACCOUNT_PREFIX") {
        config.platform.account_prefix = prefix;
    }
    if let Some(attempts) = env_parse("ADPUBLISH_RETRY_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = env_parse("ADPUBLISH_RETRY_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(delay) = env_parse("ADPUBLISH_RETRY_MAX_DELAY_MS")? {
        config.retry.max_delay_ms = delay;
    }
    config.internal_api.base_url = env_opt("ADPUBLISH_INTERNAL_API_URL");
    if let Some(level) = env_opt("ADPUBLISH_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("ADPUBLISH_LOG_JSON", false);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `PublishError::Configuration` if the file is missing, cannot be
/// parsed, or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PublishError::Configuration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PublishError::Configuration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PublishError::Configuration(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PublishError::Configuration(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PublishError::Configuration(format!("Invalid JSON format: {e}"))),
        _ => Err(PublishError::Configuration(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Checks the working directory and its two parents, then the directory of
/// the executable, trying `adpublish.{toml,json}` before `config.{toml,json}`
/// in each. Returns the first file that exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PublishError::Configuration(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| PublishError::Configuration(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 11] = [
        "ADPUBLISH_DB_PATH",
        "ADPUBLISH_DB_POOL_SIZE",
        "ADPUBLISH_PLATFORM_BASE_URL",
        "ADPUBLISH_PLATFORM_API_VERSION",
        "ADPUBLISH_ACCOUNT_PREFIX",
        "ADPUBLISH_RETRY_MAX_ATTEMPTS",
        "ADPUBLISH_RETRY_BASE_DELAY_MS",
        "ADPUBLISH_RETRY_MAX_DELAY_MS",
        "ADPUBLISH_INTERNAL_API_URL",
        "ADPUBLISH_LOG_LEVEL",
        "ADPUBLISH_LOG_JSON",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn write_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("ADPUBLISH_TEST_BOOL_YES", "yes");
        std::env::set_var("ADPUBLISH_TEST_BOOL_UPPER", "TRUE");
        std::env::set_var("ADPUBLISH_TEST_BOOL_OFF", "off");

        assert!(env_bool("ADPUBLISH_TEST_BOOL_YES", false));
        assert!(env_bool("ADPUBLISH_TEST_BOOL_UPPER", false));
        assert!(!env_bool("ADPUBLISH_TEST_BOOL_OFF", true));

        std::env::remove_var("ADPUBLISH_TEST_BOOL_MISSING");
        assert!(env_bool("ADPUBLISH_TEST_BOOL_MISSING", true));

        std::env::remove_var("ADPUBLISH_TEST_BOOL_YES");
        std::env::remove_var("ADPUBLISH_TEST_BOOL_UPPER");
        std::env::remove_var("ADPUBLISH_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_with_overrides() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ADPUBLISH_DB_PATH", "/tmp/adpublish.db");
        std::env::set_var("ADPUBLISH_DB_POOL_SIZE", "8");
        std::env::set_var("ADPUBLISH_PLATFORM_API_VERSION", "v20.0");
        std::env::set_var("ADPUBLISH_RETRY_MAX_ATTEMPTS", "5");
        std::env::set_var("ADPUBLISH_INTERNAL_API_URL", "http://localhost:8080/api");
        std::env::set_var("ADPUBLISH_LOG_JSON", "true");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.database.path, "/tmp/adpublish.db");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.platform.api_version, "v20.0");
        assert_eq!(config.platform.account_prefix, "act_");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1_000);
        assert_eq!(config.internal_api.base_url.as_deref(), Some("http://localhost:8080/api"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_missing_db_path() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, PublishError::Configuration(_)));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ADPUBLISH_DB_PATH", "/tmp/adpublish.db");
        std::env::set_var("ADPUBLISH_DB_POOL_SIZE", "not-a-number");

        let result = load_from_env();
        clear_env();

        match result {
            Err(PublishError::Configuration(msg)) => assert!(msg.contains("ADPUBLISH_DB_POOL_SIZE")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_reports_env_error_instead_of_probing_files() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ADPUBLISH_DB_PATH", "/tmp/adpublish.db");
        std::env::set_var("ADPUBLISH_DB_POOL_SIZE", "abc");

        let result = load();
        clear_env();

        match result {
            Err(PublishError::Configuration(msg)) => {
                assert!(msg.contains("ADPUBLISH_DB_POOL_SIZE"));
                assert!(!msg.contains("No config file found"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_env_rejects_invalid_retry_budget() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ADPUBLISH_DB_PATH", "/tmp/adpublish.db");
        std::env::set_var("ADPUBLISH_RETRY_MAX_ATTEMPTS", "0");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(PublishError::Configuration(_))));
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_config(
            r#"
[database]
path = "publish.db"
pool_size = 6

[platform]
api_version = "v21.0"

[retry]
max_attempts = 4
base_delay_ms = 200
max_delay_ms = 2000

[logging]
level = "debug"
json = true
"#,
            "toml",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from TOML");
        assert_eq!(config.database.path, "publish.db");
        assert_eq!(config.database.pool_size, 6);
        assert_eq!(config.platform.api_version, "v21.0");
        assert_eq!(config.platform.base_url, "https://graph.facebook.com");
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_file_json_uses_defaults() {
        let path = write_config(r#"{ "database": { "path": "publish.db" } }"#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from JSON");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.retry.max_delay_ms, 10_000);
        assert!(config.internal_api.base_url.is_none());
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/adpublish.toml")));
        assert!(matches!(result, Err(PublishError::Configuration(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = write_config(r#"{ "database": "#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(PublishError::Configuration(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("adpublish.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
