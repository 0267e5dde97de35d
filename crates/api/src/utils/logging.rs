use std::time::Duration;

use adpublish_domain::{LoggingConfig, PublishError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. Output goes to stderr so
/// command results on stdout stay machine-readable.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), String> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = if config.json { builder.json().try_init() } else { builder.try_init() };

    result.map_err(|err| format!("failed to install tracing subscriber: {err}"))
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command` or
/// `campaign_id`.
#[inline]
pub fn log_command_execution(
    command: &str,
    campaign_id: &str,
    elapsed: Duration,
    error: Option<&PublishError>,
) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(command, campaign_id, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            campaign_id,
            duration_ms,
            error_type = err.code(),
            error = %err,
            "command_execution_failure"
        ),
    }
}
