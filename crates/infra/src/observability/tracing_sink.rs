//! [`LogSink`] that forwards publish events to `tracing`.

use adpublish_core::LogSink;
use serde_json::Value;

/// Target shared by every publish event, for `EnvFilter` directives.
pub const PUBLISH_LOG_TARGET: &str = "adpublish::publish";

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingLogSink {
    fn info(&self, category: &str, message: &str, context: &Value) {
        tracing::info!(target: PUBLISH_LOG_TARGET, category, context = %context, "{message}");
    }

    fn warn(&self, category: &str, message: &str, context: &Value) {
        tracing::warn!(target: PUBLISH_LOG_TARGET, category, context = %context, "{message}");
    }

    fn error(&self, category: &str, message: &str, context: &Value) {
        tracing::error!(target: PUBLISH_LOG_TARGET, category, context = %context, "{message}");
    }
}
