//! Correlation-tracked structured logger for one publish attempt
//!
//! A [`PublishLogger`] is created by the caller of each orchestrator
//! operation and passed down explicitly. Every event carries the correlation
//! id, the campaign id and the elapsed time since the logger was created, and
//! its context is sanitized before it reaches the [`LogSink`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use adpublish_common::privacy;
use adpublish_common::resilience::{RetryContext, RetryListener};
use adpublish_domain::constants::LOG_CATEGORY_PUBLISH;
use adpublish_domain::PublishError;
use serde_json::{json, Value};
use uuid::Uuid;

use super::ports::LogSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

/// Event kinds emitted by the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StageStart,
    StageComplete,
    ApiCall,
    ApiResponse,
    Retry,
    ValidationFailure,
    Warning,
    Error,
    Critical,
    Success,
    Failure,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StageStart => "stage_start",
            Self::StageComplete => "stage_complete",
            Self::ApiCall => "api_call",
            Self::ApiResponse => "api_response",
            Self::Retry => "retry",
            Self::ValidationFailure => "validation_failure",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

pub struct PublishLogger {
    sink: Arc<dyn LogSink>,
    correlation_id: String,
    campaign_id: String,
    started: Instant,
    stage_starts: Mutex<HashMap<String, Instant>>,
}

impl PublishLogger {
    /// Logger with a fresh UUID v4 correlation id.
    pub fn new(sink: Arc<dyn LogSink>, campaign_id: impl Into<String>) -> Self {
        Self::with_correlation_id(sink, campaign_id, Uuid::new_v4().to_string())
    }

    pub fn with_correlation_id(
        sink: Arc<dyn LogSink>,
        campaign_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            correlation_id: correlation_id.into(),
            campaign_id: campaign_id.into(),
            started: Instant::now(),
            stage_starts: Mutex::new(HashMap::new()),
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Redact credentials from a context value.
    pub fn sanitize(context: &Value) -> Value {
        privacy::sanitize(context)
    }

    pub fn stage_start(&self, stage: &str, context: Value) {
        self.stage_starts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stage.to_string(), Instant::now());
        self.emit(Level::Info, EventKind::StageStart, Some(stage), None, "stage started", context);
    }

    /// Duration is measured from the matching [`Self::stage_start`], if any.
    pub fn stage_complete(&self, stage: &str, context: Value) {
        let started =
            self.stage_starts.lock().unwrap_or_else(PoisonError::into_inner).remove(stage);
        let duration = started.map(|at| at.elapsed());
        self.emit(
            Level::Info,
            EventKind::StageComplete,
            Some(stage),
            duration,
            "stage completed",
            context,
        );
    }

    pub fn api_call(&self, stage: &str, method: &str, path: &str, payload: &Value) {
        self.emit(
            Level::Info,
            EventKind::ApiCall,
            Some(stage),
            None,
            "outbound platform call",
            json!({ "method": method, "path": path, "payload": payload }),
        );
    }

    /// `status` is absent when no HTTP response was received.
    pub fn api_response(
        &self,
        stage: &str,
        method: &str,
        path: &str,
        status: Option<u16>,
        duration: Duration,
        context: Value,
    ) {
        let level = match status {
            Some(code) if code < 400 => Level::Info,
            _ => Level::Warn,
        };
        self.emit(
            level,
            EventKind::ApiResponse,
            Some(stage),
            Some(duration),
            "platform response",
            json!({ "method": method, "path": path, "status": status, "detail": context }),
        );
    }

    pub fn retry_attempt(&self, attempt: u32, delay: Duration, reason: &str) {
        self.emit(
            Level::Warn,
            EventKind::Retry,
            None,
            None,
            "retrying operation",
            json!({
                "attempt": attempt,
                "delay_ms": u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "reason": reason,
            }),
        );
    }

    /// Adapter for [`adpublish_common::resilience::RetryExecutor::with_listener`].
    ///
    /// Retry events share this attempt's correlation id and elapsed clock.
    pub fn retry_listener(&self) -> RetryListener {
        let logger = Arc::new(Self {
            sink: Arc::clone(&self.sink),
            correlation_id: self.correlation_id.clone(),
            campaign_id: self.campaign_id.clone(),
            started: self.started,
            stage_starts: Mutex::new(HashMap::new()),
        });
        Arc::new(move |ctx: &RetryContext, reason: &str| {
            logger.retry_attempt(ctx.attempt, ctx.wait(), reason);
        })
    }

    pub fn validation_failure(&self, message: &str, context: Value) {
        self.emit(Level::Warn, EventKind::ValidationFailure, None, None, message, context);
    }

    pub fn warning(&self, message: &str, context: Value) {
        self.emit(Level::Warn, EventKind::Warning, None, None, message, context);
    }

    pub fn error(&self, stage: Option<&str>, message: &str, error: &PublishError) {
        self.emit(Level::Error, EventKind::Error, stage, None, message, error_context(error));
    }

    pub fn critical(&self, message: &str, error: &PublishError) {
        self.emit(Level::Error, EventKind::Critical, None, None, message, error_context(error));
    }

    /// Terminal summary for a successful operation.
    pub fn success(&self, message: &str, context: Value) {
        self.emit(Level::Info, EventKind::Success, None, Some(self.elapsed()), message, context);
    }

    /// Terminal summary for a failed operation.
    pub fn failure(&self, message: &str, error: &PublishError) {
        self.emit(
            Level::Error,
            EventKind::Failure,
            None,
            Some(self.elapsed()),
            message,
            error_context(error),
        );
    }

    fn emit(
        &self,
        level: Level,
        kind: EventKind,
        stage: Option<&str>,
        duration: Option<Duration>,
        message: &str,
        context: Value,
    ) {
        let event = json!({
            "event": kind.as_str(),
            "correlation_id": self.correlation_id,
            "campaign_id": self.campaign_id,
            "stage": stage,
            "elapsed_ms": millis(self.elapsed()),
            "duration_ms": duration.map(millis),
            "context": Self::sanitize(&context),
        });

        match level {
            Level::Info => self.sink.info(LOG_CATEGORY_PUBLISH, message, &event),
            Level::Warn => self.sink.warn(LOG_CATEGORY_PUBLISH, message, &event),
            Level::Error => self.sink.error(LOG_CATEGORY_PUBLISH, message, &event),
        }
    }
}

impl std::fmt::Debug for PublishLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishLogger")
            .field("correlation_id", &self.correlation_id)
            .field("campaign_id", &self.campaign_id)
            .finish_non_exhaustive()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn error_context(error: &PublishError) -> Value {
    let mut context = json!({ "code": error.code(), "message": error.to_string() });
    if let Some(platform) = error.platform() {
        context["platform"] = json!({
            "status": platform.status,
            "code": platform.code,
            "subcode": platform.subcode,
            "type": platform.error_type,
            "trace_id": platform.trace_id,
        });
    }
    context
}
