//! Scriptable in-memory ad platform

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use adpublish_core::{AdPlatform, PlatformResponse};
use adpublish_domain::{JsonObject, PlatformError, PublishError, Result as DomainResult};
use async_trait::async_trait;
use serde_json::{json, Value};

/// One request observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub token: String,
    pub payload: JsonObject,
}

#[derive(Debug, Clone)]
struct FailureRule {
    path_suffix: String,
    error: PublishError,
    /// Matching calls let through before failing
    skip: usize,
    /// `None` fails forever
    remaining: Option<usize>,
}

/// In-memory mock for `AdPlatform`.
///
/// Create calls (`.../campaigns`, `.../adsets`, `.../ads`) answer with a fresh
/// unique id; any other POST is treated as a status update and answers
/// `{"success": true}`. Failures are scripted by path suffix.
#[derive(Default, Clone)]
pub struct MockAdPlatform {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failures: Arc<Mutex<Vec<FailureRule>>>,
    missing_id_suffixes: Arc<Mutex<Vec<String>>>,
    next_id: Arc<AtomicU64>,
}

impl MockAdPlatform {
    pub fn new() -> Self {
        Self { next_id: Arc::new(AtomicU64::new(1)), ..Self::default() }
    }

    /// Every call whose path ends with `suffix` fails with a 400.
    pub fn fail_path(&self, suffix: &str, message: &str) {
        self.push_failure(suffix, message, 0, None);
    }

    /// The next `times` calls whose path ends with `suffix` fail.
    pub fn fail_path_times(&self, suffix: &str, message: &str, times: usize) {
        self.push_failure(suffix, message, 0, Some(times));
    }

    /// Let `skip` matching calls through, then fail the next one.
    pub fn fail_after(&self, suffix: &str, message: &str, skip: usize) {
        self.push_failure(suffix, message, skip, Some(1));
    }

    /// Create calls on `suffix` succeed without an `id` field.
    pub fn omit_id_on(&self, suffix: &str) {
        self.missing_id_suffixes.lock().unwrap().push(suffix.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, suffix: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|call| call.path.ends_with(suffix)).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push_failure(&self, suffix: &str, message: &str, skip: usize, remaining: Option<usize>) {
        let error = PublishError::ExternalApi(PlatformError {
            status: Some(400),
            message: message.to_string(),
            code: Some(100),
            subcode: None,
            error_type: Some("OAuthException".into()),
            trace_id: Some("mock-trace".into()),
        });
        self.failures.lock().unwrap().push(FailureRule {
            path_suffix: suffix.to_string(),
            error,
            skip,
            remaining,
        });
    }

    fn scripted_failure(&self, path: &str) -> Option<PublishError> {
        let mut failures = self.failures.lock().unwrap();
        let rule = failures
            .iter_mut()
            .find(|rule| path.ends_with(&rule.path_suffix) && rule.remaining != Some(0))?;
        if rule.skip > 0 {
            rule.skip -= 1;
            return None;
        }
        if let Some(remaining) = rule.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(rule.error.clone())
    }

    fn respond(&self, path: &str) -> JsonObject {
        let prefix = if path.ends_with("/campaigns") {
            "cmp"
        } else if path.ends_with("/adsets") {
            "as"
        } else if path.ends_with("/ads") {
            "ad"
        } else {
            return object(json!({ "success": true }));
        };

        let omit = self.missing_id_suffixes.lock().unwrap().iter().any(|s| path.ends_with(s));
        if omit {
            return object(json!({ "success": true }));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        object(json!({ "id": format!("{prefix}_{n}") }))
    }

    fn record(&self, method: &'static str, token: &str, path: &str, payload: JsonObject) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            token: token.to_string(),
            payload,
        });
    }
}

#[async_trait]
impl AdPlatform for MockAdPlatform {
    async fn post(
        &self,
        token: &str,
        path: &str,
        payload: &JsonObject,
    ) -> DomainResult<PlatformResponse> {
        self.record("POST", token, path, payload.clone());
        if let Some(err) = self.scripted_failure(path) {
            return Err(err);
        }
        Ok(PlatformResponse::new(200, self.respond(path)))
    }

    async fn get(
        &self,
        token: &str,
        path: &str,
        query: &[(String, String)],
    ) -> DomainResult<PlatformResponse> {
        let payload = query.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
        self.record("GET", token, path, payload);
        if let Some(err) = self.scripted_failure(path) {
            return Err(err);
        }
        Ok(PlatformResponse::new(200, object(json!({ "id": path }))))
    }
}

fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
