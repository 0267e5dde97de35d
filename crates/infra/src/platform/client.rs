//! HTTP adapter for the external ad platform.
//!
//! Requests are form-encoded with bearer-token auth against
//! `{base_url}/{api_version}/{path}`. Calls are sent exactly once: object
//! creation is not idempotent, so nothing here retries.

use adpublish_core::{AdPlatform, PlatformResponse};
use adpublish_domain::{JsonObject, PlatformConfig, PlatformError, PublishError, Result};
use async_trait::async_trait;
use reqwest::{Method, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

#[derive(Clone)]
pub struct AdPlatformClient {
    http: HttpClient,
    api_url: String,
}

impl AdPlatformClient {
    pub fn new(http: HttpClient, config: &PlatformConfig) -> Self {
        let api_url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.api_version.trim_matches('/')
        );
        Self::with_api_url(http, api_url)
    }

    /// Point the client at an already versioned API root.
    pub fn with_api_url(http: HttpClient, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { http, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AdPlatform for AdPlatformClient {
    async fn post(
        &self,
        token: &str,
        path: &str,
        payload: &JsonObject,
    ) -> Result<PlatformResponse> {
        let url = self.url(path);
        debug!(%url, fields = payload.len(), "POST to ad platform");

        let request =
            self.http.request(Method::POST, &url).bearer_auth(token).form(&encode_form(payload));
        let response = self.http.send_once(request).await?;
        read_response(response).await
    }

    async fn get(
        &self,
        token: &str,
        path: &str,
        query: &[(String, String)],
    ) -> Result<PlatformResponse> {
        let url = self.url(path);
        debug!(%url, "GET from ad platform");

        let request = self.http.request(Method::GET, &url).bearer_auth(token).query(query);
        let response = self.http.send_once(request).await?;
        read_response(response).await
    }
}

/// Flatten a payload into form fields.
///
/// Strings pass through, scalars are stringified, arrays and objects are
/// JSON-encoded and `null` fields are dropped.
pub fn encode_form(payload: &JsonObject) -> Vec<(String, String)> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                nested @ (Value::Array(_) | Value::Object(_)) => nested.to_string(),
            };
            Some((key.clone(), encoded))
        })
        .collect()
}

async fn read_response(response: Response) -> Result<PlatformResponse> {
    let status = response.status().as_u16();
    let text = response.text().await.map_err(InfraError::from)?;

    if !(200..300).contains(&status) {
        let error = parse_error(status, &text);
        warn!(status, message = %error.message, code = ?error.code, "ad platform rejected request");
        return Err(PublishError::ExternalApi(error));
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(body)) => Ok(PlatformResponse::new(status, body)),
        Ok(_) => Err(PlatformError::malformed("expected a JSON object").with_status(status).into()),
        Err(err) => Err(PlatformError::malformed(err).with_status(status).into()),
    }
}

/// Build a [`PlatformError`] from a non-2xx body.
///
/// Prefers the `{error:{message,...}}` envelope, then the raw body, then a
/// generic message.
pub fn parse_error(status: u16, body: &str) -> PlatformError {
    let envelope = serde_json::from_str::<Value>(body).ok();
    let error = envelope.as_ref().and_then(|v| v.get("error")).filter(|e| e.is_object());

    if let Some(message) = error.and_then(|e| e.get("message")).and_then(Value::as_str) {
        let field = |name: &str| error.and_then(|e| e.get(name));
        return PlatformError {
            status: Some(status),
            message: message.to_string(),
            code: field("code").and_then(Value::as_i64),
            subcode: field("error_subcode").and_then(Value::as_i64),
            error_type: field("type").and_then(Value::as_str).map(str::to_string),
            trace_id: field("fbtrace_id").and_then(Value::as_str).map(str::to_string),
        };
    }

    let raw = body.trim();
    let message = if raw.is_empty() { format!("API error {status}") } else { raw.to_string() };
    PlatformError::new(message).with_status(status)
}
