//! Client for the internal JSON API used by presentation-layer collaborators.
//!
//! Every call goes through [`HttpClient::send`] so transient failures are
//! retried; only idempotent reads are exposed here.

use adpublish_common::resilience::RetryListener;
use adpublish_core::ConfigStore;
use adpublish_domain::{PublishError, Result};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::client::HttpClient;
use crate::errors::InfraError;

#[derive(Clone)]
pub struct InternalApiClient {
    http: HttpClient,
    base_url: String,
    listener: Option<RetryListener>,
}

impl InternalApiClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url, listener: None }
    }

    /// Report each scheduled retry, e.g. to a publish logger.
    #[must_use]
    pub fn with_retry_listener(mut self, listener: RetryListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON document. `404` yields `Ok(None)`.
    pub async fn get_json(&self, path: &str) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self.http.request(Method::GET, &url);
        let response = self.http.send_with_listener(request, self.listener.clone()).await?;

        let status = response.status();
        debug!(%url, %status, "internal API response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PublishError::Network(format!("internal API returned HTTP {status}")));
        }

        let body = response.bytes().await.map_err(InfraError::from)?;
        if body.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(&body).map_err(InfraError::from)?;
        Ok(Some(value))
    }
}

/// [`ConfigStore`] backed by the internal API.
#[derive(Clone)]
pub struct InternalApiConfigStore {
    client: InternalApiClient,
}

impl InternalApiConfigStore {
    pub fn new(client: InternalApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConfigStore for InternalApiConfigStore {
    async fn get_publish_config(&self, campaign_id: &str) -> Result<Option<Value>> {
        fetch_publish_config(&self.client, campaign_id).await
    }

    async fn get_publish_config_observed(
        &self,
        campaign_id: &str,
        listener: RetryListener,
    ) -> Result<Option<Value>> {
        let client = self.client.clone().with_retry_listener(listener);
        fetch_publish_config(&client, campaign_id).await
    }
}

async fn fetch_publish_config(
    client: &InternalApiClient,
    campaign_id: &str,
) -> Result<Option<Value>> {
    match client.get_json(&format!("campaigns/{campaign_id}/publish-config")).await? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(value)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use adpublish_common::resilience::{RetryContext, RetryPolicy};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> InternalApiClient {
        let policy = RetryPolicy::builder()
            .max_attempts(3)
            .base_delay(Duration::from_millis(5))
            .max_delay(Duration::from_millis(10))
            .no_jitter()
            .build()
            .unwrap();
        let http = HttpClient::builder().retry_policy(policy).build().unwrap();
        InternalApiClient::new(http, format!("{}/", server.uri()))
    }

    #[tokio::test]
    async fn fetches_publish_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/campaigns/c1/publish-config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "campaign": {"name": "C1"},
                "adset": {"name": "AS1"},
                "ads": [{"name": "Ad1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = InternalApiConfigStore::new(client(&server));
        let config = store.get_publish_config("c1").await.unwrap().unwrap();
        assert_eq!(config["campaign"]["name"], "C1");
    }

    #[tokio::test]
    async fn missing_config_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let store = InternalApiConfigStore::new(client(&server));
        assert!(store.get_publish_config("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                if calls_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
                }
            })
            .mount(&server)
            .await;

        let value = client(&server).get_json("health").await.unwrap().unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_structured_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server).get_json("campaigns/c1/publish-config").await.unwrap_err();
        assert_eq!(err.code(), "max_retries_exceeded");
        assert!(matches!(err, PublishError::RetryExhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn observed_fetch_reports_each_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ads": []})))
            .mount(&server)
            .await;

        let reasons = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = reasons.clone();
        let listener: RetryListener = Arc::new(move |_ctx: &RetryContext, reason: &str| {
            seen.lock().unwrap().push(reason.to_string());
        });

        let store = InternalApiConfigStore::new(client(&server));
        let config = store.get_publish_config_observed("c1", listener).await.unwrap();

        assert!(config.is_some());
        let reasons = reasons.lock().unwrap();
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("502"));
    }
}
