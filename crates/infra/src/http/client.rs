use std::time::Duration;

use adpublish_common::resilience::{
    RetryDecision, RetryError, RetryExecutor, RetryListener, RetryPolicy, RetryPredicate,
};
use adpublish_domain::PublishError;
use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with retry support driven by the shared retry engine.
///
/// No request timeout is set unless one is configured explicitly.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, PublishError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute the request with retry semantics.
    ///
    /// Transport failures and 5xx responses are retried. When every attempt
    /// was retryable the result is [`PublishError::RetryExhausted`].
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, PublishError> {
        self.send_with_listener(builder, None).await
    }

    /// [`send`](Self::send) with a callback for every scheduled retry.
    pub async fn send_with_listener(
        &self,
        builder: RequestBuilder,
        listener: Option<RetryListener>,
    ) -> Result<Response, PublishError> {
        let request = build_request(builder)?;
        if request.try_clone().is_none() {
            return Err(PublishError::Internal(
                "request body cannot be cloned; buffer the body to enable retries".into(),
            ));
        }

        let mut executor = RetryExecutor::new(self.policy.clone(), HttpRetryPredicate);
        if let Some(listener) = listener {
            executor = executor.with_listener(listener);
        }

        let outcome = executor
            .execute(|| {
                let attempt = request.try_clone();
                async move {
                    match attempt {
                        Some(request) => self.execute(request).await,
                        None => Err(PublishError::Internal("request could not be cloned".into())),
                    }
                }
            })
            .await;

        match outcome {
            Ok(response) => Ok(response),
            Err(RetryError::Operation(err)) => Err(err),
            Err(RetryError::Exhausted { attempts, last }) => {
                let last_error = match last {
                    Ok(response) => format!("HTTP {}", response.status()),
                    Err(err) => err.to_string(),
                };
                Err(PublishError::RetryExhausted { attempts, last_error })
            }
            Err(RetryError::InvalidPolicy(message)) => Err(PublishError::Configuration(message)),
        }
    }

    /// Execute the request exactly once.
    ///
    /// Used for calls that are not safe to repeat, such as remote object
    /// creation.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Response, PublishError> {
        let request = build_request(builder)?;
        self.execute(request).await
    }

    async fn execute(&self, request: Request) -> Result<Response, PublishError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }
}

fn build_request(builder: RequestBuilder) -> Result<Request, PublishError> {
    builder.build().map_err(|err| InfraError::from(err).into())
}

/// Retries transport-level failures and 5xx responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRetryPredicate;

impl RetryPredicate<Response, PublishError> for HttpRetryPredicate {
    fn decide(&self, outcome: &Result<Response, PublishError>) -> RetryDecision {
        match outcome {
            Ok(response) if response.status().is_server_error() => {
                RetryDecision::retry(format!("HTTP {}", response.status()))
            }
            Ok(_) => RetryDecision::Stop,
            Err(PublishError::Network(message)) => RetryDecision::retry(message.clone()),
            Err(_) => RetryDecision::Stop,
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    policy: RetryPolicy,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, PublishError> {
        self.policy.validate().map_err(PublishError::Configuration)?;

        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| PublishError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, policy: self.policy })
    }
}
