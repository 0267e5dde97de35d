//! Port interfaces for publish orchestration

use adpublish_common::resilience::RetryListener;
use adpublish_domain::{
    ConnectionCredential, JsonObject, PublishJob, PublishStatus, PublishStatusView, Result,
};
use async_trait::async_trait;
use serde_json::Value;

/// Successful (2xx) response from the ad platform
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformResponse {
    pub status: u16,
    pub body: JsonObject,
}

impl PlatformResponse {
    pub fn new(status: u16, body: JsonObject) -> Self {
        Self { status, body }
    }
}

/// Authenticated access to the external ad platform.
///
/// Implementations must not retry: create calls are not idempotent.
#[async_trait]
pub trait AdPlatform: Send + Sync {
    /// Form-encoded POST to `path` (relative to the versioned API root)
    ///
    /// `null` fields are left out of the form body, so they cannot be used to
    /// clear a remote value.
    async fn post(&self, token: &str, path: &str, payload: &JsonObject)
        -> Result<PlatformResponse>;

    /// GET `path` with query parameters
    async fn get(&self, token: &str, path: &str, query: &[(String, String)])
        -> Result<PlatformResponse>;
}

/// Connection management collaborator (read-only)
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn get_connection_with_token(
        &self,
        campaign_id: &str,
    ) -> Result<Option<ConnectionCredential>>;
}

/// Source of the stored `{campaign, adset, ads[]}` blob
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_publish_config(&self, campaign_id: &str) -> Result<Option<Value>>;

    /// Like [`Self::get_publish_config`], reporting every retry of the
    /// underlying fetch to `listener`. Stores that never retry ignore it.
    async fn get_publish_config_observed(
        &self,
        campaign_id: &str,
        _listener: RetryListener,
    ) -> Result<Option<Value>> {
        self.get_publish_config(campaign_id).await
    }
}

/// Persistence for publish jobs and the campaign status mirror
#[async_trait]
pub trait PublishJobRepository: Send + Sync {
    async fn get_job(&self, campaign_id: &str) -> Result<Option<PublishJob>>;

    /// Insert or overwrite the job keyed by campaign id
    async fn upsert_job(&self, job: &PublishJob) -> Result<()>;

    /// Update the denormalized `campaigns.published_status` mirror
    async fn set_campaign_published_status(
        &self,
        campaign_id: &str,
        status: PublishStatus,
    ) -> Result<()>;

    /// Job joined with the campaign mirror
    async fn get_status_view(&self, campaign_id: &str) -> Result<Option<PublishStatusView>>;
}

/// External structured log sink
pub trait LogSink: Send + Sync {
    fn info(&self, category: &str, message: &str, context: &Value);
    fn warn(&self, category: &str, message: &str, context: &Value);
    fn error(&self, category: &str, message: &str, context: &Value);
}
