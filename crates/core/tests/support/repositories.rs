//! Mock repository implementations for testing
//!
//! Provides in-memory mocks for the store and sink ports, enabling
//! deterministic orchestrator tests without database dependencies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use adpublish_core::{ConfigStore, ConnectionStore, LogSink, PublishJobRepository};
use adpublish_domain::{
    ConnectionCredential, PublishJob, PublishStatus, PublishStatusView, Result as DomainResult,
};
use async_trait::async_trait;
use serde_json::Value;

/// In-memory mock for `ConfigStore`.
#[derive(Default, Clone)]
pub struct InMemoryConfigStore {
    configs: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryConfigStore {
    pub fn insert(&self, campaign_id: &str, config: Value) {
        self.configs.lock().unwrap().insert(campaign_id.to_string(), config);
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_publish_config(&self, campaign_id: &str) -> DomainResult<Option<Value>> {
        Ok(self.configs.lock().unwrap().get(campaign_id).cloned())
    }
}

/// In-memory mock for `ConnectionStore`.
#[derive(Default, Clone)]
pub struct InMemoryConnectionStore {
    connections: Arc<Mutex<HashMap<String, ConnectionCredential>>>,
}

impl InMemoryConnectionStore {
    pub fn insert(&self, campaign_id: &str, credential: ConnectionCredential) {
        self.connections.lock().unwrap().insert(campaign_id.to_string(), credential);
    }

    pub fn remove(&self, campaign_id: &str) {
        self.connections.lock().unwrap().remove(campaign_id);
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn get_connection_with_token(
        &self,
        campaign_id: &str,
    ) -> DomainResult<Option<ConnectionCredential>> {
        Ok(self.connections.lock().unwrap().get(campaign_id).cloned())
    }
}

/// In-memory mock for `PublishJobRepository`.
///
/// Keeps every upsert in `history` so tests can inspect checkpoints.
#[derive(Default, Clone)]
pub struct InMemoryPublishJobRepository {
    jobs: Arc<Mutex<HashMap<String, PublishJob>>>,
    mirror: Arc<Mutex<HashMap<String, PublishStatus>>>,
    history: Arc<Mutex<Vec<PublishJob>>>,
}

impl InMemoryPublishJobRepository {
    pub fn job(&self, campaign_id: &str) -> Option<PublishJob> {
        self.jobs.lock().unwrap().get(campaign_id).cloned()
    }

    pub fn mirror(&self, campaign_id: &str) -> Option<PublishStatus> {
        self.mirror.lock().unwrap().get(campaign_id).copied()
    }

    pub fn history(&self) -> Vec<PublishJob> {
        self.history.lock().unwrap().clone()
    }

    pub fn insert(&self, job: PublishJob) {
        self.jobs.lock().unwrap().insert(job.campaign_id.clone(), job);
    }
}

#[async_trait]
impl PublishJobRepository for InMemoryPublishJobRepository {
    async fn get_job(&self, campaign_id: &str) -> DomainResult<Option<PublishJob>> {
        Ok(self.job(campaign_id))
    }

    async fn upsert_job(&self, job: &PublishJob) -> DomainResult<()> {
        self.history.lock().unwrap().push(job.clone());
        self.insert(job.clone());
        Ok(())
    }

    async fn set_campaign_published_status(
        &self,
        campaign_id: &str,
        status: PublishStatus,
    ) -> DomainResult<()> {
        self.mirror.lock().unwrap().insert(campaign_id.to_string(), status);
        Ok(())
    }

    async fn get_status_view(&self, campaign_id: &str) -> DomainResult<Option<PublishStatusView>> {
        Ok(self.job(campaign_id).map(|job| PublishStatusView {
            campaign_published_status: self.mirror(campaign_id),
            job,
        }))
    }
}

/// One event delivered to the sink.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: &'static str,
    pub category: String,
    pub message: String,
    pub context: Value,
}

/// `LogSink` that records every event.
#[derive(Default, Clone)]
pub struct CapturingLogSink {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturingLogSink {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_of(&self, kind: &str) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| e.context["event"] == kind).collect()
    }

    fn push(&self, level: &'static str, category: &str, message: &str, context: &Value) {
        self.events.lock().unwrap().push(CapturedEvent {
            level,
            category: category.to_string(),
            message: message.to_string(),
            context: context.clone(),
        });
    }
}

impl LogSink for CapturingLogSink {
    fn info(&self, category: &str, message: &str, context: &Value) {
        self.push("info", category, message, context);
    }

    fn warn(&self, category: &str, message: &str, context: &Value) {
        self.push("warn", category, message, context);
    }

    fn error(&self, category: &str, message: &str, context: &Value) {
        self.push("error", category, message, context);
    }
}
