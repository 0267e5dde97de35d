//! Shared test helpers for `adpublish-core` integration tests.
//!
//! In-memory implementations of every publish port so orchestrator tests can
//! focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod platform;
pub mod repositories;

use std::sync::Arc;

use adpublish_core::PublishOrchestrator;
use adpublish_domain::ConnectionCredential;
use serde_json::{json, Value};

pub use platform::{MockAdPlatform, RecordedCall};
pub use repositories::{
    CapturingLogSink, InMemoryConfigStore, InMemoryConnectionStore, InMemoryPublishJobRepository,
};

pub const TEST_TOKEN: &str = "EAAB-test-token-0123456789";

/// Orchestrator wired to in-memory ports, with handles to each mock.
pub struct Harness {
    pub orchestrator: PublishOrchestrator,
    pub platform: MockAdPlatform,
    pub configs: InMemoryConfigStore,
    pub connections: InMemoryConnectionStore,
    pub jobs: InMemoryPublishJobRepository,
    pub logs: CapturingLogSink,
}

impl Harness {
    pub fn new() -> Self {
        let platform = MockAdPlatform::new();
        let configs = InMemoryConfigStore::default();
        let connections = InMemoryConnectionStore::default();
        let jobs = InMemoryPublishJobRepository::default();
        let logs = CapturingLogSink::default();

        let orchestrator = PublishOrchestrator::new(
            Arc::new(platform.clone()),
            Arc::new(connections.clone()),
            Arc::new(configs.clone()),
            Arc::new(jobs.clone()),
            Arc::new(logs.clone()),
        );

        Self { orchestrator, platform, configs, connections, jobs, logs }
    }

    /// Seed a campaign with `config` and a valid connection.
    pub fn with_campaign(self, campaign_id: &str, config: Value) -> Self {
        self.configs.insert(campaign_id, config);
        self.connections.insert(campaign_id, ConnectionCredential::new("123456", TEST_TOKEN));
        self
    }
}

/// Config with `ad_count` ads named `Ad1..AdN`.
pub fn sample_config(ad_count: usize) -> Value {
    let ads: Vec<Value> =
        (1..=ad_count).map(|i| json!({ "name": format!("Ad{i}"), "creative_id": i })).collect();
    json!({
        "campaign": { "name": "C1", "objective": "OUTCOME_SALES" },
        "adset": { "name": "AS1", "dailyBudget": 25 },
        "ads": ads,
    })
}
