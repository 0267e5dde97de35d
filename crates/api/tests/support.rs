//! Shared helpers for `adpublish-app` integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use adpublish_app::AppContext;
use adpublish_domain::{AppConfig, ConnectionCredential};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TEST_TOKEN: &str = "EAAB-app-token-0123456789abcdef";

/// Config pointing at a temp database and the mock platform, with fast
/// retries.
pub fn test_config(temp_dir: &TempDir, server: &MockServer) -> AppConfig {
    let mut config =
        AppConfig::with_database_path(temp_dir.path().join("adpublish.db").to_string_lossy());
    config.database.pool_size = 2;
    config.platform.base_url = server.uri();
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config
}

/// Mock platform: creates return fresh ids, everything else succeeds.
pub async fn mount_platform(server: &MockServer) {
    let counter = Arc::new(AtomicUsize::new(0));
    Mock::given(method("POST"))
        .respond_with(move |req: &Request| -> ResponseTemplate {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let path = req.url.path();
            let body = if path.ends_with("/campaigns") {
                json!({ "id": format!("cmp_{n}") })
            } else if path.ends_with("/adsets") {
                json!({ "id": format!("as_{n}") })
            } else if path.ends_with("/ads") {
                json!({ "id": format!("ad_{n}") })
            } else {
                json!({ "success": true })
            };
            ResponseTemplate::new(200).set_body_json(body)
        })
        .mount(server)
        .await;
}

pub fn sample_config(ad_count: usize) -> Value {
    let ads: Vec<Value> = (1..=ad_count).map(|i| json!({ "name": format!("Ad{i}") })).collect();
    json!({
        "campaign": { "name": "C1" },
        "adset": { "name": "AS1", "dailyBudget": 25 },
        "ads": ads,
    })
}

/// Seed connection, campaign row and local publish config.
pub async fn seed_campaign(ctx: &AppContext, campaign_id: &str, config: &Value) {
    ctx.connections
        .save_connection("conn-1", &ConnectionCredential::new("555", TEST_TOKEN))
        .await
        .expect("connection saved");
    ctx.connections
        .save_campaign(campaign_id, "App campaign", Some("conn-1"))
        .await
        .expect("campaign saved");
    ctx.local_configs.save_publish_config(campaign_id, config).await.expect("config saved");
}
