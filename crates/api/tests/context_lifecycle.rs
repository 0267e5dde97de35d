//! Integration tests for AppContext construction and health reporting.

mod support;

use adpublish_app::AppContext;
use adpublish_domain::PublishError;
use serde_json::json;
use support::test_config;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Validates that a fresh context migrates its database.
///
/// # Test Steps
/// 1. Build a context over an empty temp directory
/// 2. Verify the schema exists and the health check passes
#[tokio::test(flavor = "multi_thread")]
async fn test_context_creation_runs_migrations() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let ctx = AppContext::new(test_config(&temp_dir, &server)).await.expect("context");

    let conn = ctx.db.get_connection().unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('publish_jobs', 'campaigns', 'campaign_publish_config', 'platform_connections')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 4);

    let health = ctx.health_check().await;
    assert!(health.is_healthy);
    assert_eq!(health.components.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_context_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let mut config = test_config(&temp_dir, &server);
    config.retry.max_attempts = 0;

    let result = AppContext::new(config).await;
    assert!(matches!(result, Err(PublishError::Configuration(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_context_reopens_existing_database() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let first = AppContext::new(test_config(&temp_dir, &server)).await.unwrap();
    first.connections.save_campaign("c1", "Kept", None).await.unwrap();
    drop(first);

    let second = AppContext::new(test_config(&temp_dir, &server)).await.unwrap();
    let conn = second.db.get_connection().unwrap();
    let name: String =
        conn.query_row("SELECT name FROM campaigns WHERE id = 'c1'", [], |row| row.get(0)).unwrap();
    assert_eq!(name, "Kept");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_reports_unreachable_internal_api() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/internal/health"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = test_config(&temp_dir, &server);
    config.internal_api.base_url = Some(format!("{}/internal", server.uri()));

    let ctx = AppContext::new(config).await.unwrap();
    let health = ctx.health_check().await;

    assert!(!health.is_healthy);
    let api = health.components.iter().find(|c| c.name == "internal_api").unwrap();
    assert!(api.message.as_deref().unwrap().contains("Retry budget exhausted"));
    assert_eq!(json!(health)["components"][0]["name"], "database");
}
