//! Shared helpers for `adpublish-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use adpublish_domain::ConnectionCredential;
use adpublish_infra::database::{
    DbManager, SqliteConfigStore, SqliteConnectionStore, SqlitePublishJobRepository,
};
use serde_json::Value;
use tempfile::TempDir;

pub const TEST_TOKEN: &str = "EAAB-integration-token-0123456789";

/// Temporary migrated database that keeps its directory alive for the test.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("adpublish-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn jobs(&self) -> SqlitePublishJobRepository {
        SqlitePublishJobRepository::new(Arc::clone(&self.manager))
    }

    pub fn configs(&self) -> SqliteConfigStore {
        SqliteConfigStore::new(Arc::clone(&self.manager))
    }

    pub fn connections(&self) -> SqliteConnectionStore {
        SqliteConnectionStore::new(Arc::clone(&self.manager))
    }

    /// Seed a campaign row, its connection and its publish config.
    pub async fn seed_campaign(&self, campaign_id: &str, account_id: &str, config: &Value) {
        let connections = self.connections();
        let connection_id = format!("conn-{campaign_id}");
        connections
            .save_connection(&connection_id, &ConnectionCredential::new(account_id, TEST_TOKEN))
            .await
            .expect("connection saved");
        connections
            .save_campaign(campaign_id, "Integration campaign", Some(&connection_id))
            .await
            .expect("campaign saved");
        self.configs().save_publish_config(campaign_id, config).await.expect("config saved");
    }

    /// Raw `campaigns.published_status` value.
    pub fn mirror_status(&self, campaign_id: &str) -> Option<String> {
        let conn = self.manager.get_connection().expect("connection");
        conn.query_row(
            "SELECT published_status FROM campaigns WHERE id = ?1",
            [campaign_id],
            |row| row.get(0),
        )
        .expect("campaign row")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}
