//! Campaign publish config store (`campaign_publish_config`)

use std::sync::Arc;

use adpublish_core::ConfigStore;
use adpublish_domain::{PublishError, Result as DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

pub struct SqliteConfigStore {
    db: Arc<DbManager>,
}

impl SqliteConfigStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store the `{campaign, adset, ads[]}` blob for a campaign, replacing any
    /// previous version.
    pub async fn save_publish_config(&self, campaign_id: &str, config: &Value) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let campaign_id = campaign_id.to_string();
        let config_json = config.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO campaign_publish_config (campaign_id, config_json, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(campaign_id) DO UPDATE SET
                    config_json = excluded.config_json,
                    updated_at = excluded.updated_at",
                params![campaign_id, config_json, Utc::now().timestamp()],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn get_publish_config(&self, campaign_id: &str) -> DomainResult<Option<Value>> {
        let db = Arc::clone(&self.db);
        let campaign_id = campaign_id.to_string();

        let raw = task::spawn_blocking(move || -> DomainResult<Option<String>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT config_json FROM campaign_publish_config WHERE campaign_id = ?1",
                params![campaign_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)??;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|err| {
                PublishError::Configuration(format!("stored publish config is not valid JSON: {err}"))
            })
        })
        .transpose()
    }
}
