//! Read access to platform connections, plus the campaign rows that link to
//! them.
//!
//! Connections belong to connection management; the publish pipeline only
//! resolves the credential for a campaign. The write helpers exist for
//! provisioning and tests.

use std::sync::Arc;

use adpublish_core::ConnectionStore;
use adpublish_domain::{ConnectionCredential, Result as DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

pub struct SqliteConnectionStore {
    db: Arc<DbManager>,
}

impl SqliteConnectionStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a platform connection.
    pub async fn save_connection(
        &self,
        connection_id: &str,
        credential: &ConnectionCredential,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let connection_id = connection_id.to_string();
        let credential = credential.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO platform_connections (id, ad_account_id, access_token, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    ad_account_id = excluded.ad_account_id,
                    access_token = excluded.access_token",
                params![
                    connection_id,
                    credential.ad_account_id,
                    credential.bearer_token,
                    Utc::now().timestamp()
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Insert or rename a campaign and point it at a connection.
    ///
    /// The published status mirror is left untouched.
    pub async fn save_campaign(
        &self,
        campaign_id: &str,
        name: &str,
        connection_id: Option<&str>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let campaign_id = campaign_id.to_string();
        let name = name.to_string();
        let connection_id = connection_id.map(str::to_string);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO campaigns (id, name, connection_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    connection_id = excluded.connection_id,
                    updated_at = excluded.updated_at",
                params![campaign_id, name, connection_id, Utc::now().timestamp()],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl ConnectionStore for SqliteConnectionStore {
    async fn get_connection_with_token(
        &self,
        campaign_id: &str,
    ) -> DomainResult<Option<ConnectionCredential>> {
        let db = Arc::clone(&self.db);
        let campaign_id = campaign_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<ConnectionCredential>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT pc.ad_account_id, pc.access_token
                 FROM campaigns c JOIN platform_connections pc ON pc.id = c.connection_id
                 WHERE c.id = ?1",
                params![campaign_id],
                |row| Ok(ConnectionCredential::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}
