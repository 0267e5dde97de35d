//! SQLite-backed publish job store
//!
//! One `publish_jobs` row per campaign, upserted on every transition and never
//! deleted. The `campaigns.published_status` mirror is written by a separate
//! statement, so the two may briefly disagree.

use std::str::FromStr;
use std::sync::Arc;

use adpublish_core::PublishJobRepository;
use adpublish_domain::{
    PublishJob, PublishStage, PublishStatus, PublishStatusView, Result as DomainResult,
    StatusSyncPlan,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::debug;

use super::manager::{map_join_error, map_sql_error, DbManager};
use crate::errors::InfraError;

const JOB_COLUMNS: &str = "j.campaign_id, j.status, j.external_campaign_id, j.external_adset_id, \
     j.external_ad_ids, j.error_message, j.last_completed_stage, j.status_sync, \
     j.published_at, j.paused_at, j.updated_at";

pub struct SqlitePublishJobRepository {
    db: Arc<DbManager>,
}

impl SqlitePublishJobRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PublishJobRepository for SqlitePublishJobRepository {
    async fn get_job(&self, campaign_id: &str) -> DomainResult<Option<PublishJob>> {
        let db = Arc::clone(&self.db);
        let campaign_id = campaign_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<PublishJob>> {
            let conn = db.get_connection()?;
            query_job(&conn, &campaign_id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn upsert_job(&self, job: &PublishJob) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let job = job.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_job_row(&conn, &job)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_campaign_published_status(
        &self,
        campaign_id: &str,
        status: PublishStatus,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let campaign_id = campaign_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE campaigns SET published_status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![status.as_str(), Utc::now().timestamp(), campaign_id],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                debug!(campaign_id = %campaign_id, "no campaign row to mirror publish status into");
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_status_view(&self, campaign_id: &str) -> DomainResult<Option<PublishStatusView>> {
        let db = Arc::clone(&self.db);
        let campaign_id = campaign_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<PublishStatusView>> {
            let conn = db.get_connection()?;
            query_status_view(&conn, &campaign_id)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_job(conn: &Connection, campaign_id: &str) -> DomainResult<Option<PublishJob>> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM publish_jobs j WHERE j.campaign_id = ?1");
    conn.query_row(&sql, params![campaign_id], map_job_row).optional().map_err(map_sql_error)
}

fn query_status_view(
    conn: &Connection,
    campaign_id: &str,
) -> DomainResult<Option<PublishStatusView>> {
    let sql = format!(
        "SELECT {JOB_COLUMNS}, c.published_status
         FROM publish_jobs j LEFT JOIN campaigns c ON c.id = j.campaign_id
         WHERE j.campaign_id = ?1"
    );

    conn.query_row(&sql, params![campaign_id], |row| {
        let job = map_job_row(row)?;
        let mirror: Option<String> = row.get(11)?;
        let campaign_published_status =
            mirror.as_deref().map(|s| parse_text::<PublishStatus>(11, s)).transpose()?;
        Ok(PublishStatusView { job, campaign_published_status })
    })
    .optional()
    .map_err(map_sql_error)
}

fn upsert_job_row(conn: &Connection, job: &PublishJob) -> DomainResult<()> {
    let ad_ids = serde_json::to_string(&job.external_ad_ids).map_err(InfraError::from)?;
    let status_sync =
        job.status_sync.as_ref().map(serde_json::to_string).transpose().map_err(InfraError::from)?;

    conn.execute(
        "INSERT INTO publish_jobs (
            campaign_id, status, external_campaign_id, external_adset_id, external_ad_ids,
            error_message, last_completed_stage, status_sync, published_at, paused_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(campaign_id) DO UPDATE SET
            status = excluded.status,
            external_campaign_id = excluded.external_campaign_id,
            external_adset_id = excluded.external_adset_id,
            external_ad_ids = excluded.external_ad_ids,
            error_message = excluded.error_message,
            last_completed_stage = excluded.last_completed_stage,
            status_sync = excluded.status_sync,
            published_at = excluded.published_at,
            paused_at = excluded.paused_at,
            updated_at = excluded.updated_at",
        params![
            job.campaign_id,
            job.status.as_str(),
            job.external_campaign_id,
            job.external_adset_id,
            ad_ids,
            job.error_message,
            job.last_completed_stage.map(|stage| stage.as_str()),
            status_sync,
            job.published_at.map(|ts| ts.timestamp()),
            job.paused_at.map(|ts| ts.timestamp()),
            job.updated_at.timestamp(),
        ],
    )
    .map_err(map_sql_error)?;

    Ok(())
}

fn map_job_row(row: &Row<'_>) -> rusqlite::Result<PublishJob> {
    let status: String = row.get(1)?;
    let ad_ids: String = row.get(4)?;
    let stage: Option<String> = row.get(6)?;
    let status_sync: Option<String> = row.get(7)?;

    Ok(PublishJob {
        campaign_id: row.get(0)?,
        status: parse_text(1, &status)?,
        external_campaign_id: row.get(2)?,
        external_adset_id: row.get(3)?,
        external_ad_ids: parse_json(4, &ad_ids)?,
        error_message: row.get(5)?,
        last_completed_stage: stage.as_deref().map(|s| parse_text::<PublishStage>(6, s)).transpose()?,
        status_sync: status_sync
            .as_deref()
            .map(|s| parse_json::<StatusSyncPlan>(7, s))
            .transpose()?,
        published_at: row.get::<_, Option<i64>>(8)?.map(|s| timestamp(8, s)).transpose()?,
        paused_at: row.get::<_, Option<i64>>(9)?.map(|s| timestamp(9, s)).transpose()?,
        updated_at: timestamp(10, row.get(10)?)?,
    })
}

fn parse_text<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|err: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

fn parse_json<T: serde::de::DeserializeOwned>(idx: usize, value: &str) -> rusqlite::Result<T> {
    serde_json::from_str(value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn timestamp(idx: usize, seconds: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {seconds}").into(),
        )
    })
}
