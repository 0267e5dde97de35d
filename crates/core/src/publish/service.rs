//! Publish orchestration - core business logic
//!
//! Drives the create pipeline (campaign, ad set, ads) against the external
//! ad platform and the pause/resume lifecycle of published campaigns.
//!
//! Create stages are strictly sequential since each stage needs the id
//! produced by the previous one. After every confirmed stage (and after each
//! created ad) the job is checkpointed, so the stored ids always describe the
//! remote objects that exist. [`PublishOrchestrator::publish_campaign`]
//! restarts from the first stage; [`PublishOrchestrator::resume_publish`]
//! continues from the checkpoint.
//!
//! Nothing here takes a lock: concurrent calls for the same campaign race and
//! the last job write wins.

use std::sync::Arc;
use std::time::Instant;

use adpublish_domain::constants::DEFAULT_ACCOUNT_PREFIX;
use adpublish_domain::{
    ConnectionCredential, JsonObject, ObjectKind, PublishConfig, PublishError, PublishJob,
    PublishStage, PublishStatus, PublishStatusView, RemoteStatus, Result, StatusSyncPlan,
    SyncState,
};
use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::logger::PublishLogger;
use super::payload;
use super::ports::{AdPlatform, ConfigStore, ConnectionStore, LogSink, PublishJobRepository};

const METHOD_POST: &str = "POST";

/// Validated inputs for one create attempt
struct PublishPlan {
    token: String,
    account: String,
    campaign: JsonObject,
    adset: JsonObject,
    ads: Vec<JsonObject>,
}

/// Where a create attempt begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartPoint {
    Fresh,
    Checkpoint,
}

/// Publish orchestrator
pub struct PublishOrchestrator {
    platform: Arc<dyn AdPlatform>,
    connections: Arc<dyn ConnectionStore>,
    configs: Arc<dyn ConfigStore>,
    jobs: Arc<dyn PublishJobRepository>,
    log_sink: Arc<dyn LogSink>,
    account_prefix: String,
}

impl PublishOrchestrator {
    pub fn new(
        platform: Arc<dyn AdPlatform>,
        connections: Arc<dyn ConnectionStore>,
        configs: Arc<dyn ConfigStore>,
        jobs: Arc<dyn PublishJobRepository>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            platform,
            connections,
            configs,
            jobs,
            log_sink,
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
        }
    }

    /// Override the ad account prefix (default `act_`)
    pub fn with_account_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.account_prefix = prefix.into();
        self
    }

    /// New per-attempt logger bound to `campaign_id`.
    pub fn logger(&self, campaign_id: &str) -> PublishLogger {
        PublishLogger::new(Arc::clone(&self.log_sink), campaign_id)
    }

    /// Publish a campaign from the first stage.
    ///
    /// A retry after a partial failure creates new remote objects; the ones
    /// created by the earlier attempt are left in place.
    pub async fn publish_campaign(&self, campaign_id: &str) -> Result<PublishJob> {
        let logger = self.logger(campaign_id);
        self.publish_campaign_with_logger(campaign_id, &logger).await
    }

    pub async fn publish_campaign_with_logger(
        &self,
        campaign_id: &str,
        logger: &PublishLogger,
    ) -> Result<PublishJob> {
        self.run_publish(campaign_id, logger, StartPoint::Fresh).await
    }

    /// Continue an interrupted publish from its last checkpoint.
    ///
    /// Stored campaign and ad set ids are reused and ad creation picks up at
    /// the first ad without an id. Jobs that are already active or paused are
    /// returned unchanged; without a job this behaves like
    /// [`Self::publish_campaign`].
    pub async fn resume_publish(&self, campaign_id: &str) -> Result<PublishJob> {
        let logger = self.logger(campaign_id);
        self.resume_publish_with_logger(campaign_id, &logger).await
    }

    pub async fn resume_publish_with_logger(
        &self,
        campaign_id: &str,
        logger: &PublishLogger,
    ) -> Result<PublishJob> {
        if let Some(job) = self.jobs.get_job(campaign_id).await? {
            if matches!(job.status, PublishStatus::Active | PublishStatus::Paused) {
                logger.warning(
                    "publish already complete, nothing to resume",
                    json!({ "status": job.status.to_string() }),
                );
                return Ok(job);
            }
        }
        self.run_publish(campaign_id, logger, StartPoint::Checkpoint).await
    }

    /// Job joined with the campaign status mirror; `None` if never published.
    pub async fn get_publish_status(&self, campaign_id: &str) -> Result<Option<PublishStatusView>> {
        self.jobs.get_status_view(campaign_id).await
    }

    /// Set every remote object of a published campaign to `PAUSED`.
    pub async fn pause_published_campaign(&self, campaign_id: &str) -> Result<PublishJob> {
        let logger = self.logger(campaign_id);
        self.sync_remote_status(campaign_id, RemoteStatus::Paused, &logger).await
    }

    /// Set every remote object of a published campaign to `ACTIVE`.
    pub async fn resume_published_campaign(&self, campaign_id: &str) -> Result<PublishJob> {
        let logger = self.logger(campaign_id);
        self.sync_remote_status(campaign_id, RemoteStatus::Active, &logger).await
    }

    async fn run_publish(
        &self,
        campaign_id: &str,
        logger: &PublishLogger,
        start: StartPoint,
    ) -> Result<PublishJob> {
        info!(campaign_id, correlation_id = logger.correlation_id(), ?start, "starting publish");

        let plan = match self.prepare(campaign_id, logger).await {
            Ok(plan) => plan,
            Err(err) => {
                logger.failure("publish rejected before any remote call", &err);
                return Err(err);
            }
        };

        let mut job = match start {
            StartPoint::Fresh => PublishJob::placeholder(campaign_id, Utc::now()),
            StartPoint::Checkpoint => match self.jobs.get_job(campaign_id).await? {
                Some(existing) => {
                    if let Err(err) = check_checkpoint(&existing, &plan) {
                        logger.validation_failure(
                            "checkpoint does not match publish config",
                            json!({
                                "checkpoint_ads": existing.external_ad_ids.len(),
                                "config_ads": plan.ads.len(),
                            }),
                        );
                        logger.failure("publish rejected before any remote call", &err);
                        return Err(err);
                    }
                    resume_point(existing)
                }
                None => PublishJob::placeholder(campaign_id, Utc::now()),
            },
        };

        self.jobs.upsert_job(&job).await?;
        self.mirror_status(campaign_id, PublishStatus::Publishing, logger).await;

        match self.run_stages(&plan, &mut job, logger).await {
            Ok(()) => {
                let now = Utc::now();
                job.status = PublishStatus::Active;
                job.error_message = None;
                job.published_at = Some(now);
                job.paused_at = None;
                job.status_sync = None;
                job.updated_at = now;
                self.jobs.upsert_job(&job).await?;
                self.mirror_status(campaign_id, PublishStatus::Active, logger).await;

                logger.success(
                    "campaign published",
                    json!({
                        "external_campaign_id": job.external_campaign_id,
                        "external_adset_id": job.external_adset_id,
                        "external_ad_ids": job.external_ad_ids,
                    }),
                );
                Ok(job)
            }
            Err(err) => {
                job.status = PublishStatus::Error;
                job.error_message = Some(err.to_string());
                job.updated_at = Utc::now();
                if let Err(store_err) = self.jobs.upsert_job(&job).await {
                    logger.critical("failed to record publish error", &store_err);
                }
                self.mirror_status(campaign_id, PublishStatus::Error, logger).await;

                logger.failure("campaign publish failed", &err);
                Err(err)
            }
        }
    }

    /// Load and validate everything the stages need. No remote calls.
    async fn prepare(&self, campaign_id: &str, logger: &PublishLogger) -> Result<PublishPlan> {
        let raw = self
            .configs
            .get_publish_config_observed(campaign_id, logger.retry_listener())
            .await?
            .ok_or_else(|| {
                PublishError::Configuration(format!("no publish config for campaign {campaign_id}"))
            });
        let config = raw.and_then(PublishConfig::from_value).and_then(|config| {
            let adset = payload::adset_payload(&config.adset)?;
            Ok((config, adset))
        });
        let (config, adset) = match config {
            Ok(parts) => parts,
            Err(err) => {
                logger.validation_failure(
                    "invalid publish config",
                    json!({ "error": err.to_string() }),
                );
                return Err(err);
            }
        };

        let credential = self.credential(campaign_id).await?;
        let account =
            payload::normalize_account_id(&credential.ad_account_id, &self.account_prefix)?;

        Ok(PublishPlan {
            token: credential.bearer_token,
            account,
            campaign: payload::campaign_payload(&config.campaign),
            adset,
            ads: config.ads.iter().map(payload::ad_payload).collect(),
        })
    }

    async fn credential(&self, campaign_id: &str) -> Result<ConnectionCredential> {
        let credential =
            self.connections.get_connection_with_token(campaign_id).await?.ok_or_else(|| {
                PublishError::Connection(format!(
                    "no platform connection for campaign {campaign_id}"
                ))
            })?;
        if !credential.has_token() {
            return Err(PublishError::Connection("platform connection has no access token".into()));
        }
        Ok(credential)
    }

    async fn run_stages(
        &self,
        plan: &PublishPlan,
        job: &mut PublishJob,
        logger: &PublishLogger,
    ) -> Result<()> {
        let campaign_id = match completed_id(job, PublishStage::Campaign) {
            Some(id) => {
                logger.warning("reusing checkpointed campaign", json!({ "external_id": id }));
                id
            }
            None => {
                let stage = PublishStage::Campaign;
                logger.stage_start(stage.as_str(), json!({}));
                let path = payload::campaigns_path(&plan.account);
                let id = self.create_object(plan, &path, &plan.campaign, stage, logger).await?;
                job.external_campaign_id = Some(id.clone());
                self.checkpoint(job, stage).await?;
                logger.stage_complete(stage.as_str(), json!({ "external_id": id }));
                id
            }
        };

        let adset_id = match completed_id(job, PublishStage::AdSet) {
            Some(id) => {
                logger.warning("reusing checkpointed ad set", json!({ "external_id": id }));
                id
            }
            None => {
                let stage = PublishStage::AdSet;
                logger.stage_start(stage.as_str(), json!({ "campaign_id": campaign_id }));
                let body = payload::with_parent(&plan.adset, "campaign_id", &campaign_id);
                let path = payload::adsets_path(&plan.account);
                let id = self.create_object(plan, &path, &body, stage, logger).await?;
                job.external_adset_id = Some(id.clone());
                self.checkpoint(job, stage).await?;
                logger.stage_complete(stage.as_str(), json!({ "external_id": id }));
                id
            }
        };

        let stage = PublishStage::Ads;
        let already_created = job.external_ad_ids.len();
        logger.stage_start(
            stage.as_str(),
            json!({ "adset_id": adset_id, "total": plan.ads.len(), "existing": already_created }),
        );
        let path = payload::ads_path(&plan.account);
        for (index, ad) in plan.ads.iter().enumerate().skip(already_created) {
            let body = payload::with_parent(ad, "adset_id", &adset_id);
            let id = self.create_object(plan, &path, &body, stage, logger).await?;
            debug!(index, external_id = %id, "created ad");
            job.external_ad_ids.push(id);
            job.updated_at = Utc::now();
            self.jobs.upsert_job(job).await?;
        }
        self.checkpoint(job, stage).await?;
        logger.stage_complete(stage.as_str(), json!({ "external_ad_ids": job.external_ad_ids }));

        Ok(())
    }

    async fn create_object(
        &self,
        plan: &PublishPlan,
        path: &str,
        body: &JsonObject,
        stage: PublishStage,
        logger: &PublishLogger,
    ) -> Result<String> {
        let started = Instant::now();
        logger.api_call(stage.as_str(), METHOD_POST, path, &Value::Object(body.clone()));

        let response = match self.platform.post(&plan.token, path, body).await {
            Ok(response) => response,
            Err(err) => {
                let status = err.platform().and_then(|p| p.status);
                logger.api_response(
                    stage.as_str(),
                    METHOD_POST,
                    path,
                    status,
                    started.elapsed(),
                    json!({ "error": err.to_string() }),
                );
                logger.error(Some(stage.as_str()), "platform create call failed", &err);
                return Err(err);
            }
        };

        logger.api_response(
            stage.as_str(),
            METHOD_POST,
            path,
            Some(response.status),
            started.elapsed(),
            Value::Object(response.body.clone()),
        );
        payload::extract_id(&response.body, stage.as_str())
    }

    async fn checkpoint(&self, job: &mut PublishJob, stage: PublishStage) -> Result<()> {
        job.last_completed_stage = Some(stage);
        job.updated_at = Utc::now();
        self.jobs.upsert_job(job).await
    }

    /// Mirror writes are separate from job writes and never fail the caller.
    async fn mirror_status(&self, campaign_id: &str, status: PublishStatus, logger: &PublishLogger) {
        if let Err(err) = self.jobs.set_campaign_published_status(campaign_id, status).await {
            warn!(campaign_id, error = %err, "failed to update campaign status mirror");
            logger.warning(
                "campaign status mirror not updated",
                json!({ "status": status.to_string(), "error": err.to_string() }),
            );
        }
    }

    async fn sync_remote_status(
        &self,
        campaign_id: &str,
        target: RemoteStatus,
        logger: &PublishLogger,
    ) -> Result<PublishJob> {
        let Some(mut job) = self.jobs.get_job(campaign_id).await? else {
            let err =
                PublishError::NotPublished(format!("campaign {campaign_id} has no publish job"));
            logger.failure("status change rejected", &err);
            return Err(err);
        };

        let fresh_plan = match (job.status, job.published_ids()) {
            (PublishStatus::Active | PublishStatus::Paused, Some(ids)) => {
                StatusSyncPlan::new(target, ids.campaign_id, ids.adset_id, ids.ad_ids)
            }
            _ => {
                let err = PublishError::NotPublished(format!(
                    "campaign {campaign_id} has not completed publishing"
                ));
                logger.failure("status change rejected", &err);
                return Err(err);
            }
        };

        let credential = self.credential(campaign_id).await?;

        let mut plan = match job.status_sync.take() {
            Some(previous) if previous.is_resumable_for(target) => {
                let unconfirmed = previous.objects.len() - previous.count(SyncState::Applied);
                logger.warning(
                    "retrying unconfirmed objects from previous status change",
                    json!({ "unconfirmed": unconfirmed }),
                );
                previous
            }
            _ => fresh_plan,
        };

        let first_error = self.apply_plan(&mut plan, &credential.bearer_token, logger).await;

        if let Some(err) = first_error {
            job.status_sync = Some(plan);
            job.updated_at = Utc::now();
            self.jobs.upsert_job(&job).await?;
            logger.failure("status change partially applied", &err);
            return Err(err);
        }

        let now = Utc::now();
        job.status = target.local_status();
        job.paused_at = match target {
            RemoteStatus::Paused => Some(now),
            RemoteStatus::Active => None,
        };
        job.status_sync = None;
        job.updated_at = now;
        self.jobs.upsert_job(&job).await?;
        self.mirror_status(campaign_id, job.status, logger).await;

        logger.success(
            "campaign status changed",
            json!({ "status": job.status.to_string(), "objects": plan.objects.len() }),
        );
        Ok(job)
    }

    /// Campaign then ad set in order, then all ads concurrently. Returns the
    /// first failure, if any.
    async fn apply_plan(
        &self,
        plan: &mut StatusSyncPlan,
        token: &str,
        logger: &PublishLogger,
    ) -> Option<PublishError> {
        let body = payload::status_payload(plan.target);

        for object in plan.objects.iter_mut().filter(|o| o.kind != ObjectKind::Ad) {
            if object.is_confirmed() {
                continue;
            }
            match self.update_remote(&object.object_id, &body, token, logger).await {
                Ok(()) => object.mark_applied(),
                Err(err) => {
                    object.mark_failed(err.to_string());
                    return Some(err);
                }
            }
        }

        let pending: Vec<(usize, String)> = plan
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.kind == ObjectKind::Ad && !o.is_confirmed())
            .map(|(index, o)| (index, o.object_id.clone()))
            .collect();

        let results = join_all(
            pending
                .iter()
                .map(|(_, object_id)| self.update_remote(object_id, &body, token, logger)),
        )
        .await;

        let mut first_error = None;
        for ((index, _), result) in pending.into_iter().zip(results) {
            match result {
                Ok(()) => plan.objects[index].mark_applied(),
                Err(err) => {
                    plan.objects[index].mark_failed(err.to_string());
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error
    }

    async fn update_remote(
        &self,
        object_id: &str,
        body: &JsonObject,
        token: &str,
        logger: &PublishLogger,
    ) -> Result<()> {
        let started = Instant::now();
        let stage = "status";
        logger.api_call(stage, METHOD_POST, object_id, &Value::Object(body.clone()));

        match self.platform.post(token, object_id, body).await {
            Ok(response) => {
                logger.api_response(
                    stage,
                    METHOD_POST,
                    object_id,
                    Some(response.status),
                    started.elapsed(),
                    Value::Object(response.body),
                );
                Ok(())
            }
            Err(err) => {
                logger.api_response(
                    stage,
                    METHOD_POST,
                    object_id,
                    err.platform().and_then(|p| p.status),
                    started.elapsed(),
                    json!({ "error": err.to_string() }),
                );
                Err(err)
            }
        }
    }
}

/// Job state for a checkpoint resume: stale diagnostics cleared, ids kept.
/// A checkpoint can only be resumed while its created ads are still a prefix
/// of the configured ads.
fn check_checkpoint(job: &PublishJob, plan: &PublishPlan) -> Result<()> {
    if job.external_ad_ids.len() > plan.ads.len() {
        return Err(PublishError::Configuration(format!(
            "checkpoint holds {} ads but the config lists {}; publish from scratch",
            job.external_ad_ids.len(),
            plan.ads.len()
        )));
    }
    Ok(())
}

fn resume_point(mut job: PublishJob) -> PublishJob {
    job.status = PublishStatus::Publishing;
    job.error_message = None;
    job.status_sync = None;
    job.updated_at = Utc::now();
    job
}

/// Id recorded for `stage` if the checkpoint says it completed.
fn completed_id(job: &PublishJob, stage: PublishStage) -> Option<String> {
    if job.last_completed_stage? < stage {
        return None;
    }
    match stage {
        PublishStage::Campaign => job.external_campaign_id.clone(),
        PublishStage::AdSet => job.external_adset_id.clone(),
        PublishStage::Ads => None,
    }
}
