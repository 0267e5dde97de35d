//! Publish lifecycle commands
//!
//! Thin wrappers over [`PublishOrchestrator`](adpublish_core::PublishOrchestrator)
//! that add command-level timing and outcome logging.

use std::future::Future;
use std::time::Instant;

use adpublish_domain::{PublishJob, PublishStatusView, Result as DomainResult};
use tracing::info;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Create the campaign, ad set and ads on the platform from the first stage.
pub async fn publish_campaign(ctx: &AppContext, campaign_id: &str) -> DomainResult<PublishJob> {
    run_command("publish::publish_campaign", campaign_id, || {
        ctx.orchestrator.publish_campaign(campaign_id)
    })
    .await
}

/// Continue a failed publish from its last checkpoint.
pub async fn resume_publish(ctx: &AppContext, campaign_id: &str) -> DomainResult<PublishJob> {
    run_command("publish::resume_publish", campaign_id, || {
        ctx.orchestrator.resume_publish(campaign_id)
    })
    .await
}

/// Pause every remote object of a published campaign.
pub async fn pause_campaign(ctx: &AppContext, campaign_id: &str) -> DomainResult<PublishJob> {
    run_command("publish::pause_campaign", campaign_id, || {
        ctx.orchestrator.pause_published_campaign(campaign_id)
    })
    .await
}

/// Reactivate every remote object of a paused campaign.
pub async fn resume_campaign(ctx: &AppContext, campaign_id: &str) -> DomainResult<PublishJob> {
    run_command("publish::resume_campaign", campaign_id, || {
        ctx.orchestrator.resume_published_campaign(campaign_id)
    })
    .await
}

pub async fn get_publish_status(
    ctx: &AppContext,
    campaign_id: &str,
) -> DomainResult<Option<PublishStatusView>> {
    run_command("publish::get_publish_status", campaign_id, || {
        ctx.orchestrator.get_publish_status(campaign_id)
    })
    .await
}

async fn run_command<T, F, Fut>(command: &str, campaign_id: &str, operation: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    info!(command, campaign_id, "executing command");

    let result = operation().await;

    log_command_execution(command, campaign_id, start.elapsed(), result.as_ref().err());
    result
}
