//! Publish job state persisted per campaign

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status_sync::StatusSyncPlan;

/// Lifecycle status of a campaign's publish job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Unpublished,
    Publishing,
    Active,
    Paused,
    Error,
}

crate::impl_domain_status_conversions!(PublishStatus {
    Unpublished => "unpublished",
    Publishing => "publishing",
    Active => "active",
    Paused => "paused",
    Error => "error"
});

/// Ordered unit of the create pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStage {
    Campaign,
    AdSet,
    Ads,
}

crate::impl_domain_status_conversions!(PublishStage {
    Campaign => "campaign",
    AdSet => "adset",
    Ads => "ads"
});

/// One row per campaign; overwritten on every transition, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishJob {
    pub campaign_id: String,
    pub status: PublishStatus,
    /// `None` until Stage 1 confirms (the placeholder sentinel).
    pub external_campaign_id: Option<String>,
    pub external_adset_id: Option<String>,
    /// Index-aligned with the `ads` array of the publish config.
    pub external_ad_ids: Vec<String>,
    pub error_message: Option<String>,
    /// Last stage whose remote objects are confirmed to exist.
    pub last_completed_stage: Option<PublishStage>,
    /// Per-object progress of the latest pause/resume fan-out.
    pub status_sync: Option<StatusSyncPlan>,
    pub published_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl PublishJob {
    /// Placeholder written when a publish attempt starts.
    pub fn placeholder(campaign_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            status: PublishStatus::Publishing,
            external_campaign_id: None,
            external_adset_id: None,
            external_ad_ids: Vec::new(),
            error_message: None,
            last_completed_stage: None,
            status_sync: None,
            published_at: None,
            paused_at: None,
            updated_at: now,
        }
    }

    /// Remote identifiers, only when all three groups are populated.
    pub fn published_ids(&self) -> Option<PublishedIds<'_>> {
        let campaign_id = self.external_campaign_id.as_deref()?;
        let adset_id = self.external_adset_id.as_deref()?;
        if self.external_ad_ids.is_empty() {
            return None;
        }
        Some(PublishedIds { campaign_id, adset_id, ad_ids: &self.external_ad_ids })
    }
}

/// Borrowed view over a fully published job's remote identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedIds<'a> {
    pub campaign_id: &'a str,
    pub adset_id: &'a str,
    pub ad_ids: &'a [String],
}

/// Read projection joining the job with the campaign's status mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishStatusView {
    #[serde(flatten)]
    pub job: PublishJob,
    /// Denormalized `campaigns.published_status`; may lag the job row.
    pub campaign_published_status: Option<PublishStatus>,
}
