//! Per-object progress for pause/resume fan-out

use serde::{Deserialize, Serialize};

use super::publish::PublishStatus;

/// Delivery status set on remote objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemoteStatus {
    Active,
    Paused,
}

impl RemoteStatus {
    /// Wire value expected by the platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
        }
    }

    /// Local job status once every object reports this remote status.
    pub fn local_status(self) -> PublishStatus {
        match self {
            Self::Active => PublishStatus::Active,
            Self::Paused => PublishStatus::Paused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Campaign,
    AdSet,
    Ad,
}

crate::impl_domain_status_conversions!(ObjectKind {
    Campaign => "campaign",
    AdSet => "adset",
    Ad => "ad"
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Pending,
    Applied,
    Failed,
}

crate::impl_domain_status_conversions!(SyncState {
    Pending => "pending",
    Applied => "applied",
    Failed => "failed"
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSync {
    pub object_id: String,
    pub kind: ObjectKind,
    pub state: SyncState,
    pub error: Option<String>,
}

impl ObjectSync {
    fn pending(object_id: &str, kind: ObjectKind) -> Self {
        Self { object_id: object_id.to_string(), kind, state: SyncState::Pending, error: None }
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == SyncState::Applied
    }

    pub fn mark_applied(&mut self) {
        self.state = SyncState::Applied;
        self.error = None;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.state = SyncState::Failed;
        self.error = Some(error.into());
    }
}

/// Status change applied to campaign, ad set, and every ad.
///
/// Objects are ordered campaign, ad set, then ads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSyncPlan {
    pub target: RemoteStatus,
    pub objects: Vec<ObjectSync>,
}

impl StatusSyncPlan {
    pub fn new(target: RemoteStatus, campaign_id: &str, adset_id: &str, ad_ids: &[String]) -> Self {
        let mut objects = Vec::with_capacity(ad_ids.len() + 2);
        objects.push(ObjectSync::pending(campaign_id, ObjectKind::Campaign));
        objects.push(ObjectSync::pending(adset_id, ObjectKind::AdSet));
        objects.extend(ad_ids.iter().map(|id| ObjectSync::pending(id, ObjectKind::Ad)));
        Self { target, objects }
    }

    pub fn is_complete(&self) -> bool {
        self.objects.iter().all(ObjectSync::is_confirmed)
    }

    /// Whether a new call with `target` should only retry what is unconfirmed.
    pub fn is_resumable_for(&self, target: RemoteStatus) -> bool {
        self.target == target && !self.is_complete()
    }

    pub fn first_failure(&self) -> Option<&ObjectSync> {
        self.objects.iter().find(|object| object.state == SyncState::Failed)
    }

    pub fn count(&self, state: SyncState) -> usize {
        self.objects.iter().filter(|object| object.state == state).count()
    }
}
