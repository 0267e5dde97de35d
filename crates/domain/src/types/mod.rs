//! Domain types for publish orchestration

pub mod connection;
pub mod publish;
pub mod publish_config;
pub mod status_sync;

pub use connection::ConnectionCredential;
pub use publish::{PublishJob, PublishStage, PublishStatus, PublishStatusView, PublishedIds};
pub use publish_config::{JsonObject, PublishConfig};
pub use status_sync::{ObjectKind, ObjectSync, RemoteStatus, StatusSyncPlan, SyncState};
