//! # AdPublish Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the ad platform, stores and log sink
//! - The publish orchestrator and its per-attempt logger
//! - Payload transforms for remote create calls
//!
//! ## Architecture Principles
//! - Only depends on `adpublish-common` and `adpublish-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod publish;

pub use publish::ports::{
    AdPlatform, ConfigStore, ConnectionStore, LogSink, PlatformResponse, PublishJobRepository,
};
pub use publish::{PublishLogger, PublishOrchestrator};
