//! Campaign publish orchestration

pub mod logger;
pub mod payload;
pub mod ports;
pub mod service;

pub use logger::{EventKind, PublishLogger};
pub use ports::{
    AdPlatform, ConfigStore, ConnectionStore, LogSink, PlatformResponse, PublishJobRepository,
};
pub use service::PublishOrchestrator;
