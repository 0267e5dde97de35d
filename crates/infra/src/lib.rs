//! # AdPublish Infrastructure
//!
//! Infrastructure implementations of core publish ports.
//!
//! This crate contains:
//! - SQLite persistence for publish jobs, configs, and connections
//! - HTTP client with retry, and the internal API client built on it
//! - The external ad platform client
//! - `tracing`-backed log sink and configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `adpublish-core`
//! - Contains all "impure" code (I/O, network, filesystem)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;
pub mod platform;

// Re-export commonly used items
pub use database::{DbManager, SqliteConfigStore, SqliteConnectionStore, SqlitePublishJobRepository};
pub use errors::InfraError;
pub use http::{HttpClient, InternalApiClient, InternalApiConfigStore};
pub use observability::TracingLogSink;
pub use platform::AdPlatformClient;
