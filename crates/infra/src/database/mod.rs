//! SQLite persistence

pub mod config_repository;
pub mod connection_repository;
pub mod manager;
pub mod publish_job_repository;

pub use config_repository::SqliteConfigStore;
pub use connection_repository::SqliteConnectionStore;
pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use publish_job_repository::SqlitePublishJobRepository;
