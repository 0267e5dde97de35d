//! # AdPublish App
//!
//! Application layer - composition root, commands and CLI entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Command functions behind the `adpublish` CLI
//! - Logging initialization and health reporting
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
