//! External ad platform adapter

pub mod client;

pub use client::AdPlatformClient;
