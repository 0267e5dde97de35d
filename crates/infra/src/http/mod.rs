//! HTTP clients

pub mod client;
pub mod internal_api;

pub use client::{HttpClient, HttpClientBuilder, HttpRetryPredicate};
pub use internal_api::{InternalApiClient, InternalApiConfigStore};
