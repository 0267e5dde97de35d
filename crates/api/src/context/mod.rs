//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use adpublish_common::resilience::RetryPolicy;
use adpublish_core::{ConfigStore, PublishOrchestrator};
use adpublish_domain::{AppConfig, PublishError, Result, RetrySettings};
use adpublish_infra::{
    AdPlatformClient, DbManager, HttpClient, InternalApiClient, InternalApiConfigStore,
    SqliteConfigStore, SqliteConnectionStore, SqlitePublishJobRepository, TracingLogSink,
};
use tracing::info;

use crate::utils::health::{ComponentHealth, HealthStatus};

const USER_AGENT: &str = concat!("adpublish/", env!("CARGO_PKG_VERSION"));

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub db: Arc<DbManager>,
    pub orchestrator: Arc<PublishOrchestrator>,
    /// Local config table; also the publish config source unless the internal
    /// API is configured.
    pub local_configs: Arc<SqliteConfigStore>,
    pub connections: Arc<SqliteConnectionStore>,
    pub internal_api: Option<InternalApiClient>,
}

impl AppContext {
    /// Validate `config`, open the database, run migrations and wire the
    /// publish orchestrator.
    pub async fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        let migrate_db = Arc::clone(&db);
        tokio::task::spawn_blocking(move || migrate_db.run_migrations())
            .await
            .map_err(|err| PublishError::Internal(format!("migration task failed: {err}")))??;

        let http = HttpClient::builder()
            .retry_policy(retry_policy(&config.retry)?)
            .user_agent(USER_AGENT)
            .build()?;

        let platform = AdPlatformClient::new(http.clone(), &config.platform);
        let local_configs = Arc::new(SqliteConfigStore::new(Arc::clone(&db)));
        let connections = Arc::new(SqliteConnectionStore::new(Arc::clone(&db)));
        let jobs = Arc::new(SqlitePublishJobRepository::new(Arc::clone(&db)));

        let internal_api =
            config.internal_api.base_url.as_ref().map(|url| InternalApiClient::new(http, url));

        let config_source: Arc<dyn ConfigStore> = match &internal_api {
            Some(client) => {
                info!(base_url = client.base_url(), "publish configs served by internal API");
                Arc::new(InternalApiConfigStore::new(client.clone()))
            }
            None => local_configs.clone(),
        };

        let orchestrator = PublishOrchestrator::new(
            Arc::new(platform),
            connections.clone(),
            config_source,
            jobs,
            Arc::new(TracingLogSink::new()),
        )
        .with_account_prefix(config.platform.account_prefix.clone());

        info!(
            db_path = %config.database.path,
            api_version = %config.platform.api_version,
            "application context initialised"
        );

        Ok(Self {
            config,
            db,
            orchestrator: Arc::new(orchestrator),
            local_configs,
            connections,
            internal_api,
        })
    }

    /// Check database connectivity and, when configured, internal API reach.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new().add_component(self.check_database_health().await);

        if let Some(client) = &self.internal_api {
            let component = match client.get_json("health").await {
                Ok(_) => ComponentHealth::healthy("internal_api"),
                Err(err) => ComponentHealth::unhealthy("internal_api", err.to_string()),
            };
            status = status.add_component(component);
        }

        status.calculate_score();
        status
    }

    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);
        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(err)) => ComponentHealth::unhealthy("database", err.to_string()),
            Err(err) => ComponentHealth::unhealthy("database", format!("health task failed: {err}")),
        }
    }
}

fn retry_policy(settings: &RetrySettings) -> Result<RetryPolicy> {
    RetryPolicy::builder()
        .max_attempts(settings.max_attempts)
        .base_delay(Duration::from_millis(settings.base_delay_ms))
        .max_delay(Duration::from_millis(settings.max_delay_ms))
        .jitter_ratio(settings.jitter_ratio)
        .build()
        .map_err(PublishError::Configuration)
}
