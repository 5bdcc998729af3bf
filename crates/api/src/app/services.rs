//! Store and engine wiring shared by every handler.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use skyyard_infra::{
    InMemoryPermissionStore, PermissionStore, PolicyAdmin, PolicyEngine, PostgresPermissionStore,
};

use crate::config::AppConfig;

pub type DynStore = Arc<dyn PermissionStore>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid DATABASE_URL: {0}")]
    DatabaseUrl(#[source] sqlx::Error),
}

pub struct AppServices {
    pub engine: PolicyEngine<DynStore>,
    pub admin: PolicyAdmin<DynStore>,
}

impl AppServices {
    pub fn new(store: DynStore, config: &AppConfig) -> Self {
        Self {
            engine: PolicyEngine::with_config(store.clone(), config.engine_config()),
            admin: PolicyAdmin::new(store),
        }
    }
}

/// Pick the store from config and try to seed it once up front.
///
/// A database that is down at startup does not stop the process: the pool
/// connects lazily, and decisions fall back to the built-in matrix until the
/// store answers.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let store: DynStore = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(config.lookup_timeout.unwrap_or(Duration::from_secs(30)))
                .connect_lazy(url)
                .map_err(StartupError::DatabaseUrl)?;

            let store = PostgresPermissionStore::new(pool);
            if let Err(err) = store.migrate().await {
                tracing::warn!(
                    error = %err,
                    "policy_permissions migration failed; will retry seeding on demand"
                );
            }
            tracing::info!(
                max_connections = config.db_max_connections,
                "using postgres permission store"
            );
            Arc::new(store)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory permission store");
            InMemoryPermissionStore::arc()
        }
    };

    let services = AppServices::new(store, config);
    if let Err(err) = services.engine.ensure_initialized().await {
        tracing::warn!(error = %err, "initial policy seed failed; first decision will retry");
    }
    Ok(services)
}
