//! Application state: explicitly constructed adapters and services.
//!
//! One hot adapter, one cold adapter, one metadata index and one identity
//! store are built at startup and injected into the services that need them.
//! Nothing here is a process-wide singleton; tests build their own state
//! over in-memory backends.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::identity::memory::MemoryIdentityStore;
use crate::identity::pg::PgIdentityStore;
use crate::identity::IdentityStore;
use crate::index::memory::MemoryMetadataIndex;
use crate::index::pg::PgMetadataIndex;
use crate::index::MetadataIndex;
use crate::services::accounts::AccountService;
use crate::services::grants::GrantService;
use crate::services::migration::MigrationEngine;
use crate::storage::fs::FsObjectStore;
use crate::storage::ObjectStore;

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityStore>,
    pub hot: Arc<dyn ObjectStore>,
    pub cold: Arc<dyn ObjectStore>,
    pub index: Arc<dyn MetadataIndex>,
    pub engine: Arc<MigrationEngine>,
    pub accounts: Arc<AccountService>,
    pub grants: Arc<GrantService>,
}

impl AppState {
    /// Build the application state from configuration. With `DATABASE_URL`
    /// set, the identity store and metadata index are Postgres-backed;
    /// without it they fall back to in-memory backends (dev and test runs).
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let (identity, index): (Arc<dyn IdentityStore>, Arc<dyn MetadataIndex>) =
            match std::env::var("DATABASE_URL") {
                Ok(url) => {
                    let pool = sqlx::postgres::PgPoolOptions::new()
                        .max_connections(10)
                        .connect(&url)
                        .await?;
                    let identity = PgIdentityStore::new(pool.clone());
                    identity.ensure_schema().await?;
                    let index = PgMetadataIndex::new(pool);
                    index.ensure_schema().await?;
                    tracing::info!("identity store and metadata index: postgres");
                    (Arc::new(identity), Arc::new(index))
                }
                Err(_) => {
                    tracing::info!("DATABASE_URL not set; using in-memory identity and index");
                    (
                        Arc::new(MemoryIdentityStore::new()),
                        Arc::new(MemoryMetadataIndex::new()),
                    )
                }
            };

        let hot: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&config.storage.hot_root));
        let cold: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&config.storage.cold_root));

        let engine = Arc::new(MigrationEngine::new(
            hot.clone(),
            cold.clone(),
            index.clone(),
            &config.storage.staging_dir,
            &config.storage.cold_bucket,
        ));
        let accounts =
            Arc::new(AccountService::new(identity.clone(), config.identity.list_page_size));
        let grants = Arc::new(GrantService::new(
            identity.clone(),
            config.security.bootstrap_admin_emails.clone(),
        ));

        Ok(Self { identity, hot, cold, index, engine, accounts, grants })
    }
}
