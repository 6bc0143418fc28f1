use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::anquettes::services::AnquetteService;
use crate::config::{AppConfig, StorageBackend};
use crate::store::{MemoryStore, SqliteStore, Store};
use crate::users::services::UserService;

/// Everything a handler needs, wired once at startup: store → services.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
    pub anquettes: AnquetteService,
}

impl AppState {
    /// Open the configured backend and create its schema. A schema failure
    /// is returned to `main`, which aborts startup.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        match config.backend {
            StorageBackend::Sqlite => {
                let store = Arc::new(SqliteStore::connect(&config.database).await?);
                Self::from_store(store, config).await
            }
            StorageBackend::Memory => {
                info!("using in-memory storage; data is lost on exit");
                Self::from_store(Arc::new(MemoryStore::new()), config).await
            }
        }
    }

    pub async fn from_store<S>(store: Arc<S>, config: Arc<AppConfig>) -> anyhow::Result<Self>
    where
        S: Store + 'static,
    {
        store.create_schema().await.context("create tables")?;
        Ok(Self {
            config,
            users: UserService::new(store.clone()),
            anquettes: AnquetteService::new(store),
        })
    }

    #[cfg(test)]
    pub async fn in_memory() -> Self {
        use crate::config::DatabaseConfig;

        let config = Arc::new(AppConfig {
            backend: StorageBackend::Memory,
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
                max_connections: 1,
                query_timeout_secs: 5,
            },
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_store(Arc::new(MemoryStore::new()), config)
            .await
            .expect("memory store never fails schema creation")
    }
}
