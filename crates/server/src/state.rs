//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::CatalogConfig;
use crate::db::{self, PostgresStore};
use crate::services::{DataSource, UploadError, UploadStore};
use crate::store::{ProductStore, StoreKind};

/// Error building the application state.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to prepare uploads directory: {0}")]
    Uploads(#[from] UploadError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the data source facade.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CatalogConfig,
    data_source: DataSource,
    uploads: UploadStore,
}

impl AppState {
    /// Create application state from an initialized data source.
    #[must_use]
    pub fn new(config: CatalogConfig, data_source: DataSource, uploads: UploadStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                data_source,
                uploads,
            }),
        }
    }

    /// Connect to the configured stores and select the active one.
    ///
    /// A missing, unreachable or unmigrated database is not an error here:
    /// the data source falls back to the in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError` if the uploads directory cannot be created.
    pub async fn bootstrap(config: CatalogConfig) -> Result<Self, BootstrapError> {
        let uploads = UploadStore::open(config.uploads_dir()).await?;
        let persistent = connect_persistent(&config).await;

        let prefer_persistent = persistent.is_some();
        let mut data_source = DataSource::new(persistent, uploads.clone());
        data_source.initialize(prefer_persistent).await;

        Ok(Self::new(config, data_source, uploads))
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    /// Get a reference to the data source facade.
    #[must_use]
    pub fn data_source(&self) -> &DataSource {
        &self.inner.data_source
    }

    /// Get a reference to the upload storage.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }

    /// Hostname reported in API responses.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.inner.config.hostname
    }

    /// Active store label reported in API responses.
    #[must_use]
    pub fn source(&self) -> StoreKind {
        self.inner.data_source.source()
    }
}

async fn connect_persistent(config: &CatalogConfig) -> Option<Arc<dyn ProductStore>> {
    let Some(database_url) = &config.database_url else {
        tracing::info!("No database configured, using in-memory store");
        return None;
    };

    let pool = match db::create_pool(database_url, config.connect_timeout).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                timeout_secs = config.connect_timeout.as_secs(),
                "Database connection failed, using in-memory store"
            );
            return None;
        }
    };
    tracing::info!("Database connection established");

    if config.auto_migrate {
        if let Err(e) = db::migrate(&pool).await {
            tracing::warn!(error = %e, "Database migration failed, using in-memory store");
            return None;
        }
        tracing::info!("Database migrations applied");
    }

    Some(Arc::new(PostgresStore::new(pool)))
}
