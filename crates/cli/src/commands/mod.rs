//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod status;

use catalog_server::config::{CatalogConfig, ConfigError};
use catalog_server::db;
use catalog_server::store::StoreError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors returned by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing environment variable: CATALOG_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Load configuration and connect to the configured database.
async fn connect() -> Result<PgPool, CommandError> {
    let config = CatalogConfig::from_env()?;
    let database_url = config
        .database_url
        .as_ref()
        .ok_or(CommandError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url, config.connect_timeout).await?;
    Ok(pool)
}
