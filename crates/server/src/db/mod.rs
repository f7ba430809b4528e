//! Database operations for the persistent product store.
//!
//! # Schema: `catalog`
//!
//! ## Tables
//!
//! - `products` - One JSONB document per product, keyed by `BIGSERIAL`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p catalog-cli -- migrate
//! ```
//! or at startup when `CATALOG_AUTO_MIGRATE=true`.

pub mod products;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub use products::PostgresStore;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool.
///
/// The whole attempt, including the first connection, is bounded by
/// `connect_timeout`.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established in time.
pub async fn create_pool(
    database_url: &SecretString,
    connect_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let connect = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(connect_timeout)
        .connect(database_url.expose_secret());

    tokio::time::timeout(connect_timeout, connect)
        .await
        .map_err(|_| sqlx::Error::PoolTimedOut)?
}

/// Run embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
