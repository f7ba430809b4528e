//! Database migration command.
//!
//! Migrations are embedded from `crates/server/migrations/`.

use catalog_server::db;

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running catalog migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
