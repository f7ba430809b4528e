//! Seed the persistent store with the sample catalog.
//!
//! Without `--force` an already populated store is left untouched, matching
//! what the server does at startup.

use catalog_server::db::PostgresStore;
use catalog_server::store::ProductStore;
use catalog_server::store::seed::seed_catalog;

use super::{CommandError, connect};

/// Write the sample catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the insert fails.
pub async fn run(force: bool) -> Result<(), CommandError> {
    let store = PostgresStore::new(connect().await?);

    let existing = store.count().await?;
    if existing > 0 && !force {
        tracing::info!(existing, "Store already has products, skipping (use --force to insert anyway)");
        return Ok(());
    }

    let inserted = store.insert_many(seed_catalog()).await?;
    tracing::info!(inserted, total = existing + inserted, "Seeding complete!");
    Ok(())
}
