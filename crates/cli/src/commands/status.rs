//! Persistent store status.

use catalog_server::db::PostgresStore;
use catalog_server::store::ProductStore;

use super::{CommandError, connect};

/// Report connectivity and the number of stored products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the count fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    tracing::info!("Database reachable");

    let applied = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(&pool)
        .await;

    let store = PostgresStore::new(pool);
    let products = store.count().await?;

    tracing::info!("Catalog Status");
    tracing::info!("==============");
    tracing::info!("Migrations applied: {}", migrations_label(applied));
    tracing::info!("Products: {products}");
    Ok(())
}

/// Render the applied-migration count, or "unknown" when it cannot be read
/// (for example before the first `migrate`).
fn migrations_label(applied: Result<i64, sqlx::Error>) -> String {
    match applied {
        Ok(count) => count.to_string(),
        Err(e) => {
            tracing::warn!("Could not read migration history: {e}");
            "unknown".to_string()
        }
    }
}
