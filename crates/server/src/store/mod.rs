//! Product record stores.
//!
//! Two implementations share the [`ProductStore`] trait:
//!
//! - [`MemoryStore`] - in-process fallback, seeded at startup, lost on exit
//! - [`crate::db::products::PostgresStore`] - JSONB documents in `PostgreSQL`
//!
//! Both return normalized [`Product`] values, so callers never see which
//! store produced a record. Selection happens once, in
//! [`crate::services::data_source::DataSource::initialize`].

pub mod memory;
pub mod seed;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use catalog_core::{NewProduct, Product, ProductId, ProductPatch};

pub use memory::MemoryStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Which store is backing the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Database,
    Fallback,
}

impl StoreKind {
    /// Label reported to API clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record operations shared by every backing store.
///
/// Lookups by a well-formed but unknown ID return `Ok(None)`, never an error.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Which kind of store this is.
    fn kind(&self) -> StoreKind;

    /// Number of stored products.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Snapshot of all products, in insertion order.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Look up a single product.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Store a new product under a fresh identifier.
    async fn insert(&self, new: NewProduct) -> Result<Product, StoreError>;

    /// Store several products at once, returning how many were written.
    async fn insert_many(&self, items: Vec<NewProduct>) -> Result<u64, StoreError>;

    /// Replace the business fields of an existing product.
    async fn replace(&self, id: &ProductId, new: NewProduct)
    -> Result<Option<Product>, StoreError>;

    /// Apply the present fields of `patch` to an existing product.
    async fn patch(&self, id: &ProductId, patch: ProductPatch)
    -> Result<Option<Product>, StoreError>;

    /// Delete a product, returning what was deleted.
    async fn remove(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_kind_labels() {
        assert_eq!(StoreKind::Database.as_str(), "database");
        assert_eq!(StoreKind::Fallback.to_string(), "fallback");
        assert_eq!(
            serde_json::to_value(StoreKind::Fallback).ok(),
            Some(serde_json::json!("fallback"))
        );
    }
}
