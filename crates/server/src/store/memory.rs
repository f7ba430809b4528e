//! In-process fallback store.
//!
//! Products live in an ordered `Vec` and are found by linear scan. Each
//! operation takes the lock only for its own duration, so concurrent updates
//! to the same product are last-writer-wins.

use async_trait::async_trait;
use tokio::sync::RwLock;

use catalog_core::{NewProduct, Product, ProductId, ProductPatch};

use super::{ProductStore, StoreError, StoreKind};

/// Ordered in-memory product collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all products and load `items` under fresh identifiers.
    pub async fn reset(&self, items: Vec<NewProduct>) {
        let fresh: Vec<Product> = items
            .into_iter()
            .map(|new| Product::from_new(ProductId::generate(), new))
            .collect();
        *self.products.write().await = fresh;
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Fallback
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.products.read().await.len() as u64)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.clone())
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn insert(&self, new: NewProduct) -> Result<Product, StoreError> {
        let product = Product::from_new(ProductId::generate(), new);
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn insert_many(&self, items: Vec<NewProduct>) -> Result<u64, StoreError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.extend(
            items
                .into_iter()
                .map(|new| Product::from_new(ProductId::generate(), new)),
        );
        Ok((products.len() - before) as u64)
    }

    async fn replace(
        &self,
        id: &ProductId,
        new: NewProduct,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| &p.id == id).map(|product| {
            product.replace_with(new);
            product.clone()
        }))
    }

    async fn patch(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| &p.id == id).map(|product| {
            product.apply_patch(patch);
            product.clone()
        }))
    }

    async fn remove(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;
        let index = products.iter().position(|p| &p.id == id);
        Ok(index.map(|index| products.remove(index)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use catalog_core::Price;

    use super::*;
    use crate::store::seed::seed_catalog;

    fn mouse() -> NewProduct {
        NewProduct {
            name: "Mouse".to_string(),
            price: Price::from_units(25),
            color: "white".to_string(),
            description: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_reset_assigns_unique_ids() {
        let store = MemoryStore::new();
        store.reset(seed_catalog()).await;

        let products = store.list().await.unwrap();
        assert_eq!(products.len(), 10);
        let ids: HashSet<_> = products.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 10);
        assert!(products.iter().all(|p| !p.id.as_str().is_empty()));
    }

    #[tokio::test]
    async fn test_reset_discards_previous_contents() {
        let store = MemoryStore::new();
        store.insert(mouse()).await.unwrap();
        store.reset(seed_catalog()).await;
        assert_eq!(store.count().await.unwrap(), 10);
        assert!(store.list().await.unwrap().iter().all(|p| p.name != "Mouse"));
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let store = MemoryStore::new();
        let created = store.insert(mouse()).await.unwrap();
        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_insert_appends_in_order() {
        let store = MemoryStore::new();
        store.reset(seed_catalog()).await;
        let created = store.insert(mouse()).await.unwrap();
        let products = store.list().await.unwrap();
        assert_eq!(products.last(), Some(&created));
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(&ProductId::new("missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_patch_keeps_other_fields() {
        let store = MemoryStore::new();
        let created = store.insert(mouse()).await.unwrap();

        let patched = store
            .patch(
                &created.id,
                ProductPatch {
                    price: Some(Price::from_units(30)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(patched.price, Price::from_units(30));
        assert_eq!(patched.name, created.name);
        assert_eq!(patched.color, created.color);
        assert_eq!(store.get(&created.id).await.unwrap(), Some(patched));
    }

    #[tokio::test]
    async fn test_replace_unknown_is_none() {
        let store = MemoryStore::new();
        let result = store.replace(&ProductId::new("missing"), mouse()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_remove_then_get_is_none() {
        let store = MemoryStore::new();
        let created = store.insert(mouse()).await.unwrap();

        let removed = store.remove(&created.id).await.unwrap();
        assert_eq!(removed, Some(created.clone()));
        assert_eq!(store.get(&created.id).await.unwrap(), None);
        assert_eq!(store.remove(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_many_counts_written_items() {
        let store = MemoryStore::new();
        let written = store.insert_many(vec![mouse(), mouse()]).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
