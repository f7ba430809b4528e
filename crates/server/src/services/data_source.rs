//! Data source facade.
//!
//! Callers see one set of product operations whichever store is active. The
//! active store is chosen once by [`DataSource::initialize`]: the persistent
//! store when it is configured and answers, the in-process fallback otherwise.
//! There is no automatic switch back once the fallback has been selected.
//!
//! Removing or replacing a locally uploaded image deletes the old file here,
//! not in the stores, so both stores behave the same.

use std::sync::Arc;

use tracing::instrument;

use catalog_core::{NewProduct, Product, ProductId, ProductPatch};

use super::uploads::UploadStore;
use crate::store::seed::seed_catalog;
use crate::store::{MemoryStore, ProductStore, StoreError, StoreKind};

/// Facade over the persistent and fallback product stores.
#[derive(Clone)]
pub struct DataSource {
    fallback: Arc<MemoryStore>,
    persistent: Option<Arc<dyn ProductStore>>,
    active: Arc<dyn ProductStore>,
    uploads: UploadStore,
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("source", &self.source())
            .field("persistent_configured", &self.persistent.is_some())
            .field("uploads", &self.uploads)
            .finish_non_exhaustive()
    }
}

impl DataSource {
    /// Create a facade. Until [`Self::initialize`] runs, the empty fallback
    /// store is active.
    #[must_use]
    pub fn new(persistent: Option<Arc<dyn ProductStore>>, uploads: UploadStore) -> Self {
        let fallback = Arc::new(MemoryStore::new());
        Self {
            active: fallback.clone(),
            fallback,
            persistent,
            uploads,
        }
    }

    /// Seed the fallback store and select the active store.
    ///
    /// The fallback store is reset to the sample catalog on every call. When
    /// `prefer_persistent` is set and a persistent store is configured, it is
    /// seeded if empty and becomes active; any failure there is logged and the
    /// fallback store is used instead.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self, prefer_persistent: bool) -> StoreKind {
        self.fallback.reset(seed_catalog()).await;
        self.active = self.fallback.clone();

        if prefer_persistent && let Some(persistent) = &self.persistent {
            match seed_if_empty(persistent.as_ref()).await {
                Ok(seeded) => {
                    if seeded > 0 {
                        tracing::info!(seeded, "Seeded empty persistent store");
                    }
                    self.active = persistent.clone();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Persistent store unavailable, using fallback store");
                }
            }
        }

        let source = self.source();
        tracing::info!(%source, "Data source initialized");
        source
    }

    /// Which store is serving requests.
    #[must_use]
    pub fn source(&self) -> StoreKind {
        self.active.kind()
    }

    /// True when the persistent store is active.
    #[must_use]
    pub fn is_using_persistent_store(&self) -> bool {
        self.source() == StoreKind::Database
    }

    /// Whether the active store currently answers queries.
    pub async fn is_ready(&self) -> bool {
        self.active.count().await.is_ok()
    }

    /// All products from the active store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails.
    pub async fn get_all(&self) -> Result<Vec<Product>, StoreError> {
        self.active.list().await
    }

    /// A single product, or `None` if no product has this ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails.
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.active.get(id).await
    }

    /// Store a new product under a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store write fails.
    pub async fn create(&self, new: NewProduct) -> Result<Product, StoreError> {
        self.active.insert(new).await
    }

    /// Replace a product's business fields.
    ///
    /// Without a new image the current one is kept. A replaced local upload is
    /// deleted in the background.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails.
    pub async fn replace(
        &self,
        id: &ProductId,
        new: NewProduct,
    ) -> Result<Option<Product>, StoreError> {
        let previous = self.previous_if_image_changes(id, new.image_url.as_deref()).await?;
        let updated = self.active.replace(id, new).await?;
        self.cleanup_replaced_image(previous.as_ref(), updated.as_ref());
        Ok(updated)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails.
    pub async fn patch(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let previous = self
            .previous_if_image_changes(id, patch.image_url.as_deref())
            .await?;
        let updated = self.active.patch(id, patch).await?;
        self.cleanup_replaced_image(previous.as_ref(), updated.as_ref());
        Ok(updated)
    }

    /// Delete a product and return it. Its local upload, if any, is deleted
    /// in the background.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails.
    pub async fn remove(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let removed = self.active.remove(id).await?;
        if let Some(url) = removed
            .as_ref()
            .filter(|p| p.has_local_upload())
            .and_then(|p| p.image_url.as_deref())
        {
            self.uploads.remove_detached(url);
        }
        Ok(removed)
    }

    /// The current record, fetched only when an update brings a new image.
    async fn previous_if_image_changes(
        &self,
        id: &ProductId,
        new_image: Option<&str>,
    ) -> Result<Option<Product>, StoreError> {
        match new_image {
            Some(url) if !url.is_empty() => self.active.get(id).await,
            _ => Ok(None),
        }
    }

    fn cleanup_replaced_image(&self, previous: Option<&Product>, updated: Option<&Product>) {
        let (Some(previous), Some(updated)) = (previous, updated) else {
            return;
        };
        if previous.has_local_upload()
            && previous.image_url != updated.image_url
            && let Some(url) = previous.image_url.as_deref()
        {
            self.uploads.remove_detached(url);
        }
    }
}

async fn seed_if_empty(store: &dyn ProductStore) -> Result<u64, StoreError> {
    if store.count().await? > 0 {
        return Ok(0);
    }
    store.insert_many(seed_catalog()).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use catalog_core::Price;

    use super::*;

    /// Persistent store whose backend is never reachable.
    struct UnreachableStore;

    #[async_trait]
    impl ProductStore for UnreachableStore {
        fn kind(&self) -> StoreKind {
            StoreKind::Database
        }

        async fn count(&self) -> Result<u64, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list(&self) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn get(&self, _id: &ProductId) -> Result<Option<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn insert(&self, _new: NewProduct) -> Result<Product, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn insert_many(&self, _items: Vec<NewProduct>) -> Result<u64, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn replace(
            &self,
            _id: &ProductId,
            _new: NewProduct,
        ) -> Result<Option<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn patch(
            &self,
            _id: &ProductId,
            _patch: ProductPatch,
        ) -> Result<Option<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn remove(&self, _id: &ProductId) -> Result<Option<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    async fn fallback_source() -> (DataSource, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::open(dir.path()).await.unwrap();
        let mut source = DataSource::new(None, uploads);
        source.initialize(false).await;
        (source, dir)
    }

    fn mouse(image_url: Option<String>) -> NewProduct {
        NewProduct {
            name: "Mouse".to_string(),
            price: Price::from_units(25),
            color: "white".to_string(),
            description: None,
            image_url,
        }
    }

    async fn wait_until_removed(path: &Path) -> bool {
        for _ in 0..100 {
            if !path.exists() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        !path.exists()
    }

    #[tokio::test]
    async fn test_initialize_without_persistent_uses_fallback() {
        let (source, _dir) = fallback_source().await;

        assert_eq!(source.source(), StoreKind::Fallback);
        assert!(!source.is_using_persistent_store());

        let products = source.get_all().await.unwrap();
        assert_eq!(products.len(), 10);
        let ids: HashSet<_> = products.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.iter().all(|id| !id.as_str().is_empty()));
    }

    #[tokio::test]
    async fn test_initialize_falls_back_when_persistent_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::open(dir.path()).await.unwrap();
        let mut source = DataSource::new(Some(Arc::new(UnreachableStore)), uploads);

        let kind = source.initialize(true).await;
        assert_eq!(kind, StoreKind::Fallback);
        assert_eq!(source.get_all().await.unwrap().len(), 10);
        assert!(source.is_ready().await);
    }

    #[tokio::test]
    async fn test_initialize_not_preferring_persistent_skips_it() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::open(dir.path()).await.unwrap();
        let mut source = DataSource::new(Some(Arc::new(MemoryStore::new())), uploads);

        assert_eq!(source.initialize(false).await, StoreKind::Fallback);
    }

    #[tokio::test]
    async fn test_initialize_seeds_empty_persistent_store() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::open(dir.path()).await.unwrap();
        let persistent = Arc::new(MemoryStore::new());
        let mut source = DataSource::new(Some(persistent.clone()), uploads);

        source.initialize(true).await;
        assert_eq!(persistent.count().await.unwrap(), 10);

        // A populated store is left alone.
        source.initialize(true).await;
        assert_eq!(persistent.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_reinitialize_reseeds_fallback() {
        let (mut source, _dir) = fallback_source().await;
        let created = source.create(mouse(None)).await.unwrap();
        assert_eq!(source.get_all().await.unwrap().len(), 11);

        source.initialize(false).await;
        assert_eq!(source.get_all().await.unwrap().len(), 10);
        assert_eq!(source.get_by_id(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_then_get_by_id() {
        let (source, _dir) = fallback_source().await;
        let created = source.create(mouse(None)).await.unwrap();

        assert!(!created.id.as_str().is_empty());
        assert_eq!(created.image_url, None);
        assert_eq!(source.get_by_id(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_remove_then_get_is_none() {
        let (source, _dir) = fallback_source().await;
        let first = source.get_all().await.unwrap().remove(0);

        let removed = source.remove(&first.id).await.unwrap();
        assert_eq!(removed, Some(first.clone()));
        assert_eq!(source.get_by_id(&first.id).await.unwrap(), None);
        assert_eq!(source.remove(&first.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_patch_changes_only_given_field() {
        let (source, _dir) = fallback_source().await;
        let original = source.get_all().await.unwrap().remove(0);

        let patched = source
            .patch(
                &original.id,
                ProductPatch {
                    color: Some("red".to_string()),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(patched.color, "red");
        assert_eq!(patched.name, original.name);
        assert_eq!(patched.price, original.price);
        assert_eq!(patched.description, original.description);
        assert_eq!(patched.id, original.id);
    }

    #[tokio::test]
    async fn test_replace_without_image_keeps_existing() {
        let (source, _dir) = fallback_source().await;
        let created = source
            .create(mouse(Some("https://cdn.example.com/mouse.png".to_string())))
            .await
            .unwrap();

        let mut replacement = mouse(None);
        replacement.name = "Trackball".to_string();
        let replaced = source.replace(&created.id, replacement).await.unwrap().unwrap();

        assert_eq!(replaced.name, "Trackball");
        assert_eq!(replaced.image_url, created.image_url);
    }

    #[tokio::test]
    async fn test_replacing_local_upload_deletes_old_file() {
        let (source, dir) = fallback_source().await;
        let old_url = source.uploads.save("old.png", b"old").await.unwrap();
        let old_path = source.uploads.path_for(&old_url).unwrap();
        assert!(old_path.starts_with(dir.path()));

        let created = source.create(mouse(Some(old_url))).await.unwrap();
        let new_url = source.uploads.save("new.png", b"new").await.unwrap();

        let replaced = source
            .replace(&created.id, mouse(Some(new_url.clone())))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(replaced.image_url.as_deref(), Some(new_url.as_str()));
        assert!(wait_until_removed(&old_path).await);
        assert!(source.uploads.path_for(&new_url).unwrap().exists());
    }

    #[tokio::test]
    async fn test_patching_local_upload_deletes_old_file() {
        let (source, _dir) = fallback_source().await;
        let old_url = source.uploads.save("old.png", b"old").await.unwrap();
        let old_path = source.uploads.path_for(&old_url).unwrap();
        let created = source.create(mouse(Some(old_url))).await.unwrap();

        source
            .patch(
                &created.id,
                ProductPatch {
                    image_url: Some("https://cdn.example.com/new.png".to_string()),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(wait_until_removed(&old_path).await);
    }

    #[tokio::test]
    async fn test_remove_deletes_local_upload() {
        let (source, _dir) = fallback_source().await;
        let url = source.uploads.save("gone.png", b"bytes").await.unwrap();
        let path = source.uploads.path_for(&url).unwrap();
        let created = source.create(mouse(Some(url))).await.unwrap();

        source.remove(&created.id).await.unwrap();
        assert!(wait_until_removed(&path).await);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::open(dir.path()).await.unwrap();
        let mut source = DataSource::new(Some(Arc::new(UnreachableStore)), uploads);
        source.initialize(true).await;

        // Forced onto the unreachable store to exercise error propagation.
        source.active = Arc::new(UnreachableStore);
        assert!(source.get_all().await.is_err());
        assert!(!source.is_ready().await);
        assert!(source.is_using_persistent_store());
    }
}
