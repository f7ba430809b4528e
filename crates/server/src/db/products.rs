//! Persistent product store backed by `PostgreSQL` JSONB documents.
//!
//! Each product is a row in `catalog.products` whose `document` column holds
//! `{name, price, color, description?, imageUrl?}`. The row's `BIGSERIAL` key
//! becomes the product ID. Every operation is a single statement; shape checks
//! on write are left to the table's `CHECK` constraints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;

use catalog_core::{NewProduct, Price, Product, ProductId, ProductPatch};

use crate::store::{ProductStore, StoreError, StoreKind};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    document: serde_json::Value,
}

/// Stored document shape. Absent optionals are omitted rather than `null`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    name: String,
    price: Price,
    color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl From<NewProduct> for ProductDocument {
    fn from(new: NewProduct) -> Self {
        Self {
            name: new.name,
            price: new.price,
            color: new.color,
            description: new.description,
            image_url: new.image_url,
        }
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let document: ProductDocument = serde_json::from_value(row.document).map_err(|e| {
            StoreError::DataCorruption(format!("invalid product document {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::from(row.id),
            name: document.name,
            price: document.price,
            color: document.color,
            description: document.description.filter(|d| !d.is_empty()),
            image_url: document.image_url.filter(|u| !u.is_empty()),
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// Product store for `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Database
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog.products")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, document
            FROM catalog.products
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        // IDs this store never issued cannot match a row.
        let Some(key) = id.as_i64() else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, document
            FROM catalog.products
            WHERE id = $1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO catalog.products (document)
            VALUES ($1::jsonb)
            RETURNING id, document
            ",
        )
        .bind(Json(ProductDocument::from(new)))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn insert_many(&self, items: Vec<NewProduct>) -> Result<u64, StoreError> {
        let documents: Vec<ProductDocument> = items.into_iter().map(Into::into).collect();

        let result = sqlx::query(
            r"
            INSERT INTO catalog.products (document)
            SELECT value FROM jsonb_array_elements($1::jsonb)
            ",
        )
        .bind(Json(documents))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn replace(
        &self,
        id: &ProductId,
        new: NewProduct,
    ) -> Result<Option<Product>, StoreError> {
        let Some(key) = id.as_i64() else {
            return Ok(None);
        };

        // The existing image survives unless the new document carries one.
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE catalog.products
            SET document = jsonb_build_object('imageUrl', COALESCE(document->'imageUrl', '""'::jsonb))
                           || $2::jsonb,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, document
            "#,
        )
        .bind(key)
        .bind(Json(ProductDocument::from(new)))
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn patch(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let Some(key) = id.as_i64() else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE catalog.products
            SET document = document || $2::jsonb,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, document
            ",
        )
        .bind(key)
        .bind(Json(patch))
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn remove(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let Some(key) = id.as_i64() else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            DELETE FROM catalog.products
            WHERE id = $1
            RETURNING id, document
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::seed::seed_catalog;

    #[test]
    fn test_row_maps_native_key_to_string_id() {
        let row = ProductRow {
            id: 7,
            document: json!({
                "name": "HomePod",
                "price": 299,
                "color": "white"
            }),
        };
        let product = Product::try_from(row).unwrap();
        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.description, None);
        assert_eq!(product.image_url, None);
    }

    #[test]
    fn test_row_defaults_empty_optionals() {
        let row = ProductRow {
            id: 8,
            document: json!({
                "name": "HomePod",
                "price": 299,
                "color": "white",
                "description": "",
                "imageUrl": ""
            }),
        };
        let product = Product::try_from(row).unwrap();
        assert_eq!(product.description, None);
        assert_eq!(product.image_url, None);
    }

    #[test]
    fn test_row_with_bad_document_is_corruption() {
        let row = ProductRow {
            id: 9,
            document: json!({ "name": 12 }),
        };
        assert!(matches!(
            Product::try_from(row),
            Err(StoreError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_document_omits_absent_optionals() {
        let document = ProductDocument::from(NewProduct {
            name: "Mouse".to_string(),
            price: Price::from_units(25),
            color: "white".to_string(),
            description: None,
            image_url: None,
        });
        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({ "name": "Mouse", "price": 25, "color": "white" })
        );
    }

    // =========================================================================
    // Database tests (need a PostgreSQL server, run with `-- --ignored`)
    // =========================================================================

    fn mouse() -> NewProduct {
        NewProduct {
            name: "Mouse".to_string(),
            price: Price::from_units(25),
            color: "white".to_string(),
            description: Some("Wireless".to_string()),
            image_url: Some("/uploads/1700000000000-mouse.png".to_string()),
        }
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_replace_keeps_image_and_clears_description(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let created = store.insert(mouse()).await.unwrap();

        let replaced = store
            .replace(
                &created.id,
                NewProduct {
                    name: "Trackball".to_string(),
                    price: Price::from_units(40),
                    color: "grey".to_string(),
                    description: None,
                    image_url: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.name, "Trackball");
        assert_eq!(replaced.description, None);
        assert_eq!(replaced.image_url, created.image_url);
        assert_eq!(store.get(&created.id).await.unwrap(), Some(replaced));
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_replace_with_new_image(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let created = store.insert(mouse()).await.unwrap();

        let mut new = mouse();
        new.image_url = Some("/uploads/1700000000001-new.png".to_string());
        let replaced = store.replace(&created.id, new).await.unwrap().unwrap();

        assert_eq!(
            replaced.image_url.as_deref(),
            Some("/uploads/1700000000001-new.png")
        );
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_patch_changes_only_given_fields(pool: PgPool) {
        let store = PostgresStore::new(pool);
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
        assert_eq!(patched.description, created.description);
        assert_eq!(patched.image_url, created.image_url);
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_insert_many_then_count(pool: PgPool) {
        let store = PostgresStore::new(pool);
        assert_eq!(store.count().await.unwrap(), 0);

        let seed = seed_catalog();
        let expected = seed.len() as u64;
        assert_eq!(store.insert_many(seed).await.unwrap(), expected);
        assert_eq!(store.count().await.unwrap(), expected);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len() as u64, expected);
        assert!(listed.iter().all(|p| p.id.as_i64().is_some()));
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_foreign_id_is_not_found(pool: PgPool) {
        let store = PostgresStore::new(pool);
        store.insert(mouse()).await.unwrap();

        let foreign = ProductId::new("3f1c2a4e-8b7d-4c1e-9f0a-6d5b4c3a2e1f");
        assert_eq!(store.get(&foreign).await.unwrap(), None);
        assert_eq!(store.replace(&foreign, mouse()).await.unwrap(), None);
        assert_eq!(
            store.patch(&foreign, ProductPatch::default()).await.unwrap(),
            None
        );
        assert_eq!(store.remove(&foreign).await.unwrap(), None);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_check_constraint_rejects_empty_name(pool: PgPool) {
        let store = PostgresStore::new(pool);

        let mut new = mouse();
        new.name = String::new();
        let err = store.insert(new).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Database(sqlx::Error::Database(ref db)) if db.is_check_violation()
        ));

        let created = store.insert(mouse()).await.unwrap();
        let err = store
            .patch(
                &created.id,
                ProductPatch {
                    name: Some(String::new()),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
