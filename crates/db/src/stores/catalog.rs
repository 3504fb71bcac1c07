use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use blossom_core::{CatalogItem, CatalogStore, Category, ItemId, NewCatalogItem, StoreError};

use super::backend_error;
use crate::DbPool;

pub struct SqlCatalogStore {
    pool: DbPool,
}

impl SqlCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for SqlCatalogStore {
    async fn list_available(&self, category: Category) -> Result<Vec<CatalogItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, category, number, title, price, image_ref, available
             FROM catalog_item
             WHERE category = ? AND available = 1
             ORDER BY number ASC",
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.iter().map(item_from_row).collect()
    }

    async fn find(
        &self,
        category: Category,
        number: u32,
    ) -> Result<Option<CatalogItem>, StoreError> {
        let row = sqlx::query(
            "SELECT id, category, number, title, price, image_ref, available
             FROM catalog_item
             WHERE category = ? AND number = ?",
        )
        .bind(category.as_str())
        .bind(i64::from(number))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn insert(&self, item: NewCatalogItem) -> Result<CatalogItem, StoreError> {
        // Single statement; the unique index turns a lost race into a
        // constraint violation instead of a second row.
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO catalog_item (category, number, title, price, image_ref, available)
             VALUES (?, ?, ?, ?, ?, 1)
             RETURNING id",
        )
        .bind(item.category.as_str())
        .bind(i64::from(item.number))
        .bind(&item.title)
        .bind(item.price)
        .bind(&item.image_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey {
                category: item.category,
                number: item.number,
            },
            other => backend_error(other),
        })?;

        Ok(CatalogItem {
            id: ItemId(id),
            category: item.category,
            number: item.number,
            title: item.title,
            price: item.price,
            image_ref: item.image_ref,
            available: true,
        })
    }

    async fn set_availability(&self, id: ItemId, available: bool) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE catalog_item SET available = ? WHERE id = ?")
            .bind(i64::from(available))
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError> {
        // Category order is small < medium < large, not lexicographic.
        let rows = sqlx::query(
            "SELECT id, category, number, title, price, image_ref, available
             FROM catalog_item
             ORDER BY CASE category
                 WHEN 'small' THEN 0
                 WHEN 'medium' THEN 1
                 ELSE 2
             END ASC, number ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.iter().map(item_from_row).collect()
    }
}

pub(crate) fn item_from_row(row: &SqliteRow) -> Result<CatalogItem, StoreError> {
    let category: String = row.try_get("category").map_err(backend_error)?;
    let number: i64 = row.try_get("number").map_err(backend_error)?;

    Ok(CatalogItem {
        id: ItemId(row.try_get("id").map_err(backend_error)?),
        category: category
            .parse()
            .map_err(|error: blossom_core::domain::catalog::CategoryParseError| {
                StoreError::Backend(error.to_string())
            })?,
        number: u32::try_from(number)
            .map_err(|_| StoreError::Backend(format!("item number out of range: {number}")))?,
        title: row.try_get("title").map_err(backend_error)?,
        price: row.try_get("price").map_err(backend_error)?,
        image_ref: row.try_get("image_ref").map_err(backend_error)?,
        available: row.try_get::<i64, _>("available").map_err(backend_error)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use blossom_core::{CatalogStore, Category, ItemId, NewCatalogItem, StoreError};

    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::stores::SqlCatalogStore;

    async fn store() -> SqlCatalogStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        run_pending(&pool).await.expect("migrations");
        SqlCatalogStore::new(pool)
    }

    fn bouquet(category: Category, number: u32, price: i64) -> NewCatalogItem {
        NewCatalogItem {
            category,
            number,
            title: format!("Bouquet {number}"),
            price,
            image_ref: format!("file-{number}"),
        }
    }

    #[tokio::test]
    async fn insert_then_find_round_trips_all_fields() {
        let store = store().await;
        let inserted = store.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");

        let found = store.find(Category::Small, 1).await.expect("find");
        assert_eq!(found, Some(inserted));
        assert_eq!(store.find(Category::Small, 2).await.expect("find"), None);
    }

    #[tokio::test]
    async fn duplicate_key_is_reported_per_category() {
        let store = store().await;
        store.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");

        // Same number in another category is fine.
        store.insert(bouquet(Category::Large, 1, 90)).await.expect("insert");

        let error = store.insert(bouquet(Category::Small, 1, 50)).await.expect_err("duplicate");
        assert_eq!(error, StoreError::DuplicateKey { category: Category::Small, number: 1 });
    }

    #[tokio::test]
    async fn racing_inserts_admit_exactly_one_winner() {
        let store = Arc::new(store().await);

        let left = tokio::spawn({
            let store = store.clone();
            async move { store.insert(bouquet(Category::Medium, 7, 75)).await }
        });
        let right = tokio::spawn({
            let store = store.clone();
            async move { store.insert(bouquet(Category::Medium, 7, 80)).await }
        });

        let outcomes = [left.await.expect("join"), right.await.expect("join")];
        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|outcome| matches!(outcome, Err(StoreError::DuplicateKey { .. })))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn list_available_hides_out_of_stock_and_orders_by_number() {
        let store = store().await;
        store.insert(bouquet(Category::Small, 3, 50)).await.expect("insert");
        let hidden = store.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");
        store.insert(bouquet(Category::Small, 2, 48)).await.expect("insert");
        store.set_availability(hidden.id, false).await.expect("toggle off");

        let listed = store.list_available(Category::Small).await.expect("list");
        let numbers: Vec<u32> = listed.iter().map(|item| item.number).collect();
        assert_eq!(numbers, vec![2, 3]);

        assert!(store.list_available(Category::Large).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn set_availability_round_trips_and_reports_missing_rows() {
        let store = store().await;
        let item = store.insert(bouquet(Category::Medium, 4, 70)).await.expect("insert");

        store.set_availability(item.id, false).await.expect("off");
        assert!(store.list_available(Category::Medium).await.expect("list").is_empty());
        store.set_availability(item.id, true).await.expect("on");
        assert_eq!(store.list_available(Category::Medium).await.expect("list").len(), 1);

        let error = store.set_availability(ItemId(404), true).await.expect_err("missing");
        assert_eq!(error, StoreError::NotFound);
    }

    #[tokio::test]
    async fn list_all_includes_out_of_stock_items_grouped_by_category() {
        let store = store().await;
        store.insert(bouquet(Category::Large, 1, 90)).await.expect("insert");
        let hidden = store.insert(bouquet(Category::Small, 2, 48)).await.expect("insert");
        store.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");
        store.set_availability(hidden.id, false).await.expect("toggle off");

        let all = store.list_all().await.expect("list all");
        let keys: Vec<(Category, u32)> =
            all.iter().map(|item| (item.category, item.number)).collect();
        assert_eq!(
            keys,
            vec![(Category::Small, 1), (Category::Small, 2), (Category::Large, 1)]
        );
        assert!(!all[1].available);
    }
}
