//! In-memory store implementations used by engine tests and local
//! experiments. The SQL implementations in `blossom-db` are the production
//! path; these mirror their contracts, including insert atomicity.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::catalog::{CatalogItem, Category, ItemId, NewCatalogItem};
use crate::domain::order::{NewOrder, Order, OrderId, OrderStatus, OrderSummary};
use crate::domain::UserId;

use super::{CatalogStore, OrderStore, StoreError};

#[derive(Default)]
struct CatalogInner {
    items: Vec<CatalogItem>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<CatalogInner>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixture helper for tests that need to observe price capture; not
    /// part of the store contract (catalog items are never edited).
    pub async fn set_price(&self, id: ItemId, price: i64) -> bool {
        let mut inner = self.inner.write().await;
        match inner.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.price = price;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_available(&self, category: Category) -> Result<Vec<CatalogItem>, StoreError> {
        let inner = self.inner.read().await;
        let mut items: Vec<CatalogItem> = inner
            .items
            .iter()
            .filter(|item| item.category == category && item.available)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.number);
        Ok(items)
    }

    async fn find(
        &self,
        category: Category,
        number: u32,
    ) -> Result<Option<CatalogItem>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .iter()
            .find(|item| item.category == category && item.number == number)
            .cloned())
    }

    async fn insert(&self, item: NewCatalogItem) -> Result<CatalogItem, StoreError> {
        // Check-and-insert under one write guard; the lock plays the role
        // of the SQL unique index.
        let mut inner = self.inner.write().await;
        if inner
            .items
            .iter()
            .any(|existing| existing.category == item.category && existing.number == item.number)
        {
            return Err(StoreError::DuplicateKey {
                category: item.category,
                number: item.number,
            });
        }

        inner.next_id += 1;
        let stored = CatalogItem {
            id: ItemId(inner.next_id),
            category: item.category,
            number: item.number,
            title: item.title,
            price: item.price,
            image_ref: item.image_ref,
            available: true,
        };
        inner.items.push(stored.clone());
        Ok(stored)
    }

    async fn set_availability(&self, id: ItemId, available: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.available = available;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let inner = self.inner.read().await;
        let mut items = inner.items.clone();
        items.sort_by_key(|item| (item.category, item.number));
        Ok(items)
    }
}

pub struct InMemoryOrderStore {
    catalog: Arc<InMemoryCatalogStore>,
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new(catalog: Arc<InMemoryCatalogStore>) -> Self {
        Self { catalog, orders: RwLock::new(Vec::new()) }
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError> {
        let item_exists = {
            let catalog = self.catalog.inner.read().await;
            catalog.items.iter().any(|item| item.id == order.item_id)
        };
        if !item_exists {
            return Err(StoreError::NotFound);
        }

        let stored = Order {
            id: OrderId::generate(),
            user_id: order.user_id,
            item_id: order.item_id,
            address: order.address,
            delivery_time: order.delivery_time,
            status: OrderStatus::PendingPayment,
            total: order.total,
            created_at: Utc::now(),
        };
        self.orders.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, StoreError> {
        let orders = self.orders.read().await;
        let catalog = self.catalog.inner.read().await;

        // Reverse before the stable sort so equal timestamps come back in
        // latest-inserted-first order, matching the SQL tiebreak.
        let mut rows: Vec<&Order> =
            orders.iter().filter(|order| order.user_id == user_id).rev().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        rows.into_iter()
            .map(|order| {
                let item = catalog
                    .items
                    .iter()
                    .find(|item| item.id == order.item_id)
                    .ok_or(StoreError::NotFound)?;
                Ok(OrderSummary {
                    id: order.id.clone(),
                    status: order.status,
                    total: order.total,
                    created_at: order.created_at,
                    item_title: item.title.clone(),
                    item_category: item.category,
                    item_number: item.number,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::catalog::{Category, ItemId, NewCatalogItem};
    use crate::domain::order::{NewOrder, OrderStatus};
    use crate::domain::UserId;
    use crate::store::{CatalogStore, InMemoryCatalogStore, InMemoryOrderStore, OrderStore, StoreError};

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
    async fn insert_then_find_returns_the_item() {
        let store = InMemoryCatalogStore::new();
        let inserted = store.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");

        let found = store.find(Category::Small, 1).await.expect("find");
        assert_eq!(found, Some(inserted));
    }

    #[tokio::test]
    async fn duplicate_insert_fails_even_for_unavailable_items() {
        let store = InMemoryCatalogStore::new();
        let first = store.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");
        store.set_availability(first.id, false).await.expect("toggle off");

        let error = store.insert(bouquet(Category::Small, 1, 60)).await.expect_err("duplicate");
        assert_eq!(error, StoreError::DuplicateKey { category: Category::Small, number: 1 });
    }

    #[tokio::test]
    async fn racing_inserts_produce_exactly_one_winner() {
        let store = Arc::new(InMemoryCatalogStore::new());

        let left = tokio::spawn({
            let store = store.clone();
            async move { store.insert(bouquet(Category::Medium, 7, 75)).await }
        });
        let right = tokio::spawn({
            let store = store.clone();
            async move { store.insert(bouquet(Category::Medium, 7, 80)).await }
        });

        let outcomes = [left.await.expect("join"), right.await.expect("join")];
        let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let duplicates = outcomes
            .iter()
            .filter(|outcome| {
                matches!(outcome, Err(StoreError::DuplicateKey { number: 7, .. }))
            })
            .count();

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 1);
    }

    #[tokio::test]
    async fn list_available_filters_and_orders_by_number() {
        let store = InMemoryCatalogStore::new();
        store.insert(bouquet(Category::Small, 3, 50)).await.expect("insert");
        let hidden = store.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");
        store.insert(bouquet(Category::Small, 2, 48)).await.expect("insert");
        store.insert(bouquet(Category::Large, 1, 90)).await.expect("insert");
        store.set_availability(hidden.id, false).await.expect("toggle off");

        let listed = store.list_available(Category::Small).await.expect("list");
        let numbers: Vec<u32> = listed.iter().map(|item| item.number).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[tokio::test]
    async fn set_availability_reports_missing_items() {
        let store = InMemoryCatalogStore::new();
        let error = store.set_availability(ItemId(404), false).await.expect_err("missing");
        assert_eq!(error, StoreError::NotFound);
    }

    #[tokio::test]
    async fn order_creation_requires_an_existing_item() {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let orders = InMemoryOrderStore::new(catalog);

        let error = orders
            .create(NewOrder {
                user_id: UserId(1),
                item_id: ItemId(99),
                total: 45,
                address: "1 Rose Lane".to_owned(),
                delivery_time: "18:30".to_owned(),
            })
            .await
            .expect_err("missing item");
        assert_eq!(error, StoreError::NotFound);
    }

    #[tokio::test]
    async fn orders_list_newest_first_with_item_fields() {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let item = catalog.insert(bouquet(Category::Small, 1, 45)).await.expect("insert");
        let orders = InMemoryOrderStore::new(catalog);

        for sequence in 0..3 {
            orders
                .create(NewOrder {
                    user_id: UserId(5),
                    item_id: item.id,
                    total: 45,
                    address: format!("{sequence} Rose Lane"),
                    delivery_time: "18:30".to_owned(),
                })
                .await
                .expect("create");
        }

        let listed = orders.list_by_user(UserId(5)).await.expect("list");
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].item_title, "Bouquet 1");
        assert_eq!(listed[0].status, OrderStatus::PendingPayment);
        assert!(listed.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));

        assert!(orders.list_by_user(UserId(6)).await.expect("list").is_empty());
    }
}
