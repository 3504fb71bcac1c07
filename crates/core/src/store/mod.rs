use async_trait::async_trait;
use thiserror::Error;

use crate::domain::catalog::{CatalogItem, Category, ItemId, NewCatalogItem};
use crate::domain::order::{NewOrder, Order, OrderSummary};
use crate::domain::UserId;

pub mod memory;

pub use memory::{InMemoryCatalogStore, InMemoryOrderStore};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("an item numbered {number} already exists in the {category} category")]
    DuplicateKey { category: Category, number: u32 },
    #[error("no record matched the requested identity")]
    NotFound,
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Persisted bouquet records, keyed by (category, number).
///
/// `insert` must be atomic: a unique constraint on (category, number)
/// decides the winner when two inserts race, and exactly one caller
/// receives `DuplicateKey`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// In-stock items for one category, ordered by number ascending.
    /// An empty result is not an error.
    async fn list_available(&self, category: Category) -> Result<Vec<CatalogItem>, StoreError>;

    async fn find(&self, category: Category, number: u32)
        -> Result<Option<CatalogItem>, StoreError>;

    async fn insert(&self, item: NewCatalogItem) -> Result<CatalogItem, StoreError>;

    async fn set_availability(&self, id: ItemId, available: bool) -> Result<(), StoreError>;

    /// Every item, in and out of stock, ordered by (category, number).
    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError>;
}

/// Persisted order records. Creation assigns identity, timestamp, and the
/// initial `pending_payment` status; each call is independent and there is
/// no dedup across calls.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fails with `NotFound` when the referenced catalog item does not
    /// exist.
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Newest-first, joined with the referenced item's display fields.
    /// Callers truncate to their own display limit.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, StoreError>;
}
