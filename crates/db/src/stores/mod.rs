//! SQL implementations of the core store ports. Constraint semantics live
//! in the schema: the unique index on (category, number) arbitrates racing
//! catalog inserts, and the foreign key on orders enforces item existence.

use blossom_core::StoreError;

pub mod catalog;
pub mod order;

pub use catalog::SqlCatalogStore;
pub use order::SqlOrderStore;

pub(crate) fn backend_error(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}
