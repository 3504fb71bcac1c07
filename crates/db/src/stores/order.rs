use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use blossom_core::{
    NewOrder, Order, OrderId, OrderStatus, OrderStore, OrderSummary, StoreError, UserId,
};

use super::backend_error;
use crate::DbPool;

pub struct SqlOrderStore {
    pool: DbPool,
}

impl SqlOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for SqlOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError> {
        let id = OrderId::generate();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO customer_order
                 (id, user_id, item_id, address, delivery_time, status, total, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id.0)
        .bind(order.user_id.0)
        .bind(order.item_id.0)
        .bind(&order.address)
        .bind(&order.delivery_time)
        .bind(OrderStatus::PendingPayment.as_str())
        .bind(order.total)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound,
            other => backend_error(other),
        })?;

        Ok(Order {
            id,
            user_id: order.user_id,
            item_id: order.item_id,
            address: order.address,
            delivery_time: order.delivery_time,
            status: OrderStatus::PendingPayment,
            total: order.total,
            created_at,
        })
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, StoreError> {
        // rowid breaks created_at ties in insertion order, so bursts of
        // orders placed in the same instant still list newest-first.
        let rows = sqlx::query(
            "SELECT o.id, o.status, o.total, o.created_at, b.title, b.category, b.number
             FROM customer_order o
             JOIN catalog_item b ON b.id = o.item_id
             WHERE o.user_id = ?
             ORDER BY o.created_at DESC, o.rowid DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.iter().map(summary_from_row).collect()
    }
}

fn summary_from_row(row: &SqliteRow) -> Result<OrderSummary, StoreError> {
    let status: String = row.try_get("status").map_err(backend_error)?;
    let category: String = row.try_get("category").map_err(backend_error)?;
    let created_at: String = row.try_get("created_at").map_err(backend_error)?;
    let number: i64 = row.try_get("number").map_err(backend_error)?;

    Ok(OrderSummary {
        id: OrderId(row.try_get("id").map_err(backend_error)?),
        status: status
            .parse()
            .map_err(|error: blossom_core::domain::order::OrderStatusParseError| {
                StoreError::Backend(error.to_string())
            })?,
        total: row.try_get("total").map_err(backend_error)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|stamp| stamp.with_timezone(&Utc))
            .map_err(|error| StoreError::Backend(format!("bad created_at timestamp: {error}")))?,
        item_title: row.try_get("title").map_err(backend_error)?,
        item_category: category
            .parse()
            .map_err(|error: blossom_core::domain::catalog::CategoryParseError| {
                StoreError::Backend(error.to_string())
            })?,
        item_number: u32::try_from(number)
            .map_err(|_| StoreError::Backend(format!("item number out of range: {number}")))?,
    })
}
