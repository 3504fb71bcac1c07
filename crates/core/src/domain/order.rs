use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::catalog::{Category, ItemId};
use super::UserId;

/// Short opaque order token shown to the user in confirmations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    /// First eight hex characters of a v4 UUID. Collisions are acceptable
    /// at flower-shop order volumes; the primary key constraint catches
    /// the astronomically unlucky case.
    pub fn generate() -> Self {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(8);
        Self(token)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::Paid => "paid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PendingPayment => "awaiting payment",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown order status `{0}`")]
pub struct OrderStatusParseError(pub String);

impl FromStr for OrderStatus {
    type Err = OrderStatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            other => Err(OrderStatusParseError(other.to_owned())),
        }
    }
}

/// A placed order. Immutable after creation; `total` is the item price
/// captured by value when the order was placed, so later catalog price
/// changes never alter existing orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub address: String,
    pub delivery_time: String,
    pub status: OrderStatus,
    pub total: i64,
    pub created_at: DateTime<Utc>,
}

/// Creation payload. Identity, status, and timestamp are assigned by the
/// store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub total: i64,
    pub address: String,
    pub delivery_time: String,
}

/// An order row joined with the referenced item's display fields, as used
/// by the order listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: i64,
    pub created_at: DateTime<Utc>,
    pub item_title: String,
    pub item_category: Category,
    pub item_number: u32,
}
