use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;

/// A persisted line item. Owned by its order; never deleted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub flower_id: i64,
    pub quantity: i64,
}

/// A persisted order with its items.
///
/// `total` always equals the sum of `quantity * unit price` over the items;
/// the builder maintains it during assembly and item composition is frozen
/// once the order is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A line item on an order that has not been committed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub flower_id: i64,
    pub quantity: i64,
}

/// An order under assembly, before the store has assigned ids.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub status: OrderStatus,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(customer_id: i64) -> Self {
        Self {
            customer_id,
            status: OrderStatus::Pending,
            total: BigDecimal::from(0),
            created_at: Utc::now(),
            items: Vec::new(),
        }
    }
}
