use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A catalog flower with its on-hand stock.
///
/// `quantity` is only ever mutated through the inventory ledger on behalf of
/// an order status transition; catalog management owns the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    pub id: i64,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i64,
    pub category: String,
    pub low_stock_threshold: i64,
}

impl Flower {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.low_stock_threshold
    }
}

/// A flower that has not been persisted yet; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewFlower {
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i64,
    pub category: String,
    pub low_stock_threshold: i64,
}
