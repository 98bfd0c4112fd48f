//! The record-store boundary.
//!
//! The engine never talks to a database directly; it goes through
//! [`ShopStore`]. The two mutating order operations are the transaction
//! boundary: an implementation must persist the order rows and the stock
//! write-backs together or not at all.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Customer, Flower, NewCustomer, NewFlower, NewOrder, Order, OrderStatus};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Completed-sales aggregates for the reports surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub total_sales: BigDecimal,
    pub recent_sales: BigDecimal,
    pub completed_orders: i64,
}

/// One row of the top-selling-flowers report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowerSales {
    pub name: String,
    pub units_sold: i64,
    pub revenue: BigDecimal,
}

#[async_trait]
pub trait ShopStore: Send + Sync {
    async fn get_flower(&self, id: i64) -> Result<Option<Flower>, StoreError>;

    /// All flowers ordered by name.
    async fn list_flowers(&self) -> Result<Vec<Flower>, StoreError>;

    async fn save_flower(&self, flower: NewFlower) -> Result<Flower, StoreError>;

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StoreError>;

    /// All customers ordered by name.
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Fails with `Conflict` when the phone number is already taken.
    async fn save_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError>;

    /// An order with its items, or `None` for an unknown id.
    async fn get_order(&self, id: i64) -> Result<Option<Order>, StoreError>;

    /// All orders with their items, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Atomically persist a finished order, its items, and the stock
    /// write-backs produced by the inventory ledger.
    async fn insert_order(
        &self,
        order: NewOrder,
        stock_changes: &[Flower],
    ) -> Result<Order, StoreError>;

    /// Atomically persist a status change together with its stock
    /// write-backs.
    async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        stock_changes: &[Flower],
    ) -> Result<(), StoreError>;

    async fn sales_summary(&self) -> Result<SalesSummary, StoreError>;

    /// Top-selling flowers among completed orders, by units sold.
    async fn top_flowers(&self, limit: i64) -> Result<Vec<FlowerSales>, StoreError>;
}
