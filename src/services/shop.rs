//! The operations the presentation layer calls into.
//!
//! `FlowerShop` owns the store handle and hands out the order workflow
//! entry points; menus and rendering stay on the other side of this line.

use std::sync::Arc;

use crate::domain::{Customer, Flower, NewCustomer, NewFlower, Order, OrderStatus};
use crate::error::ShopError;
use crate::ports::{FlowerSales, SalesSummary, ShopStore};
use crate::use_cases::{ChangeOrderStatus, OrderBuilder};

pub struct FlowerShop {
    store: Arc<dyn ShopStore>,
}

impl FlowerShop {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// The catalog as offered during order assembly: in-stock flowers only.
    pub async fn list_available_flowers(&self) -> Result<Vec<Flower>, ShopError> {
        let flowers = self.store.list_flowers().await?;
        Ok(flowers.into_iter().filter(|f| f.quantity > 0).collect())
    }

    pub async fn list_flowers(&self) -> Result<Vec<Flower>, ShopError> {
        Ok(self.store.list_flowers().await?)
    }

    pub async fn list_low_stock(&self) -> Result<Vec<Flower>, ShopError> {
        let flowers = self.store.list_flowers().await?;
        Ok(flowers.into_iter().filter(Flower::is_low_stock).collect())
    }

    pub async fn add_flower(&self, flower: NewFlower) -> Result<Flower, ShopError> {
        let flower = self.store.save_flower(flower).await?;
        tracing::info!(flower_id = flower.id, name = %flower.name, "flower added to catalog");
        Ok(flower)
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ShopError> {
        Ok(self.store.list_customers().await?)
    }

    pub async fn add_customer(&self, customer: NewCustomer) -> Result<Customer, ShopError> {
        let customer = self.store.save_customer(customer).await?;
        tracing::info!(customer_id = customer.id, name = %customer.name, "customer added");
        Ok(customer)
    }

    /// Start the order assembly workflow for a customer.
    pub async fn create_order(&self, customer_id: i64) -> Result<OrderBuilder, ShopError> {
        OrderBuilder::start(Arc::clone(&self.store), customer_id).await
    }

    /// Change a persisted order's status, adjusting stock per the
    /// transition table.
    pub async fn change_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Order, ShopError> {
        ChangeOrderStatus::new(Arc::clone(&self.store))
            .execute(order_id, status)
            .await
    }

    pub async fn get_order(&self, order_id: i64) -> Result<Order, ShopError> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(ShopError::NotFound {
                entity: "order",
                id: order_id,
            })
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, ShopError> {
        Ok(self.store.list_orders().await?)
    }

    pub async fn sales_summary(&self) -> Result<SalesSummary, ShopError> {
        Ok(self.store.sales_summary().await?)
    }

    pub async fn top_flowers(&self, limit: i64) -> Result<Vec<FlowerSales>, ShopError> {
        Ok(self.store.top_flowers(limit).await?)
    }
}
