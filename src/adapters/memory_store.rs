//! In-process implementation of ShopStore.
//!
//! Backs the integration tests so the whole engine runs without a database.
//! Each operation takes the single table lock, validates everything it is
//! about to write, and only then mutates, so a failed operation leaves the
//! tables exactly as they were.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    Customer, Flower, NewCustomer, NewFlower, NewOrder, Order, OrderItem, OrderStatus,
};
use crate::ports::{FlowerSales, SalesSummary, ShopStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    flowers: BTreeMap<i64, Flower>,
    customers: BTreeMap<i64, Customer>,
    orders: BTreeMap<i64, Order>,
    next_flower_id: i64,
    next_customer_id: i64,
    next_order_id: i64,
    next_item_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn get_flower(&self, id: i64) -> Result<Option<Flower>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.flowers.get(&id).cloned())
    }

    async fn list_flowers(&self) -> Result<Vec<Flower>, StoreError> {
        let tables = self.tables.lock().await;
        let mut flowers: Vec<Flower> = tables.flowers.values().cloned().collect();
        flowers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(flowers)
    }

    async fn save_flower(&self, flower: NewFlower) -> Result<Flower, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.next_flower_id += 1;
        let flower = Flower {
            id: tables.next_flower_id,
            name: flower.name,
            price: flower.price,
            quantity: flower.quantity,
            category: flower.category,
            low_stock_threshold: flower.low_stock_threshold,
        };
        tables.flowers.insert(flower.id, flower.clone());
        Ok(flower)
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.customers.get(&id).cloned())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let tables = self.tables.lock().await;
        let mut customers: Vec<Customer> = tables.customers.values().cloned().collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn save_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.customers.values().any(|c| c.phone == customer.phone) {
            return Err(StoreError::Conflict(format!(
                "phone {} already registered",
                customer.phone
            )));
        }
        tables.next_customer_id += 1;
        let customer = Customer {
            id: tables.next_customer_id,
            name: customer.name,
            phone: customer.phone,
            email: customer.email,
        };
        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn insert_order(
        &self,
        order: NewOrder,
        stock_changes: &[Flower],
    ) -> Result<Order, StoreError> {
        let mut tables = self.tables.lock().await;

        // Validate every write before applying any of them.
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(StoreError::Conflict(format!(
                "customer {} disappeared during commit",
                order.customer_id
            )));
        }
        for item in &order.items {
            if !tables.flowers.contains_key(&item.flower_id) {
                return Err(StoreError::Conflict(format!(
                    "flower {} disappeared during commit",
                    item.flower_id
                )));
            }
        }
        for flower in stock_changes {
            if !tables.flowers.contains_key(&flower.id) {
                return Err(StoreError::Conflict(format!(
                    "flower {} disappeared during commit",
                    flower.id
                )));
            }
            if flower.quantity < 0 {
                return Err(StoreError::Conflict(format!(
                    "negative stock for flower {}",
                    flower.id
                )));
            }
        }

        tables.next_order_id += 1;
        let order_id = tables.next_order_id;
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            tables.next_item_id += 1;
            items.push(OrderItem {
                id: tables.next_item_id,
                order_id,
                flower_id: item.flower_id,
                quantity: item.quantity,
            });
        }
        let order = Order {
            id: order_id,
            customer_id: order.customer_id,
            status: order.status,
            total: order.total,
            created_at: order.created_at,
            items,
        };
        tables.orders.insert(order.id, order.clone());
        for flower in stock_changes {
            tables.flowers.insert(flower.id, flower.clone());
        }
        Ok(order)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        stock_changes: &[Flower],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;

        if !tables.orders.contains_key(&order_id) {
            return Err(StoreError::Conflict(format!(
                "order {order_id} disappeared during commit"
            )));
        }
        for flower in stock_changes {
            if !tables.flowers.contains_key(&flower.id) {
                return Err(StoreError::Conflict(format!(
                    "flower {} disappeared during commit",
                    flower.id
                )));
            }
            if flower.quantity < 0 {
                return Err(StoreError::Conflict(format!(
                    "negative stock for flower {}",
                    flower.id
                )));
            }
        }

        if let Some(order) = tables.orders.get_mut(&order_id) {
            order.status = status;
        }
        for flower in stock_changes {
            tables.flowers.insert(flower.id, flower.clone());
        }
        Ok(())
    }

    async fn sales_summary(&self) -> Result<SalesSummary, StoreError> {
        let tables = self.tables.lock().await;
        let completed = || {
            tables
                .orders
                .values()
                .filter(|o| o.status == OrderStatus::Completed)
        };

        let total_sales = completed().fold(BigDecimal::from(0), |acc, o| acc + &o.total);
        let cutoff = Utc::now() - Duration::days(7);
        let recent_sales = completed()
            .filter(|o| o.created_at >= cutoff)
            .fold(BigDecimal::from(0), |acc, o| acc + &o.total);
        let completed_orders = completed().count() as i64;

        Ok(SalesSummary {
            total_sales,
            recent_sales,
            completed_orders,
        })
    }

    async fn top_flowers(&self, limit: i64) -> Result<Vec<FlowerSales>, StoreError> {
        let tables = self.tables.lock().await;
        let mut by_flower: BTreeMap<i64, (i64, BigDecimal)> = BTreeMap::new();
        for order in tables.orders.values() {
            if order.status != OrderStatus::Completed {
                continue;
            }
            for item in &order.items {
                let price = match tables.flowers.get(&item.flower_id) {
                    Some(flower) => flower.price.clone(),
                    None => continue,
                };
                let entry = by_flower
                    .entry(item.flower_id)
                    .or_insert_with(|| (0, BigDecimal::from(0)));
                entry.0 += item.quantity;
                entry.1 += price * BigDecimal::from(item.quantity);
            }
        }

        let mut sales: Vec<FlowerSales> = by_flower
            .into_iter()
            .filter_map(|(flower_id, (units_sold, revenue))| {
                tables.flowers.get(&flower_id).map(|f| FlowerSales {
                    name: f.name.clone(),
                    units_sold,
                    revenue,
                })
            })
            .collect();
        sales.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
        sales.truncate(limit.max(0) as usize);
        Ok(sales)
    }
}
