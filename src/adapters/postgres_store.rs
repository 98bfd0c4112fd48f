//! Postgres implementation of ShopStore.
//!
//! The two order commit operations run inside one SQL transaction; an early
//! return drops the transaction, which rolls everything back.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

use crate::config::Config;
use crate::domain::{
    Customer, Flower, NewCustomer, NewFlower, NewOrder, Order, OrderItem, OrderStatus,
};
use crate::ports::{FlowerSales, SalesSummary, ShopStore, StoreError};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Postgres-backed shop store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_items(
        tx: &mut Transaction<'_, Postgres>,
        order_id: i64,
    ) -> Result<Vec<OrderItem>, StoreError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(OrderItemRow::into_domain).collect())
    }

    /// Write ledger output back as absolute quantities. The snapshot was
    /// taken in the same single-operator unit of work; the schema's
    /// `quantity >= 0` check is the backstop.
    async fn write_stock(
        tx: &mut Transaction<'_, Postgres>,
        stock_changes: &[Flower],
    ) -> Result<(), StoreError> {
        for flower in stock_changes {
            let result = sqlx::query("UPDATE flowers SET quantity = $1 WHERE id = $2")
                .bind(flower.quantity)
                .bind(flower.id)
                .execute(&mut **tx)
                .await?;
            if result.rows_affected() != 1 {
                return Err(StoreError::Conflict(format!(
                    "flower {} disappeared during commit",
                    flower.id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ShopStore for PostgresStore {
    async fn get_flower(&self, id: i64) -> Result<Option<Flower>, StoreError> {
        let row = sqlx::query_as::<_, FlowerRow>("SELECT * FROM flowers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(FlowerRow::into_domain))
    }

    async fn list_flowers(&self) -> Result<Vec<Flower>, StoreError> {
        let rows = sqlx::query_as::<_, FlowerRow>("SELECT * FROM flowers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(FlowerRow::into_domain).collect())
    }

    async fn save_flower(&self, flower: NewFlower) -> Result<Flower, StoreError> {
        let row = sqlx::query_as::<_, FlowerRow>(
            r#"
            INSERT INTO flowers (name, price, quantity, category, low_stock_threshold)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&flower.name)
        .bind(&flower.price)
        .bind(flower.quantity)
        .bind(&flower.category)
        .bind(flower.low_stock_threshold)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_domain())
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CustomerRow::into_domain))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CustomerRow::into_domain).collect())
    }

    async fn save_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "INSERT INTO customers (name, phone, email) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_domain())
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let order = match row {
            Some(row) => {
                let items = Self::load_items(&mut tx, row.id).await?;
                Some(row.into_domain(items)?)
            }
            None => None,
        };
        tx.commit().await?;
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&mut *tx)
            .await?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = Self::load_items(&mut tx, row.id).await?;
            orders.push(row.into_domain(items)?);
        }
        tx.commit().await?;
        Ok(orders)
    }

    async fn insert_order(
        &self,
        order: NewOrder,
        stock_changes: &[Flower],
    ) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (customer_id, status, total, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order.customer_id)
        .bind(order.status.as_str())
        .bind(&order.total)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let item_row = sqlx::query_as::<_, OrderItemRow>(
                r#"
                INSERT INTO order_items (order_id, flower_id, quantity)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(row.id)
            .bind(item.flower_id)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into_domain());
        }

        Self::write_stock(&mut tx, stock_changes).await?;

        tx.commit().await?;
        row.into_domain(items)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        stock_changes: &[Flower],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() != 1 {
            return Err(StoreError::Conflict(format!(
                "order {order_id} disappeared during commit"
            )));
        }

        Self::write_stock(&mut tx, stock_changes).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn sales_summary(&self) -> Result<SalesSummary, StoreError> {
        let total_sales = sqlx::query_scalar::<_, BigDecimal>(
            "SELECT COALESCE(SUM(total), 0) FROM orders WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;

        let recent_sales = sqlx::query_scalar::<_, BigDecimal>(
            r#"
            SELECT COALESCE(SUM(total), 0) FROM orders
            WHERE status = 'completed' AND created_at >= NOW() - INTERVAL '7 days'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let completed_orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            total_sales,
            recent_sales,
            completed_orders,
        })
    }

    async fn top_flowers(&self, limit: i64) -> Result<Vec<FlowerSales>, StoreError> {
        let rows = sqlx::query_as::<_, FlowerSalesRow>(
            r#"
            SELECT f.name,
                   SUM(oi.quantity)::BIGINT AS units_sold,
                   SUM(oi.quantity * f.price) AS revenue
            FROM order_items oi
            JOIN flowers f ON f.id = oi.flower_id
            JOIN orders o ON o.id = oi.order_id
            WHERE o.status = 'completed'
            GROUP BY f.name
            ORDER BY units_sold DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FlowerSalesRow::into_domain).collect())
    }
}

// Internal row types for SQLx. Not exposed outside the adapter.

#[derive(Debug, sqlx::FromRow)]
struct FlowerRow {
    id: i64,
    name: String,
    price: BigDecimal,
    quantity: i64,
    category: String,
    low_stock_threshold: i64,
}

impl FlowerRow {
    fn into_domain(self) -> Flower {
        Flower {
            id: self.id,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
            category: self.category,
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    phone: String,
    email: String,
}

impl CustomerRow {
    fn into_domain(self) -> Customer {
        Customer {
            id: self.id,
            name: self.name,
            phone: self.phone,
            email: self.email,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    status: String,
    total: BigDecimal,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl OrderRow {
    fn into_domain(self, items: Vec<OrderItem>) -> Result<Order, StoreError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(StoreError::Backend)?;
        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            status,
            total: self.total,
            created_at: self.created_at,
            items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    flower_id: i64,
    quantity: i64,
}

impl OrderItemRow {
    fn into_domain(self) -> OrderItem {
        OrderItem {
            id: self.id,
            order_id: self.order_id,
            flower_id: self.flower_id,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FlowerSalesRow {
    name: String,
    units_sold: i64,
    revenue: BigDecimal,
}

impl FlowerSalesRow {
    fn into_domain(self) -> FlowerSales {
        FlowerSales {
            name: self.name,
            units_sold: self.units_sold,
            revenue: self.revenue,
        }
    }
}
