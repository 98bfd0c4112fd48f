//! Status transition engine for persisted orders.
//!
//! Plans the transition against the state machine, applies the stock effect
//! to a fresh ledger snapshot, and commits status plus stock in one store
//! transaction. A failure at any point leaves both the order and every
//! flower at their pre-transition values.

use std::sync::Arc;

use crate::domain::{plan_transition, Order, OrderStatus, StockEffect, Transition};
use crate::error::ShopError;
use crate::inventory::InventoryLedger;
use crate::ports::ShopStore;

pub struct ChangeOrderStatus {
    store: Arc<dyn ShopStore>,
}

impl ChangeOrderStatus {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Move an order to `requested`. Requesting the current status is a
    /// no-op success, which is what makes a repeated "complete" click debit
    /// stock only once.
    pub async fn execute(&self, order_id: i64, requested: OrderStatus) -> Result<Order, ShopError> {
        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(ShopError::NotFound {
                entity: "order",
                id: order_id,
            })?;

        let (status, effect) = match plan_transition(order.status, requested)? {
            Transition::Noop => {
                tracing::debug!(order_id, status = %order.status, "status unchanged");
                return Ok(order);
            }
            Transition::Apply { status, effect } => (status, effect),
        };

        let mut ledger =
            InventoryLedger::load(self.store.as_ref(), order.items.iter().map(|i| i.flower_id))
                .await?;

        match effect {
            StockEffect::None => {}
            StockEffect::Debit => {
                ledger.debit_items(order.items.iter().map(|i| (i.flower_id, i.quantity)))?
            }
            StockEffect::Restore => {
                ledger.restore_items(order.items.iter().map(|i| (i.flower_id, i.quantity)))?
            }
        }

        self.store
            .update_order_status(order.id, status, &ledger.changed())
            .await?;
        let previous = order.status;
        order.status = status;

        tracing::info!(
            order_id = order.id,
            from = %previous,
            to = %order.status,
            "order status changed"
        );
        Ok(order)
    }
}
