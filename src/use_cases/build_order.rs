//! Order builder: the multi-step assembly workflow.
//!
//! One builder instance is one order in progress. The presentation layer
//! drives it one decision at a time (add an item, finish, cancel), which
//! keeps the workflow headless-testable. Stock is never touched during
//! assembly; each add is checked against the quantity on hand and the
//! binding decrement happens inside `finish` when the operator asked for a
//! completed order. Until `finish` commits, nothing is persisted, so
//! cancelling is simply dropping the builder.

use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::domain::{
    plan_transition, Customer, NewOrder, NewOrderItem, Order, OrderStatus, StockEffect, Transition,
};
use crate::error::ShopError;
use crate::inventory::InventoryLedger;
use crate::ports::ShopStore;

/// One "add another item" decision, validated before it crosses into the
/// core.
#[derive(Debug, Clone, Copy)]
pub struct AddItemRequest {
    pub flower_id: i64,
    pub quantity: i64,
}

pub struct OrderBuilder {
    store: Arc<dyn ShopStore>,
    customer: Customer,
    draft: NewOrder,
    ledger: InventoryLedger,
}

impl std::fmt::Debug for OrderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBuilder")
            .field("customer", &self.customer)
            .field("draft", &self.draft)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl OrderBuilder {
    /// Begin assembling an order for the given customer.
    pub async fn start(store: Arc<dyn ShopStore>, customer_id: i64) -> Result<Self, ShopError> {
        let customer = store
            .get_customer(customer_id)
            .await?
            .ok_or(ShopError::NotFound {
                entity: "customer",
                id: customer_id,
            })?;
        let draft = NewOrder::new(customer.id);
        Ok(Self {
            store,
            customer,
            draft,
            ledger: InventoryLedger::new(),
        })
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn items(&self) -> &[NewOrderItem] {
        &self.draft.items
    }

    /// Current running total: sum of `quantity * unit price` over the items
    /// added so far.
    pub fn total(&self) -> &BigDecimal {
        &self.draft.total
    }

    /// Add a line item. The requested quantity is checked against the
    /// flower's quantity on hand right now; stock itself is not adjusted
    /// until the order is finished as completed. A failed add leaves the
    /// draft untouched.
    pub async fn add_item(&mut self, request: AddItemRequest) -> Result<(), ShopError> {
        if !self.ledger.contains(request.flower_id) {
            let flower = self
                .store
                .get_flower(request.flower_id)
                .await?
                .ok_or(ShopError::NotFound {
                    entity: "flower",
                    id: request.flower_id,
                })?;
            self.ledger.track(flower);
        }

        self.ledger.reserve(request.flower_id, request.quantity)?;

        let price = self.ledger.get(request.flower_id)?.price.clone();
        self.draft.total += price * BigDecimal::from(request.quantity);
        self.draft.items.push(NewOrderItem {
            flower_id: request.flower_id,
            quantity: request.quantity,
        });

        tracing::debug!(
            flower_id = request.flower_id,
            quantity = request.quantity,
            total = %self.draft.total,
            "item added to draft order"
        );
        Ok(())
    }

    /// Finish the workflow and commit atomically.
    ///
    /// An empty draft fails with `EmptyOrder` and persists nothing. When the
    /// desired status is `completed`, the pending→completed transition is
    /// applied first: every item's quantity is debited against the ledger
    /// snapshot, and a flower that can no longer cover its items (for
    /// example two adds that each passed the per-call check) rejects the
    /// whole commit. The order, its items, and the stock write-backs go to
    /// the store as one transaction.
    pub async fn finish(mut self, desired: OrderStatus) -> Result<Order, ShopError> {
        if self.draft.items.is_empty() {
            return Err(ShopError::EmptyOrder);
        }
        // A draft is discarded with `cancel`, never persisted as cancelled.
        if desired == OrderStatus::Cancelled {
            return Err(ShopError::InvalidTransition {
                from: self.draft.status,
                to: desired,
            });
        }

        if let Transition::Apply { status, effect } =
            plan_transition(self.draft.status, desired)?
        {
            if effect == StockEffect::Debit {
                self.ledger
                    .debit_items(self.draft.items.iter().map(|i| (i.flower_id, i.quantity)))?;
            }
            self.draft.status = status;
        }

        let stock_changes = self.ledger.changed();
        let order = self.store.insert_order(self.draft, &stock_changes).await?;

        tracing::info!(
            order_id = order.id,
            customer_id = order.customer_id,
            status = %order.status,
            total = %order.total,
            "order committed"
        );
        Ok(order)
    }

    /// Discard the workflow. Nothing was persisted and stock was never
    /// touched, so there is nothing to undo.
    pub fn cancel(self) {
        tracing::debug!(
            customer_id = self.customer.id,
            items = self.draft.items.len(),
            "order draft discarded"
        );
    }
}
