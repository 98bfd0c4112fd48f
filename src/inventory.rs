//! Inventory ledger: the only place flower stock is ever adjusted.
//!
//! A ledger is a value-copy snapshot of the flowers one operation touches.
//! Mutations apply to the copies and become visible to later reads on the
//! same ledger; nothing reaches the store until the caller hands
//! [`InventoryLedger::changed`] to an atomic store commit. Dropping the
//! ledger discards every pending adjustment, which is what makes a failed
//! operation leave stock untouched.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::Flower;
use crate::error::ShopError;
use crate::ports::ShopStore;

#[derive(Debug, Default)]
pub struct InventoryLedger {
    flowers: BTreeMap<i64, Flower>,
    touched: BTreeSet<i64>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the given flowers from the store. Duplicate ids are read
    /// once; an unknown id fails the whole load.
    pub async fn load(
        store: &dyn ShopStore,
        flower_ids: impl IntoIterator<Item = i64>,
    ) -> Result<Self, ShopError> {
        let mut ledger = Self::new();
        for id in flower_ids {
            if ledger.flowers.contains_key(&id) {
                continue;
            }
            let flower = store
                .get_flower(id)
                .await?
                .ok_or(ShopError::NotFound {
                    entity: "flower",
                    id,
                })?;
            ledger.flowers.insert(id, flower);
        }
        Ok(ledger)
    }

    /// Build a ledger from flowers already in hand (tests, mostly).
    pub fn from_flowers(flowers: impl IntoIterator<Item = Flower>) -> Self {
        let mut ledger = Self::new();
        for flower in flowers {
            ledger.flowers.insert(flower.id, flower);
        }
        ledger
    }

    pub fn contains(&self, flower_id: i64) -> bool {
        self.flowers.contains_key(&flower_id)
    }

    /// Add a flower snapshot taken elsewhere in the same unit of work.
    pub fn track(&mut self, flower: Flower) {
        self.flowers.entry(flower.id).or_insert(flower);
    }

    pub fn get(&self, flower_id: i64) -> Result<&Flower, ShopError> {
        self.flowers.get(&flower_id).ok_or(ShopError::NotFound {
            entity: "flower",
            id: flower_id,
        })
    }

    /// Current on-hand quantity as this ledger sees it.
    pub fn available(&self, flower_id: i64) -> Result<i64, ShopError> {
        Ok(self.get(flower_id)?.quantity)
    }

    /// Advisory check that `qty` could be taken right now. Mutates nothing;
    /// the binding check is the `decrement` at commit time.
    pub fn reserve(&self, flower_id: i64, qty: i64) -> Result<(), ShopError> {
        let available = self.available(flower_id)?;
        if qty < 1 || qty > available {
            return Err(ShopError::InsufficientStock {
                flower_id,
                requested: qty,
                available,
            });
        }
        Ok(())
    }

    /// Lower on-hand stock, refusing to go negative.
    pub fn decrement(&mut self, flower_id: i64, qty: i64) -> Result<(), ShopError> {
        let flower = self.flowers.get_mut(&flower_id).ok_or(ShopError::NotFound {
            entity: "flower",
            id: flower_id,
        })?;
        if qty < 1 || qty > flower.quantity {
            return Err(ShopError::InsufficientStock {
                flower_id,
                requested: qty,
                available: flower.quantity,
            });
        }
        flower.quantity -= qty;
        self.touched.insert(flower_id);
        Ok(())
    }

    /// Raise on-hand stock (restock on cancellation). No upper bound.
    pub fn increment(&mut self, flower_id: i64, qty: i64) -> Result<(), ShopError> {
        let flower = self.flowers.get_mut(&flower_id).ok_or(ShopError::NotFound {
            entity: "flower",
            id: flower_id,
        })?;
        flower.quantity += qty;
        self.touched.insert(flower_id);
        Ok(())
    }

    pub fn is_low_stock(&self, flower_id: i64) -> Result<bool, ShopError> {
        Ok(self.get(flower_id)?.is_low_stock())
    }

    /// Debit each `(flower_id, quantity)` pair. The first failure aborts;
    /// the caller is expected to drop the ledger, so earlier debits in the
    /// batch never reach the store.
    pub fn debit_items(
        &mut self,
        items: impl IntoIterator<Item = (i64, i64)>,
    ) -> Result<(), ShopError> {
        for (flower_id, qty) in items {
            self.decrement(flower_id, qty)?;
        }
        Ok(())
    }

    /// Restore each `(flower_id, quantity)` pair.
    pub fn restore_items(
        &mut self,
        items: impl IntoIterator<Item = (i64, i64)>,
    ) -> Result<(), ShopError> {
        for (flower_id, qty) in items {
            self.increment(flower_id, qty)?;
        }
        Ok(())
    }

    /// The flowers whose quantities changed, ready for write-back.
    pub fn changed(&self) -> Vec<Flower> {
        self.touched
            .iter()
            .filter_map(|id| self.flowers.get(id).cloned())
            .collect()
    }
}
