//! Order lifecycle state machine.
//!
//! The transition table is the single source of truth for which status
//! changes are legal and what they do to stock. Callers plan a transition
//! here, apply the stock effect through the inventory ledger, and only then
//! write anything back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShopError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!(
                "unknown order status '{other}' (expected pending, completed, or cancelled)"
            )),
        }
    }
}

/// What a transition does to the stock of every item on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// Stock is untouched.
    None,
    /// Decrement each flower by its item quantity.
    Debit,
    /// Increment each flower by its item quantity.
    Restore,
}

/// Outcome of planning a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status equals the current one; nothing to do.
    Noop,
    Apply {
        status: OrderStatus,
        effect: StockEffect,
    },
}

/// Plan a status change without side effects.
///
/// Stock is debited exactly once per order (entering `completed` from
/// `pending`) and restored exactly once (leaving `completed` for
/// `cancelled`). Every edge that would break that pairing is rejected:
/// nothing re-enters `pending`, and a cancelled order cannot be completed
/// again because its debit was already restored.
pub fn plan_transition(
    current: OrderStatus,
    requested: OrderStatus,
) -> Result<Transition, ShopError> {
    use OrderStatus::*;

    if current == requested {
        return Ok(Transition::Noop);
    }

    let effect = match (current, requested) {
        (Pending, Completed) => StockEffect::Debit,
        (Pending, Cancelled) => StockEffect::None,
        (Completed, Cancelled) => StockEffect::Restore,
        (Completed, Pending) | (Cancelled, Pending) | (Cancelled, Completed) => {
            return Err(ShopError::InvalidTransition {
                from: current,
                to: requested,
            })
        }
        // Same-status pairs are handled above.
        (Pending, Pending) | (Completed, Completed) | (Cancelled, Cancelled) => unreachable!(),
    };

    Ok(Transition::Apply {
        status: requested,
        effect,
    })
}
