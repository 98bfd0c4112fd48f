use thiserror::Error;

use crate::domain::OrderStatus;
use crate::ports::StoreError;

/// Typed failures surfaced to the presentation layer.
///
/// Validation errors abort the current operation before anything is written;
/// `Persistence` surfaces a store failure after rollback and is never
/// retried, since a blind retry could double-apply stock effects.
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("insufficient stock for flower {flower_id}: requested {requested}, available {available}")]
    InsufficientStock {
        flower_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("order has no items")]
    EmptyOrder,

    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("store error: {0}")]
    Persistence(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        let err = ShopError::NotFound {
            entity: "flower",
            id: 42,
        };
        assert_eq!(err.to_string(), "flower 42 not found");
    }

    #[test]
    fn insufficient_stock_reports_both_quantities() {
        let err = ShopError::InsufficientStock {
            flower_id: 3,
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for flower 3: requested 5, available 2"
        );
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = ShopError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Completed,
        };
        assert_eq!(
            err.to_string(),
            "cannot change order status from cancelled to completed"
        );
    }

    #[test]
    fn store_errors_wrap_into_persistence() {
        let err: ShopError = StoreError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, ShopError::Persistence(_)));
    }
}
