//! Domain entities for the flower shop.
//! Framework-agnostic: no persistence or presentation concerns here.

pub mod customer;
pub mod flower;
pub mod order;
pub mod status;

pub use customer::{Customer, NewCustomer};
pub use flower::{Flower, NewFlower};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use status::{plan_transition, OrderStatus, StockEffect, Transition};
