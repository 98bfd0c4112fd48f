pub mod build_order;
pub mod change_status;

pub use build_order::{AddItemRequest, OrderBuilder};
pub use change_status::ChangeOrderStatus;
