use serde::{Deserialize, Serialize};

/// A shop customer. The order engine only reads the id to stamp orders;
/// customer CRUD lives outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// A customer awaiting its store-assigned id. Phone must be unique.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: String,
}
