pub mod memory_store;
pub mod postgres_store;

pub use memory_store::MemoryStore;
pub use postgres_store::PostgresStore;
