//! Storage backends for products, orders, and the movement ledger.

pub mod in_memory;
pub mod postgres;
pub mod query;
mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{MovementFilter, MovementQuery, MovementQueryResult, Pagination};
pub use r#trait::{StockChange, Store, StoreError, StoreTx};
