//! Repository Layer
//!
//! Transactional store abstraction and its SQLite and in-memory implementations.

mod traits;
mod db;
mod sqlite_store;
mod memory_store;

#[cfg(test)]
mod tests;

pub use traits::{OrderStore, OrderTx};
pub use db::init_db;
pub use sqlite_store::SqliteStore;
pub use memory_store::MemoryStore;
