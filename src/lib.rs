//! Kanban Order
//!
//! Dense positional ordering for kanban columns (within a board) and tasks
//! (within a column).
//!
//! Layered architecture:
//! - domain: Core entities, errors and the pure ordering planner
//! - repository: Transactional store abstraction and implementations
//! - engine: Ordering operations run against an injected store
//! - config: Layered configuration

pub mod config;
pub mod domain;
pub mod engine;
pub mod repository;

pub use config::{init_logging, ConfigurationError, EngineConfig};
pub use domain::{
    Board, BoardSnapshot, Column, ColumnWithTasks, Contiguity, DomainError, DomainResult, IndexPolicy, NewColumn,
    NewTask, Task, TaskPatch,
};
pub use engine::{BoardOperations, MaintenanceOperations, OrderingEngine, PlacementOperations};
pub use repository::{MemoryStore, OrderStore, OrderTx, SqliteStore};

/// Open the configured SQLite database and build an engine over it
pub fn open_engine(config: &EngineConfig) -> DomainResult<OrderingEngine<SqliteStore>> {
    let store = SqliteStore::open(&config.database.path, config.database.busy_timeout())?;
    Ok(OrderingEngine::new(store).with_index_policy(config.ordering.index_policy))
}
