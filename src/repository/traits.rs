//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;

use crate::domain::{Assignment, Board, DomainResult, ItemFields, Kind, Record, Slot};

/// Reads and writes available inside one store transaction
///
/// Methods are synchronous: the whole closure handed to
/// `OrderStore::with_transaction` runs while the transaction is open.
pub trait OrderTx {
    /// Create a board
    fn insert_board(&mut self, name: &str, now: i64) -> DomainResult<Board>;

    /// Find board by ID
    fn board(&mut self, id: i64) -> DomainResult<Option<Board>>;

    /// List all boards, oldest first
    fn boards(&mut self) -> DomainResult<Vec<Board>>;

    /// Rename a board
    fn rename_board(&mut self, id: i64, name: &str, now: i64) -> DomainResult<()>;

    /// Delete a board together with its columns and their tasks
    fn delete_board(&mut self, id: i64) -> DomainResult<()>;

    /// Whether the parent collection for `kind` exists
    fn parent_exists(&mut self, kind: Kind, parent_id: i64) -> DomainResult<bool>;

    /// Find an ordered item by ID
    fn record(&mut self, kind: Kind, id: i64) -> DomainResult<Option<Record>>;

    /// Items of one parent, sorted by `(order, id)`
    fn records(&mut self, kind: Kind, parent_id: i64) -> DomainResult<Vec<Record>>;

    /// Id and order of each item of one parent, sorted by `(order, id)`
    fn slots(&mut self, kind: Kind, parent_id: i64) -> DomainResult<Vec<Slot>>;

    /// Write a new item at `order`. Siblings are not touched.
    fn insert_record(
        &mut self,
        kind: Kind,
        parent_id: i64,
        fields: &ItemFields,
        order: i64,
        now: i64,
    ) -> DomainResult<Record>;

    /// Replace the content fields of an item
    fn update_fields(&mut self, kind: Kind, id: i64, fields: &ItemFields, now: i64) -> DomainResult<()>;

    /// Set the order of one item
    fn set_order(&mut self, kind: Kind, id: i64, order: i64, now: i64) -> DomainResult<()>;

    /// Reassign parent and order of one item
    fn set_parent(&mut self, kind: Kind, id: i64, parent_id: i64, order: i64, now: i64) -> DomainResult<()>;

    /// Delete one item. Deleting a column also deletes its tasks.
    fn delete_record(&mut self, kind: Kind, id: i64) -> DomainResult<()>;

    /// Write every assignment of a plan
    fn apply(&mut self, kind: Kind, plan: &[Assignment], now: i64) -> DomainResult<()> {
        for assignment in plan {
            self.set_order(kind, assignment.id, assignment.order, now)?;
        }
        Ok(())
    }
}

/// Transactional store the ordering engine runs against
///
/// `f` either commits as a whole (`Ok`) or leaves no trace (`Err`).
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn with_transaction<R, F>(&self, f: F) -> DomainResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn OrderTx) -> DomainResult<R> + Send + 'static;
}
