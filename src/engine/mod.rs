//! Ordering Engine
//!
//! Keeps the `order` of columns and tasks dense under every mutation.
//! Each public operation is one store transaction: read the siblings,
//! plan with `domain::ordering`, apply the plan.
//!
//! Operations are split into traits the same way repository operations are:
//! - placement: insert, remove, set_index, full_reorder, move_to_parent
//! - board_ops: boards, renames, listings, snapshots
//! - maintenance: contiguity checks and reindexing

mod placement;
mod board_ops;
mod maintenance;


pub use placement::PlacementOperations;
pub use board_ops::BoardOperations;
pub use maintenance::MaintenanceOperations;

use crate::domain::{DomainError, DomainResult, IndexPolicy, Ordered, Record};
use crate::repository::{OrderStore, OrderTx};

/// Positional reordering engine over an injected store
#[derive(Clone)]
pub struct OrderingEngine<S> {
    store: S,
    index_policy: IndexPolicy,
}

impl<S: OrderStore> OrderingEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            index_policy: IndexPolicy::default(),
        }
    }

    /// Behaviour for indexes outside the valid range
    pub fn with_index_policy(mut self, policy: IndexPolicy) -> Self {
        self.index_policy = policy;
        self
    }

    pub fn index_policy(&self) -> IndexPolicy {
        self.index_policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Timestamp written to `updated_at`
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Narrow a record to the requested entity type
pub(crate) fn narrow<T: Ordered>(record: Record) -> DomainResult<T> {
    let kind = record.kind();
    T::from_record(record).ok_or_else(|| {
        DomainError::Store(format!("expected a {}, store returned a {}", T::KIND.entity(), kind.entity()))
    })
}

/// Load an item or fail with `NotFound`
pub(crate) fn load<T: Ordered>(tx: &mut dyn OrderTx, id: i64) -> DomainResult<Record> {
    tx.record(T::KIND, id)?
        .ok_or_else(|| DomainError::not_found(T::KIND.entity(), id))
}

/// Fail with `NotFound` unless the parent collection exists
pub(crate) fn require_parent<T: Ordered>(tx: &mut dyn OrderTx, parent_id: i64) -> DomainResult<()> {
    if tx.parent_exists(T::KIND, parent_id)? {
        Ok(())
    } else {
        Err(DomainError::not_found(T::KIND.parent_entity(), parent_id))
    }
}
