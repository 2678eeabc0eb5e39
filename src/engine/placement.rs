//! Placement Operations
//!
//! The five positional operations. Every shift and the write it makes room
//! for (or closes up after) happen inside a single transaction.

use async_trait::async_trait;

use crate::domain::ordering::{
    next_position, plan_full_reorder, plan_insert, plan_remove, plan_set_index, resolve_index,
};
use crate::domain::{DomainError, DomainResult, IndexMode, ItemFields, Ordered, Slot};
use crate::repository::OrderStore;
use super::{load, narrow, now, require_parent, OrderingEngine};

/// Trait for positional operations on ordered items
#[async_trait]
pub trait PlacementOperations {
    /// Create an item under `parent_id`.
    ///
    /// Without an index the item is appended; with one, siblings at or
    /// after the index move one later first.
    async fn insert<T: Ordered>(&self, parent_id: i64, fields: T::Fields, index: Option<i64>) -> DomainResult<T>;

    /// Delete an item and close the gap it leaves
    async fn remove<T: Ordered>(&self, id: i64) -> DomainResult<()>;

    /// Move an item to `new_index` within its current parent
    async fn set_index<T: Ordered>(&self, id: i64, new_index: i64) -> DomainResult<T>;

    /// Replace a parent's ordering with `ordered_ids`, which must list every member exactly once
    async fn full_reorder<T: Ordered>(&self, parent_id: i64, ordered_ids: &[i64]) -> DomainResult<Vec<T>>;

    /// Move an item into a different parent, appending when `index` is `None`
    async fn move_to_parent<T: Ordered>(&self, id: i64, target_parent_id: i64, index: Option<i64>) -> DomainResult<T>;
}

#[async_trait]
impl<S: OrderStore> PlacementOperations for OrderingEngine<S> {
    async fn insert<T: Ordered>(&self, parent_id: i64, fields: T::Fields, index: Option<i64>) -> DomainResult<T> {
        let fields: ItemFields = fields.into();
        let fields = fields.validated()?;
        let policy = self.index_policy;
        let now = now();

        let record = self
            .store
            .with_transaction(move |tx| {
                require_parent::<T>(tx, parent_id)?;
                let siblings = tx.slots(T::KIND, parent_id)?;
                let position = match index {
                    Some(requested) => resolve_index(siblings.len(), requested, policy, IndexMode::Insert)?,
                    None => next_position(&siblings),
                };
                tx.apply(T::KIND, &plan_insert(&siblings, position), now)?;
                tx.insert_record(T::KIND, parent_id, &fields, position, now)
            })
            .await?;

        log::debug!(
            "Inserted {} {} into {} {} at {}",
            T::KIND.entity(),
            record.id(),
            T::KIND.parent_entity(),
            parent_id,
            record.order()
        );
        narrow(record)
    }

    async fn remove<T: Ordered>(&self, id: i64) -> DomainResult<()> {
        let now = now();

        self.store
            .with_transaction(move |tx| {
                let record = load::<T>(tx, id)?;
                let siblings = tx.slots(T::KIND, record.parent_id())?;
                tx.delete_record(T::KIND, id)?;
                let plan = plan_remove(&siblings, Slot::new(id, record.order()));
                tx.apply(T::KIND, &plan, now)
            })
            .await?;

        log::debug!("Removed {} {}", T::KIND.entity(), id);
        Ok(())
    }

    async fn set_index<T: Ordered>(&self, id: i64, new_index: i64) -> DomainResult<T> {
        let policy = self.index_policy;
        let now = now();

        let record = self
            .store
            .with_transaction(move |tx| {
                let record = load::<T>(tx, id)?;
                let siblings = tx.slots(T::KIND, record.parent_id())?;
                let target = resolve_index(siblings.len(), new_index, policy, IndexMode::Reposition)?;
                let plan = plan_set_index(&siblings, Slot::new(id, record.order()), target);
                if plan.is_empty() {
                    return Ok(record);
                }
                tx.apply(T::KIND, &plan, now)?;
                load::<T>(tx, id)
            })
            .await?;

        log::debug!("Set {} {} to index {}", T::KIND.entity(), id, record.order());
        narrow(record)
    }

    async fn full_reorder<T: Ordered>(&self, parent_id: i64, ordered_ids: &[i64]) -> DomainResult<Vec<T>> {
        let ordered_ids = ordered_ids.to_vec();
        let now = now();

        let records = self
            .store
            .with_transaction(move |tx| {
                require_parent::<T>(tx, parent_id)?;
                let siblings = tx.slots(T::KIND, parent_id)?;
                let plan = plan_full_reorder(&siblings, &ordered_ids)?;
                tx.apply(T::KIND, &plan, now)?;
                tx.records(T::KIND, parent_id)
            })
            .await?;

        log::debug!(
            "Reordered {} {} ({} items)",
            T::KIND.parent_entity(),
            parent_id,
            records.len()
        );
        records.into_iter().map(narrow::<T>).collect()
    }

    async fn move_to_parent<T: Ordered>(&self, id: i64, target_parent_id: i64, index: Option<i64>) -> DomainResult<T> {
        let policy = self.index_policy;
        let now = now();

        let record = self
            .store
            .with_transaction(move |tx| {
                let record = load::<T>(tx, id)?;
                let source_parent_id = record.parent_id();
                if source_parent_id == target_parent_id {
                    return Err(DomainError::InvalidOperation(format!(
                        "{} {} already belongs to {} {}; reorder it within its parent instead",
                        T::KIND.entity(),
                        id,
                        T::KIND.parent_entity(),
                        target_parent_id
                    )));
                }
                require_parent::<T>(tx, target_parent_id)?;

                // Detach: close the gap in the source
                let source = tx.slots(T::KIND, source_parent_id)?;
                tx.apply(T::KIND, &plan_remove(&source, Slot::new(id, record.order())), now)?;

                // Make room in the target
                let target = tx.slots(T::KIND, target_parent_id)?;
                let position = match index {
                    Some(requested) => resolve_index(target.len(), requested, policy, IndexMode::Insert)?,
                    None => next_position(&target),
                };
                tx.apply(T::KIND, &plan_insert(&target, position), now)?;

                tx.set_parent(T::KIND, id, target_parent_id, position, now)?;
                load::<T>(tx, id)
            })
            .await?;

        log::debug!(
            "Moved {} {} to {} {} at {}",
            T::KIND.entity(),
            id,
            T::KIND.parent_entity(),
            target_parent_id,
            record.order()
        );
        narrow(record)
    }
}
