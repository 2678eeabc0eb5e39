//! Maintenance Operations
//!
//! Contiguity checks and repair for data written outside the engine.

use async_trait::async_trait;

use crate::domain::ordering::{check_dense, plan_reindex};
use crate::domain::{Contiguity, DomainResult, Ordered};
use crate::repository::OrderStore;
use super::{now, require_parent, OrderingEngine};

/// Trait for ordering maintenance
#[async_trait]
pub trait MaintenanceOperations {
    /// Report gaps, duplicates and stray values in a parent's orders
    async fn verify<T: Ordered>(&self, parent_id: i64) -> DomainResult<Contiguity>;

    /// Rewrite a parent's orders to `0..N-1`, keeping their sequence.
    /// Returns the number of rows rewritten.
    async fn reindex<T: Ordered>(&self, parent_id: i64) -> DomainResult<usize>;
}

#[async_trait]
impl<S: OrderStore> MaintenanceOperations for OrderingEngine<S> {
    async fn verify<T: Ordered>(&self, parent_id: i64) -> DomainResult<Contiguity> {
        self.store
            .with_transaction(move |tx| {
                require_parent::<T>(tx, parent_id)?;
                let orders: Vec<i64> = tx
                    .slots(T::KIND, parent_id)?
                    .iter()
                    .map(|s| s.order)
                    .collect();
                Ok(check_dense(&orders))
            })
            .await
    }

    async fn reindex<T: Ordered>(&self, parent_id: i64) -> DomainResult<usize> {
        let now = now();
        let rewritten = self
            .store
            .with_transaction(move |tx| {
                require_parent::<T>(tx, parent_id)?;
                let plan = plan_reindex(&tx.slots(T::KIND, parent_id)?);
                tx.apply(T::KIND, &plan, now)?;
                Ok(plan.len())
            })
            .await?;

        if rewritten > 0 {
            log::warn!(
                "Reindexed {} {}: {} {} rows rewritten",
                T::KIND.parent_entity(),
                parent_id,
                rewritten,
                T::KIND.entity()
            );
        }
        Ok(rewritten)
    }
}
