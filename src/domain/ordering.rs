//! Ordering Planner
//!
//! Pure position arithmetic. Each `plan_*` function takes the current
//! sibling slots of one parent and returns the order assignments that
//! carry out an operation. Only rows whose order actually changes are
//! returned. Nothing here touches storage.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

/// Id and current order of one sibling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    pub order: i64,
}

impl Slot {
    pub fn new(id: i64, order: i64) -> Self {
        Self { id, order }
    }
}

/// New order value for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub order: i64,
}

/// What to do with a caller index outside the valid range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexPolicy {
    /// Pull the index into range (append when too large, 0 when negative)
    #[default]
    Clamp,
    /// Fail with a validation error
    Reject,
}

/// Valid range for a requested index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// A new member joins: `0..=len`
    Insert,
    /// An existing member moves among its siblings: `0..len`
    Reposition,
}

/// Position just past the last sibling, 0 for an empty collection
pub fn next_position(siblings: &[Slot]) -> i64 {
    siblings.iter().map(|s| s.order).max().map_or(0, |max| max + 1)
}

/// Resolve a caller-supplied index against a collection of `len` members.
pub fn resolve_index(len: usize, requested: i64, policy: IndexPolicy, mode: IndexMode) -> DomainResult<i64> {
    let len = len as i64;
    let max = match mode {
        IndexMode::Insert => len,
        IndexMode::Reposition => (len - 1).max(0),
    };

    if (0..=max).contains(&requested) {
        return Ok(requested);
    }

    match policy {
        IndexPolicy::Clamp => Ok(requested.clamp(0, max)),
        IndexPolicy::Reject => Err(DomainError::Validation(format!(
            "index {} out of range 0..={}",
            requested, max
        ))),
    }
}

/// Make room at `index`: every sibling at or after it moves one later.
pub fn plan_insert(siblings: &[Slot], index: i64) -> Vec<Assignment> {
    siblings
        .iter()
        .filter(|s| s.order >= index)
        .map(|s| Assignment {
            id: s.id,
            order: s.order + 1,
        })
        .collect()
}

/// Close the gap left by `removed`: every later sibling moves one earlier.
pub fn plan_remove(siblings: &[Slot], removed: Slot) -> Vec<Assignment> {
    siblings
        .iter()
        .filter(|s| s.id != removed.id && s.order > removed.order)
        .map(|s| Assignment {
            id: s.id,
            order: s.order - 1,
        })
        .collect()
}

/// Move `item` to `new_index` within the same parent.
///
/// Siblings between the old and new slot shift one step toward the old
/// slot; the item takes `new_index`. Empty when the index is unchanged.
pub fn plan_set_index(siblings: &[Slot], item: Slot, new_index: i64) -> Vec<Assignment> {
    let old = item.order;
    if new_index == old {
        return Vec::new();
    }

    let mut plan: Vec<Assignment> = siblings
        .iter()
        .filter(|s| s.id != item.id)
        .filter_map(|s| {
            if new_index > old && s.order > old && s.order <= new_index {
                Some(Assignment {
                    id: s.id,
                    order: s.order - 1,
                })
            } else if new_index < old && s.order >= new_index && s.order < old {
                Some(Assignment {
                    id: s.id,
                    order: s.order + 1,
                })
            } else {
                None
            }
        })
        .collect();

    plan.push(Assignment {
        id: item.id,
        order: new_index,
    });
    plan
}

/// Assign `order = position` for a caller-supplied complete ordering.
///
/// `ordered_ids` must be a permutation of the siblings' ids: same length,
/// no duplicates, no ids from elsewhere.
pub fn plan_full_reorder(siblings: &[Slot], ordered_ids: &[i64]) -> DomainResult<Vec<Assignment>> {
    let current: HashMap<i64, i64> = siblings.iter().map(|s| (s.id, s.order)).collect();

    let mut seen = HashSet::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        if !current.contains_key(id) {
            return Err(DomainError::Validation(format!(
                "id {} is not a member of this collection",
                id
            )));
        }
        if !seen.insert(*id) {
            return Err(DomainError::Validation(format!("id {} listed more than once", id)));
        }
    }

    if ordered_ids.len() != current.len() {
        let mut missing: Vec<i64> = current
            .keys()
            .filter(|id| !seen.contains(id))
            .copied()
            .collect();
        missing.sort_unstable();
        return Err(DomainError::Validation(format!(
            "expected {} ids, got {}; missing {:?}",
            current.len(),
            ordered_ids.len(),
            missing
        )));
    }

    Ok(ordered_ids
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let order = index as i64;
            (current[id] != order).then_some(Assignment { id: *id, order })
        })
        .collect())
}

/// Rewrite any ordering to `0..N-1`, keeping the `(order, id)` sequence.
pub fn plan_reindex(siblings: &[Slot]) -> Vec<Assignment> {
    let mut sorted = siblings.to_vec();
    sorted.sort_by_key(|s| (s.order, s.id));
    sorted
        .iter()
        .enumerate()
        .filter_map(|(index, s)| {
            let order = index as i64;
            (s.order != order).then_some(Assignment { id: s.id, order })
        })
        .collect()
}

/// Apply assignments to a slot list in memory, returning it sorted by `(order, id)`.
pub fn apply_plan(siblings: &[Slot], plan: &[Assignment]) -> Vec<Slot> {
    let updates: HashMap<i64, i64> = plan.iter().map(|a| (a.id, a.order)).collect();
    let mut next: Vec<Slot> = siblings
        .iter()
        .map(|s| Slot {
            id: s.id,
            order: updates.get(&s.id).copied().unwrap_or(s.order),
        })
        .collect();
    next.sort_by_key(|s| (s.order, s.id));
    next
}

/// Result of checking one parent's orders against `{0..N-1}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contiguity {
    pub count: usize,
    /// Values in `0..N` that no item holds
    pub gaps: Vec<i64>,
    /// Values held by more than one item
    pub duplicates: Vec<i64>,
    /// Values outside `0..N`
    pub out_of_range: Vec<i64>,
}

impl Contiguity {
    pub fn is_dense(&self) -> bool {
        self.gaps.is_empty() && self.duplicates.is_empty() && self.out_of_range.is_empty()
    }
}

pub fn check_dense(orders: &[i64]) -> Contiguity {
    let count = orders.len();
    let mut tally: BTreeMap<i64, usize> = BTreeMap::new();
    for order in orders {
        *tally.entry(*order).or_default() += 1;
    }

    let n = count as i64;
    Contiguity {
        count,
        gaps: (0..n).filter(|o| !tally.contains_key(o)).collect(),
        duplicates: tally
            .iter()
            .filter(|(_, hits)| **hits > 1)
            .map(|(order, _)| *order)
            .collect(),
        out_of_range: tally
            .keys()
            .filter(|o| **o < 0 || **o >= n)
            .copied()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(ids: &[i64]) -> Vec<Slot> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| Slot::new(*id, i as i64))
            .collect()
    }

    fn ids_in_order(slots: &[Slot]) -> Vec<i64> {
        slots.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_next_position() {
        assert_eq!(next_position(&slots(&[1, 2, 3])), 3);
        assert_eq!(next_position(&[]), 0);
        // Follows the maximum even when the orders have a hole
        assert_eq!(next_position(&[Slot::new(1, 0), Slot::new(2, 4)]), 5);
    }

    #[test]
    fn test_resolve_clamps_out_of_range() {
        assert_eq!(
            resolve_index(3, 10, IndexPolicy::Clamp, IndexMode::Insert).unwrap(),
            3
        );
        assert_eq!(
            resolve_index(3, 10, IndexPolicy::Clamp, IndexMode::Reposition).unwrap(),
            2
        );
        assert_eq!(
            resolve_index(3, -4, IndexPolicy::Clamp, IndexMode::Insert).unwrap(),
            0
        );
    }

    #[test]
    fn test_resolve_rejects_out_of_range() {
        let err = resolve_index(3, 4, IndexPolicy::Reject, IndexMode::Insert).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(resolve_index(3, 3, IndexPolicy::Reject, IndexMode::Reposition).is_err());
        assert_eq!(
            resolve_index(3, 3, IndexPolicy::Reject, IndexMode::Insert).unwrap(),
            3
        );
    }

    #[test]
    fn test_insert_shifts_tail() {
        // [A:0, B:1, C:2] insert at 1
        let siblings = slots(&[1, 2, 3]);
        let plan = plan_insert(&siblings, 1);
        assert_eq!(
            plan,
            vec![
                Assignment { id: 2, order: 2 },
                Assignment { id: 3, order: 3 },
            ]
        );
    }

    #[test]
    fn test_insert_at_end_shifts_nothing() {
        assert!(plan_insert(&slots(&[1, 2]), 2).is_empty());
    }

    #[test]
    fn test_remove_closes_gap() {
        let siblings = slots(&[1, 2, 3]);
        let plan = plan_remove(&siblings, siblings[1]);
        assert_eq!(plan, vec![Assignment { id: 3, order: 1 }]);
    }

    #[test]
    fn test_set_index_moving_up() {
        // [A, B, C, D], D -> 0
        let siblings = slots(&[1, 2, 3, 4]);
        let plan = plan_set_index(&siblings, siblings[3], 0);
        let next = apply_plan(&siblings, &plan);
        assert_eq!(ids_in_order(&next), vec![4, 1, 2, 3]);
        assert!(check_dense(&next.iter().map(|s| s.order).collect::<Vec<_>>()).is_dense());
    }

    #[test]
    fn test_set_index_moving_down() {
        let siblings = slots(&[1, 2, 3, 4]);
        let plan = plan_set_index(&siblings, siblings[0], 2);
        let next = apply_plan(&siblings, &plan);
        assert_eq!(ids_in_order(&next), vec![2, 3, 1, 4]);
        // D is outside the shifted range
        assert!(plan.iter().all(|a| a.id != 4));
    }

    #[test]
    fn test_set_index_same_position_is_noop() {
        let siblings = slots(&[1, 2, 3]);
        assert!(plan_set_index(&siblings, siblings[1], 1).is_empty());
    }

    #[test]
    fn test_full_reorder() {
        let siblings = slots(&[1, 2, 3]);
        let plan = plan_full_reorder(&siblings, &[3, 1, 2]).unwrap();
        let next = apply_plan(&siblings, &plan);
        assert_eq!(ids_in_order(&next), vec![3, 1, 2]);
    }

    #[test]
    fn test_full_reorder_identity_writes_nothing() {
        let siblings = slots(&[1, 2, 3]);
        assert!(plan_full_reorder(&siblings, &[1, 2, 3]).unwrap().is_empty());
    }

    #[test]
    fn test_full_reorder_rejects_missing_ids() {
        let siblings = slots(&[1, 2, 3]);
        let err = plan_full_reorder(&siblings, &[1, 2]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("missing [3]")));
    }

    #[test]
    fn test_full_reorder_rejects_foreign_and_duplicate_ids() {
        let siblings = slots(&[1, 2, 3]);
        assert!(plan_full_reorder(&siblings, &[1, 2, 9]).is_err());
        assert!(plan_full_reorder(&siblings, &[1, 2, 2]).is_err());
        assert!(plan_full_reorder(&siblings, &[1, 2, 3, 3]).is_err());
    }

    #[test]
    fn test_reindex_repairs_gaps_and_duplicates() {
        let siblings = vec![Slot::new(5, 4), Slot::new(2, 1), Slot::new(3, 1), Slot::new(9, 7)];
        let next = apply_plan(&siblings, &plan_reindex(&siblings));
        assert_eq!(ids_in_order(&next), vec![2, 3, 5, 9]);
        assert_eq!(next.iter().map(|s| s.order).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_check_dense() {
        assert!(check_dense(&[0, 1, 2]).is_dense());
        assert!(check_dense(&[]).is_dense());

        let report = check_dense(&[0, 2, 2, 5]);
        assert_eq!(report.gaps, vec![1, 3]);
        assert_eq!(report.duplicates, vec![2]);
        assert_eq!(report.out_of_range, vec![5]);
        assert!(!report.is_dense());
    }
}
