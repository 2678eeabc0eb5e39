//! Board Entity
//!
//! A board owns an ordered list of columns.

use serde::{Deserialize, Serialize};
use super::entity::Entity;
use super::column::Column;
use super::task::Task;

/// A kanban board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Board {
    pub fn new(id: i64, name: String, now: i64) -> Self {
        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Board {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A column together with its tasks, both in `order`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

/// Nested read model of a whole board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Board,
    pub columns: Vec<ColumnWithTasks>,
}

impl BoardSnapshot {
    /// Column names in display order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.name.as_str()).collect()
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}
