//! In-Memory Store
//!
//! Snapshot-and-swap `OrderStore`: each transaction works on a clone of the
//! state and replaces the shared state only when the closure succeeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Board, Column, DomainError, DomainResult, ItemFields, Kind, Record, Slot, Task};
use super::traits::{OrderStore, OrderTx};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    boards: BTreeMap<i64, Board>,
    columns: BTreeMap<i64, Column>,
    tasks: BTreeMap<i64, Task>,
    last_board_id: i64,
    last_column_id: i64,
    last_task_id: i64,
}

/// In-memory implementation of the ordering store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn with_transaction<R, F>(&self, f: F) -> DomainResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn OrderTx) -> DomainResult<R> + Send + 'static,
    {
        let mut guard = self.state.lock().await;
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }
}

fn missing(kind: Kind, id: i64) -> DomainError {
    DomainError::not_found(kind.entity(), id)
}

fn kind_mismatch(kind: Kind, fields: &ItemFields) -> DomainError {
    DomainError::InvalidOperation(format!(
        "{:?} fields given for a {}",
        fields.kind(),
        kind.entity()
    ))
}

fn sorted(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|r| (r.order(), r.id()));
    records
}

impl MemoryState {
    fn remove_column(&mut self, id: i64) {
        self.columns.remove(&id);
        self.tasks.retain(|_, t| t.column_id != id);
    }
}

impl OrderTx for MemoryState {
    fn insert_board(&mut self, name: &str, now: i64) -> DomainResult<Board> {
        self.last_board_id += 1;
        let board = Board::new(self.last_board_id, name.to_string(), now);
        self.boards.insert(board.id, board.clone());
        Ok(board)
    }

    fn board(&mut self, id: i64) -> DomainResult<Option<Board>> {
        Ok(self.boards.get(&id).cloned())
    }

    fn boards(&mut self) -> DomainResult<Vec<Board>> {
        Ok(self.boards.values().cloned().collect())
    }

    fn rename_board(&mut self, id: i64, name: &str, now: i64) -> DomainResult<()> {
        if let Some(board) = self.boards.get_mut(&id) {
            board.name = name.to_string();
            board.updated_at = now;
        }
        Ok(())
    }

    fn delete_board(&mut self, id: i64) -> DomainResult<()> {
        let column_ids: Vec<i64> = self
            .columns
            .values()
            .filter(|c| c.board_id == id)
            .map(|c| c.id)
            .collect();
        for column_id in column_ids {
            self.remove_column(column_id);
        }
        self.boards.remove(&id);
        Ok(())
    }

    fn parent_exists(&mut self, kind: Kind, parent_id: i64) -> DomainResult<bool> {
        Ok(match kind {
            Kind::Column => self.boards.contains_key(&parent_id),
            Kind::Task => self.columns.contains_key(&parent_id),
        })
    }

    fn record(&mut self, kind: Kind, id: i64) -> DomainResult<Option<Record>> {
        Ok(match kind {
            Kind::Column => self.columns.get(&id).cloned().map(Record::Column),
            Kind::Task => self.tasks.get(&id).cloned().map(Record::Task),
        })
    }

    fn records(&mut self, kind: Kind, parent_id: i64) -> DomainResult<Vec<Record>> {
        let records = match kind {
            Kind::Column => self
                .columns
                .values()
                .filter(|c| c.board_id == parent_id)
                .cloned()
                .map(Record::Column)
                .collect(),
            Kind::Task => self
                .tasks
                .values()
                .filter(|t| t.column_id == parent_id)
                .cloned()
                .map(Record::Task)
                .collect(),
        };
        Ok(sorted(records))
    }

    fn slots(&mut self, kind: Kind, parent_id: i64) -> DomainResult<Vec<Slot>> {
        Ok(self
            .records(kind, parent_id)?
            .iter()
            .map(|r| Slot::new(r.id(), r.order()))
            .collect())
    }

    fn insert_record(
        &mut self,
        kind: Kind,
        parent_id: i64,
        fields: &ItemFields,
        order: i64,
        now: i64,
    ) -> DomainResult<Record> {
        match (kind, fields) {
            (Kind::Column, ItemFields::Column { name }) => {
                self.last_column_id += 1;
                let column = Column {
                    id: self.last_column_id,
                    board_id: parent_id,
                    name: name.clone(),
                    order,
                    created_at: now,
                    updated_at: now,
                };
                self.columns.insert(column.id, column.clone());
                Ok(Record::Column(column))
            }
            (Kind::Task, ItemFields::Task { title, description }) => {
                self.last_task_id += 1;
                let task = Task {
                    id: self.last_task_id,
                    column_id: parent_id,
                    title: title.clone(),
                    description: description.clone(),
                    order,
                    created_at: now,
                    updated_at: now,
                };
                self.tasks.insert(task.id, task.clone());
                Ok(Record::Task(task))
            }
            _ => Err(kind_mismatch(kind, fields)),
        }
    }

    fn update_fields(&mut self, kind: Kind, id: i64, fields: &ItemFields, now: i64) -> DomainResult<()> {
        match (kind, fields) {
            (Kind::Column, ItemFields::Column { name }) => {
                let column = self.columns.get_mut(&id).ok_or_else(|| missing(kind, id))?;
                column.name = name.clone();
                column.updated_at = now;
            }
            (Kind::Task, ItemFields::Task { title, description }) => {
                let task = self.tasks.get_mut(&id).ok_or_else(|| missing(kind, id))?;
                task.title = title.clone();
                task.description = description.clone();
                task.updated_at = now;
            }
            _ => return Err(kind_mismatch(kind, fields)),
        }
        Ok(())
    }

    fn set_order(&mut self, kind: Kind, id: i64, order: i64, now: i64) -> DomainResult<()> {
        match kind {
            Kind::Column => {
                let column = self.columns.get_mut(&id).ok_or_else(|| missing(kind, id))?;
                column.order = order;
                column.updated_at = now;
            }
            Kind::Task => {
                let task = self.tasks.get_mut(&id).ok_or_else(|| missing(kind, id))?;
                task.order = order;
                task.updated_at = now;
            }
        }
        Ok(())
    }

    fn set_parent(&mut self, kind: Kind, id: i64, parent_id: i64, order: i64, now: i64) -> DomainResult<()> {
        match kind {
            Kind::Column => {
                let column = self.columns.get_mut(&id).ok_or_else(|| missing(kind, id))?;
                column.board_id = parent_id;
                column.order = order;
                column.updated_at = now;
            }
            Kind::Task => {
                let task = self.tasks.get_mut(&id).ok_or_else(|| missing(kind, id))?;
                task.column_id = parent_id;
                task.order = order;
                task.updated_at = now;
            }
        }
        Ok(())
    }

    fn delete_record(&mut self, kind: Kind, id: i64) -> DomainResult<()> {
        match kind {
            Kind::Column => self.remove_column(id),
            Kind::Task => {
                self.tasks.remove(&id);
            }
        }
        Ok(())
    }
}
