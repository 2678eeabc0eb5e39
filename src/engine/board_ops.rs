//! Board Operations
//!
//! Boards and the content of ordered items. None of these move anything.

use async_trait::async_trait;

use crate::domain::{
    validate_name, Board, BoardSnapshot, Column, ColumnWithTasks, DomainError, DomainResult, EntityKind,
    ItemFields, Kind, Ordered, Task, TaskPatch,
};
use crate::repository::{OrderStore, OrderTx};
use super::{load, narrow, now, require_parent, OrderingEngine};

/// Trait for board and item content operations
#[async_trait]
pub trait BoardOperations {
    async fn create_board(&self, name: &str) -> DomainResult<Board>;

    async fn get_board(&self, id: i64) -> DomainResult<Board>;

    async fn list_boards(&self) -> DomainResult<Vec<Board>>;

    async fn rename_board(&self, id: i64, name: &str) -> DomainResult<Board>;

    /// Delete a board with all its columns and tasks
    async fn delete_board(&self, id: i64) -> DomainResult<()>;

    async fn rename_column(&self, id: i64, name: &str) -> DomainResult<Column>;

    async fn update_task(&self, id: i64, patch: TaskPatch) -> DomainResult<Task>;

    /// Get an ordered item by ID
    async fn get<T: Ordered>(&self, id: i64) -> DomainResult<T>;

    /// Items of one parent in `order`
    async fn list<T: Ordered>(&self, parent_id: i64) -> DomainResult<Vec<T>>;

    /// The board with its columns and their tasks, all in `order`
    async fn board_snapshot(&self, id: i64) -> DomainResult<BoardSnapshot>;
}

fn require_board(tx: &mut dyn OrderTx, id: i64) -> DomainResult<Board> {
    tx.board(id)?
        .ok_or_else(|| DomainError::not_found(EntityKind::Board, id))
}

#[async_trait]
impl<S: OrderStore> BoardOperations for OrderingEngine<S> {
    async fn create_board(&self, name: &str) -> DomainResult<Board> {
        let name = validate_name("board name", name)?;
        let now = now();
        let board = self
            .store
            .with_transaction(move |tx| tx.insert_board(&name, now))
            .await?;
        log::info!("Created board {} ({})", board.id, board.name);
        Ok(board)
    }

    async fn get_board(&self, id: i64) -> DomainResult<Board> {
        self.store.with_transaction(move |tx| require_board(tx, id)).await
    }

    async fn list_boards(&self) -> DomainResult<Vec<Board>> {
        self.store.with_transaction(|tx| tx.boards()).await
    }

    async fn rename_board(&self, id: i64, name: &str) -> DomainResult<Board> {
        let name = validate_name("board name", name)?;
        let now = now();
        self.store
            .with_transaction(move |tx| {
                require_board(tx, id)?;
                tx.rename_board(id, &name, now)?;
                require_board(tx, id)
            })
            .await
    }

    async fn delete_board(&self, id: i64) -> DomainResult<()> {
        self.store
            .with_transaction(move |tx| {
                require_board(tx, id)?;
                tx.delete_board(id)
            })
            .await?;
        log::info!("Deleted board {}", id);
        Ok(())
    }

    async fn rename_column(&self, id: i64, name: &str) -> DomainResult<Column> {
        let fields = ItemFields::Column { name: name.to_string() }.validated()?;
        let now = now();
        let record = self
            .store
            .with_transaction(move |tx| {
                load::<Column>(tx, id)?;
                tx.update_fields(Kind::Column, id, &fields, now)?;
                load::<Column>(tx, id)
            })
            .await?;
        narrow(record)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> DomainResult<Task> {
        let now = now();
        let record = self
            .store
            .with_transaction(move |tx| {
                let task: Task = narrow(load::<Task>(tx, id)?)?;
                let fields = task.patched(patch).validated()?;
                tx.update_fields(Kind::Task, id, &fields, now)?;
                load::<Task>(tx, id)
            })
            .await?;
        narrow(record)
    }

    async fn get<T: Ordered>(&self, id: i64) -> DomainResult<T> {
        let record = self.store.with_transaction(move |tx| load::<T>(tx, id)).await?;
        narrow(record)
    }

    async fn list<T: Ordered>(&self, parent_id: i64) -> DomainResult<Vec<T>> {
        let records = self
            .store
            .with_transaction(move |tx| {
                require_parent::<T>(tx, parent_id)?;
                tx.records(T::KIND, parent_id)
            })
            .await?;
        records.into_iter().map(narrow::<T>).collect()
    }

    async fn board_snapshot(&self, id: i64) -> DomainResult<BoardSnapshot> {
        self.store
            .with_transaction(move |tx| {
                let board = require_board(tx, id)?;
                let mut columns = Vec::new();
                for record in tx.records(Kind::Column, id)? {
                    let column: Column = narrow(record)?;
                    let tasks = tx
                        .records(Kind::Task, column.id)?
                        .into_iter()
                        .map(narrow::<Task>)
                        .collect::<DomainResult<Vec<_>>>()?;
                    columns.push(ColumnWithTasks { column, tasks });
                }
                Ok(BoardSnapshot { board, columns })
            })
            .await
    }
}
