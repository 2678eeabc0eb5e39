//! SQLite Store
//!
//! rusqlite-backed `OrderStore`. Every transaction is opened with
//! `BEGIN IMMEDIATE`, taking the database write lock up front, so writers
//! against the same file serialize and SQLite's serializable isolation
//! applies to each shift-then-place sequence. Transactions run on tokio's
//! blocking pool while holding the connection lock.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tokio::sync::Mutex;

use crate::domain::{Board, Column, DomainError, DomainResult, ItemFields, Kind, Record, Slot, Task};
use super::db::init_db;
use super::traits::{OrderStore, OrderTx};

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Store(e.to_string())
    }
}

/// SQLite implementation of the ordering store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Open the database file, running migrations
    pub fn open(path: &Path, busy_timeout: Duration) -> DomainResult<Self> {
        let conn = init_db(path, busy_timeout)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// Private in-memory database, mainly for tests
    pub fn in_memory() -> DomainResult<Self> {
        Self::open(Path::new(":memory:"), Duration::from_secs(5))
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn with_transaction<R, F>(&self, f: F) -> DomainResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn OrderTx) -> DomainResult<R> + Send + 'static,
    {
        let mut conn = self.conn.clone().lock_owned().await;
        // rusqlite blocks, including busy_timeout waits on other connections
        tokio::task::spawn_blocking(move || run_in_transaction(&mut conn, f))
            .await
            .map_err(|e| DomainError::Store(format!("Transaction task failed: {}", e)))?
    }
}

fn run_in_transaction<R, F>(conn: &mut Connection, f: F) -> DomainResult<R>
where
    F: FnOnce(&mut dyn OrderTx) -> DomainResult<R>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let result = f(&mut SqliteTx { conn: &tx });
    match result {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback() {
                log::error!("Rollback failed after {}: {}", e, rollback);
            }
            Err(e)
        }
    }
}

/// Table and parent column for each ordered kind
fn table(kind: Kind) -> (&'static str, &'static str) {
    match kind {
        Kind::Column => ("board_columns", "board_id"),
        Kind::Task => ("tasks", "column_id"),
    }
}

const COLUMN_FIELDS: &str = "id, board_id, name, position, created_at, updated_at";
const TASK_FIELDS: &str = "id, column_id, title, description, position, created_at, updated_at";

fn select_fields(kind: Kind) -> &'static str {
    match kind {
        Kind::Column => COLUMN_FIELDS,
        Kind::Task => TASK_FIELDS,
    }
}

/// Convert a database row to Record
fn row_to_record(kind: Kind, row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(match kind {
        Kind::Column => Record::Column(Column {
            id: row.get(0)?,
            board_id: row.get(1)?,
            name: row.get(2)?,
            order: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        }),
        Kind::Task => Record::Task(Task {
            id: row.get(0)?,
            column_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            order: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        }),
    })
}

fn row_to_board(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn kind_mismatch(kind: Kind, fields: &ItemFields) -> DomainError {
    DomainError::InvalidOperation(format!(
        "{:?} fields given for a {}",
        fields.kind(),
        kind.entity()
    ))
}

/// Open transaction handle
struct SqliteTx<'a> {
    conn: &'a Connection,
}

impl SqliteTx<'_> {
    fn delete_tasks_of_columns(&self, column_ids_sql: &str, id: i64) -> DomainResult<()> {
        self.conn.execute(
            &format!("DELETE FROM tasks WHERE column_id IN ({})", column_ids_sql),
            params![id],
        )?;
        Ok(())
    }
}

impl OrderTx for SqliteTx<'_> {
    fn insert_board(&mut self, name: &str, now: i64) -> DomainResult<Board> {
        self.conn.execute(
            "INSERT INTO boards (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now],
        )?;
        Ok(Board::new(self.conn.last_insert_rowid(), name.to_string(), now))
    }

    fn board(&mut self, id: i64) -> DomainResult<Option<Board>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM boards WHERE id = ?1",
                params![id],
                row_to_board,
            )
            .optional()?)
    }

    fn boards(&mut self) -> DomainResult<Vec<Board>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at, updated_at FROM boards ORDER BY id")?;
        let boards = stmt
            .query_map([], row_to_board)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(boards)
    }

    fn rename_board(&mut self, id: i64, name: &str, now: i64) -> DomainResult<()> {
        self.conn.execute(
            "UPDATE boards SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, now, id],
        )?;
        Ok(())
    }

    fn delete_board(&mut self, id: i64) -> DomainResult<()> {
        // Manual cascade: tasks, then columns, then the board
        self.delete_tasks_of_columns("SELECT id FROM board_columns WHERE board_id = ?1", id)?;
        self.conn
            .execute("DELETE FROM board_columns WHERE board_id = ?1", params![id])?;
        self.conn.execute("DELETE FROM boards WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn parent_exists(&mut self, kind: Kind, parent_id: i64) -> DomainResult<bool> {
        let sql = match kind {
            Kind::Column => "SELECT EXISTS(SELECT 1 FROM boards WHERE id = ?1)",
            Kind::Task => "SELECT EXISTS(SELECT 1 FROM board_columns WHERE id = ?1)",
        };
        let exists: bool = self.conn.query_row(sql, params![parent_id], |row| row.get(0))?;
        Ok(exists)
    }

    fn record(&mut self, kind: Kind, id: i64) -> DomainResult<Option<Record>> {
        let (table, _) = table(kind);
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", select_fields(kind), table);
        Ok(self
            .conn
            .query_row(&sql, params![id], |row| row_to_record(kind, row))
            .optional()?)
    }

    fn records(&mut self, kind: Kind, parent_id: i64) -> DomainResult<Vec<Record>> {
        let (table, parent) = table(kind);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY position, id",
            select_fields(kind),
            table,
            parent
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![parent_id], |row| row_to_record(kind, row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn slots(&mut self, kind: Kind, parent_id: i64) -> DomainResult<Vec<Slot>> {
        let (table, parent) = table(kind);
        let sql = format!(
            "SELECT id, position FROM {} WHERE {} = ?1 ORDER BY position, id",
            table, parent
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let slots = stmt
            .query_map(params![parent_id], |row| Ok(Slot::new(row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(slots)
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
                self.conn.execute(
                    "INSERT INTO board_columns (board_id, name, position, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![parent_id, name, order, now],
                )?;
            }
            (Kind::Task, ItemFields::Task { title, description }) => {
                self.conn.execute(
                    "INSERT INTO tasks (column_id, title, description, position, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![parent_id, title, description, order, now],
                )?;
            }
            _ => return Err(kind_mismatch(kind, fields)),
        }

        let id = self.conn.last_insert_rowid();
        self.record(kind, id)?
            .ok_or_else(|| DomainError::Store(format!("{} {} vanished after insert", kind.entity(), id)))
    }

    fn update_fields(&mut self, kind: Kind, id: i64, fields: &ItemFields, now: i64) -> DomainResult<()> {
        match (kind, fields) {
            (Kind::Column, ItemFields::Column { name }) => {
                self.conn.execute(
                    "UPDATE board_columns SET name = ?1, updated_at = ?2 WHERE id = ?3",
                    params![name, now, id],
                )?;
            }
            (Kind::Task, ItemFields::Task { title, description }) => {
                self.conn.execute(
                    "UPDATE tasks SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                    params![title, description, now, id],
                )?;
            }
            _ => return Err(kind_mismatch(kind, fields)),
        }
        Ok(())
    }

    fn set_order(&mut self, kind: Kind, id: i64, order: i64, now: i64) -> DomainResult<()> {
        let (table, _) = table(kind);
        self.conn.execute(
            &format!("UPDATE {} SET position = ?1, updated_at = ?2 WHERE id = ?3", table),
            params![order, now, id],
        )?;
        Ok(())
    }

    fn set_parent(&mut self, kind: Kind, id: i64, parent_id: i64, order: i64, now: i64) -> DomainResult<()> {
        let (table, parent) = table(kind);
        self.conn.execute(
            &format!(
                "UPDATE {} SET {} = ?1, position = ?2, updated_at = ?3 WHERE id = ?4",
                table, parent
            ),
            params![parent_id, order, now, id],
        )?;
        Ok(())
    }

    fn delete_record(&mut self, kind: Kind, id: i64) -> DomainResult<()> {
        if kind == Kind::Column {
            self.delete_tasks_of_columns("?1", id)?;
        }
        let (table, _) = table(kind);
        self.conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])?;
        Ok(())
    }
}
