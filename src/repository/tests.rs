//! Repository Integration Tests
//!
//! Store-level behaviour against in-memory SQLite and the memory store.

#[cfg(test)]
mod tests {
    use crate::domain::{DomainError, ItemFields, Kind, Record, Slot};
    use crate::repository::db::{column_exists, run_migrations};
    use crate::repository::{MemoryStore, OrderStore, SqliteStore};
    use rusqlite::Connection;

    fn column(name: &str) -> ItemFields {
        ItemFields::Column { name: name.to_string() }
    }

    fn task(title: &str) -> ItemFields {
        ItemFields::Task {
            title: title.to_string(),
            description: None,
        }
    }

    /// Board with columns "A" and "B"; returns (board id, [column ids])
    async fn seed<S: OrderStore>(store: &S) -> (i64, Vec<i64>) {
        store
            .with_transaction(|tx| {
                let board = tx.insert_board("Roadmap", 1)?;
                let a = tx.insert_record(Kind::Column, board.id, &column("A"), 0, 1)?;
                let b = tx.insert_record(Kind::Column, board.id, &column("B"), 1, 1)?;
                Ok((board.id, vec![a.id(), b.id()]))
            })
            .await
            .expect("Failed to seed")
    }

    async fn check_commit<S: OrderStore>(store: S) {
        let (board_id, columns) = seed(&store).await;

        let slots = store
            .with_transaction(move |tx| tx.slots(Kind::Column, board_id))
            .await
            .unwrap();
        assert_eq!(slots, vec![Slot::new(columns[0], 0), Slot::new(columns[1], 1)]);
    }

    async fn check_rollback<S: OrderStore>(store: S) {
        let (board_id, columns) = seed(&store).await;
        let first = columns[0];

        let result: Result<(), DomainError> = store
            .with_transaction(move |tx| {
                tx.set_order(Kind::Column, first, 5, 2)?;
                tx.insert_record(Kind::Column, board_id, &column("C"), 2, 2)?;
                Err(DomainError::Store("simulated failure".to_string()))
            })
            .await;
        assert!(result.is_err());

        let slots = store
            .with_transaction(move |tx| tx.slots(Kind::Column, board_id))
            .await
            .unwrap();
        assert_eq!(slots, vec![Slot::new(columns[0], 0), Slot::new(columns[1], 1)]);
    }

    async fn check_column_delete_cascades<S: OrderStore>(store: S) {
        let (_, columns) = seed(&store).await;
        let (a, b) = (columns[0], columns[1]);

        let remaining = store
            .with_transaction(move |tx| {
                tx.insert_record(Kind::Task, a, &task("one"), 0, 1)?;
                tx.insert_record(Kind::Task, a, &task("two"), 1, 1)?;
                tx.insert_record(Kind::Task, b, &task("three"), 0, 1)?;
                tx.delete_record(Kind::Column, a)?;
                Ok((tx.records(Kind::Task, a)?.len(), tx.records(Kind::Task, b)?.len()))
            })
            .await
            .unwrap();
        assert_eq!(remaining, (0, 1));
    }

    async fn check_board_delete_cascades<S: OrderStore>(store: S) {
        let (board_id, columns) = seed(&store).await;
        let a = columns[0];

        let (board, column, tasks) = store
            .with_transaction(move |tx| {
                tx.insert_record(Kind::Task, a, &task("one"), 0, 1)?;
                tx.delete_board(board_id)?;
                Ok((
                    tx.board(board_id)?,
                    tx.record(Kind::Column, a)?,
                    tx.records(Kind::Task, a)?,
                ))
            })
            .await
            .unwrap();
        assert!(board.is_none());
        assert!(column.is_none());
        assert!(tasks.is_empty());
    }

    async fn check_records_sorted_by_order_then_id<S: OrderStore>(store: S) {
        let (board_id, _) = seed(&store).await;

        let names = store
            .with_transaction(move |tx| {
                // Duplicate order on purpose: ties fall back to id
                tx.insert_record(Kind::Column, board_id, &column("C"), 0, 1)?;
                let names: Vec<String> = tx
                    .records(Kind::Column, board_id)?
                    .into_iter()
                    .map(|r| match r {
                        Record::Column(c) => c.name,
                        Record::Task(t) => t.title,
                    })
                    .collect();
                Ok(names)
            })
            .await
            .unwrap();
        assert_eq!(names, vec!["A", "C", "B"]);
    }

    async fn check_mismatched_fields_rejected<S: OrderStore>(store: S) {
        let (board_id, _) = seed(&store).await;

        let result = store
            .with_transaction(move |tx| tx.insert_record(Kind::Column, board_id, &task("wrong"), 0, 1))
            .await;
        assert!(matches!(result, Err(DomainError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_sqlite_commit() {
        check_commit(SqliteStore::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_memory_commit() {
        check_commit(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_rollback_leaves_no_trace() {
        check_rollback(SqliteStore::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_memory_rollback_leaves_no_trace() {
        check_rollback(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_column_delete_cascades() {
        check_column_delete_cascades(SqliteStore::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_memory_column_delete_cascades() {
        check_column_delete_cascades(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_board_delete_cascades() {
        check_board_delete_cascades(SqliteStore::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_memory_board_delete_cascades() {
        check_board_delete_cascades(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_records_sorted() {
        check_records_sorted_by_order_then_id(SqliteStore::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_memory_records_sorted() {
        check_records_sorted_by_order_then_id(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_mismatched_fields() {
        check_mismatched_fields_rejected(SqliteStore::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_memory_mismatched_fields() {
        check_mismatched_fields_rejected(MemoryStore::new()).await;
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).expect("first run");
        run_migrations(&conn).expect("second run");
        assert!(column_exists(&conn, "tasks", "description").unwrap());
    }

    #[test]
    fn test_migration_adds_description_to_old_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                column_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )
        .unwrap();
        assert!(!column_exists(&conn, "tasks", "description").unwrap());

        run_migrations(&conn).unwrap();
        assert!(column_exists(&conn, "tasks", "description").unwrap());
    }

    #[test]
    fn test_sqlite_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("boards.db");
        SqliteStore::open(&path, std::time::Duration::from_millis(100)).expect("open on disk");
        assert!(path.exists());
    }
}
