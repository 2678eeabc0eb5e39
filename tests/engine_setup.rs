//! Opening the engine from configuration against a file database.

use kanban_order::config::DatabaseConfig;
use kanban_order::{
    open_engine, BoardOperations, Column, EngineConfig, IndexPolicy, NewColumn, PlacementOperations,
};

fn config_in(dir: &std::path::Path) -> EngineConfig {
    EngineConfig {
        database: DatabaseConfig {
            path: dir.join("data").join("kanban.db"),
            busy_timeout_ms: 200,
        },
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn test_orders_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let board_id = {
        let engine = open_engine(&config).expect("open engine");
        let board = engine.create_board("Persisted").await.unwrap();
        for name in ["A", "B", "C"] {
            engine.insert::<Column>(board.id, NewColumn::new(name), None).await.unwrap();
        }
        let c = engine.list::<Column>(board.id).await.unwrap()[2].id;
        engine.set_index::<Column>(c, 0).await.unwrap();
        board.id
    };

    let engine = open_engine(&config).expect("reopen engine");
    let names: Vec<String> = engine
        .list::<Column>(board_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_index_policy_comes_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.ordering.index_policy = IndexPolicy::Reject;

    let engine = open_engine(&config).unwrap();
    assert_eq!(engine.index_policy(), IndexPolicy::Reject);

    let board = engine.create_board("Strict").await.unwrap();
    let result = engine.insert::<Column>(board.id, NewColumn::new("far"), Some(5)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_engines_sharing_a_file_see_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let first = open_engine(&config).unwrap();
    let second = open_engine(&config).unwrap();

    let board = first.create_board("Shared").await.unwrap();
    second.insert::<Column>(board.id, NewColumn::new("A"), None).await.unwrap();
    first.insert::<Column>(board.id, NewColumn::new("B"), Some(0)).await.unwrap();

    let orders: Vec<(String, i64)> = second
        .list::<Column>(board.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.name, c.order))
        .collect();
    assert_eq!(orders, vec![("B".to_string(), 0), ("A".to_string(), 1)]);
}
