//! Integration tests for the ScoreStore implementations
//!
//! The same contract checks run against the SQLite store and the in-memory store so the engine
//! behaves the same on either.

use chrono::Utc;
use database::{DatabaseConfig, MemoryStore, ScoreStore, SqliteStore};
use types::{PlayerName, ScoreCategory};

async fn sqlite_store() -> SqliteStore {
    SqliteStore::open(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database")
}

async fn check_player_lifecycle(store: &dyn ScoreStore) {
    let name = PlayerName::parse("Ganymede").unwrap();
    let player = store
        .insert_player(&name)
        .await
        .expect("Failed to insert player")
        .expect("Name should be free");

    store
        .soft_delete_player(player.id)
        .await
        .expect("Failed to soft delete");
    assert!(store.active_players().await.unwrap().is_empty());

    let deleted = store
        .find_player_by_name("ganymede")
        .await
        .unwrap()
        .expect("Soft-deleted rows are kept");
    assert!(deleted.is_deleted);

    store
        .restore_player(player.id)
        .await
        .expect("Failed to restore");
    assert_eq!(store.active_players().await.unwrap(), vec![player.clone()]);

    let renamed = player.with_name(&PlayerName::parse("Ganymede II").unwrap());
    store
        .update_player(&renamed)
        .await
        .expect("Failed to rename");
    assert_eq!(store.all_players().await.unwrap(), vec![renamed]);
}

async fn check_game_lifecycle(store: &dyn ScoreStore) {
    let a = store
        .insert_player(&PlayerName::parse("A").unwrap())
        .await
        .unwrap()
        .unwrap();
    let b = store
        .insert_player(&PlayerName::parse("B").unwrap())
        .await
        .unwrap()
        .unwrap();

    let (game, entries) = store
        .create_game(Utc::now(), &[a.id, b.id])
        .await
        .expect("Failed to create game");
    assert_eq!(entries.len(), 2);
    assert_eq!(
        store.latest_unfinished_game().await.unwrap().map(|g| g.id),
        Some(game.id)
    );

    let scored = entries[0]
        .with_score(ScoreCategory::Achievements, 20)
        .unwrap();
    store.update_score_entry(&scored).await.unwrap();

    store
        .mark_game_finished(game.id)
        .await
        .expect("Failed to finish game");
    assert_eq!(store.latest_unfinished_game().await.unwrap(), None);

    let history = store.game_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].game.is_finished);
    assert_eq!(history[0].max_total(), 20);
    assert_eq!(history[0].outcome().winners()[0].player.id, a.id);

    store.delete_game(game.id).await.unwrap();
    assert!(store.game_history().await.unwrap().is_empty());
    assert!(store.score_entries(game.id).await.unwrap().is_empty());
}

async fn check_names_fold_case_beyond_ascii(store: &dyn ScoreStore) {
    let emile = store
        .insert_player(&PlayerName::parse("Émile").unwrap())
        .await
        .expect("Failed to insert player")
        .expect("Name should be free");

    let duplicate = store
        .insert_player(&PlayerName::parse("émile").unwrap())
        .await
        .expect("Duplicate insert should be ignored, not fail");
    assert_eq!(duplicate, None);
    assert_eq!(
        store.find_player_by_name("ÉMILE").await.unwrap(),
        Some(emile.clone())
    );

    let other = store
        .insert_player(&PlayerName::parse("Örjan").unwrap())
        .await
        .unwrap()
        .unwrap();
    let clash = other.with_name(&PlayerName::parse("éMILE").unwrap());
    assert!(store.update_player(&clash).await.is_err());

    let recased = emile.with_name(&PlayerName::parse("ÉMILE").unwrap());
    store
        .update_player(&recased)
        .await
        .expect("Changing the case of its own name should be allowed");
    assert_eq!(
        store.find_player_by_name("émile").await.unwrap().map(|p| p.name),
        Some("ÉMILE".to_string())
    );
    assert_eq!(
        store
            .all_players()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect::<Vec<_>>(),
        vec![emile.id, other.id]
    );
}

#[tokio::test]
async fn test_sqlite_store_non_ascii_names() {
    check_names_fold_case_beyond_ascii(&sqlite_store().await).await;
}

#[tokio::test]
async fn test_memory_store_non_ascii_names() {
    check_names_fold_case_beyond_ascii(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_store_player_lifecycle() {
    check_player_lifecycle(&sqlite_store().await).await;
}

#[tokio::test]
async fn test_memory_store_player_lifecycle() {
    check_player_lifecycle(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_store_game_lifecycle() {
    check_game_lifecycle(&sqlite_store().await).await;
}

#[tokio::test]
async fn test_memory_store_game_lifecycle() {
    check_game_lifecycle(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_store_trait_objects() {
    let stores: Vec<Box<dyn ScoreStore>> =
        vec![Box::new(sqlite_store().await), Box::new(MemoryStore::new())];

    for store in &stores {
        assert!(store.all_players().await.unwrap().is_empty());
        assert!(store.finished_games().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_file_database_persists_between_opens() {
    let path = std::env::temp_dir().join(format!(
        "score_store_{}_{}.db",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let config = DatabaseConfig::new(path.to_string_lossy().to_string());

    {
        let store = SqliteStore::open(&config).await.expect("Failed to open file");
        store
            .insert_player(&PlayerName::parse("Persistent").unwrap())
            .await
            .unwrap();
        store.pool().close().await;
    }

    let reopened = SqliteStore::open(&config).await.expect("Failed to reopen file");
    let players = reopened.all_players().await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].name, "Persistent");
    reopened.pool().close().await;

    let _ = std::fs::remove_file(&path);
}
