mod sqlite_store_tests {
    use crate::*;
    use chrono::{Duration, Utc};
    use types::{PlayerName, ScoreCategory};

    pub async fn setup_test_db() -> SqliteStore {
        let pool = DatabaseConfig::in_memory()
            .create_pool()
            .await
            .expect("Failed to create test database pool");
        let store = SqliteStore::new(pool);
        store
            .run_migrations()
            .await
            .expect("Failed to run test migrations");
        store
    }

    fn name(raw: &str) -> PlayerName {
        PlayerName::parse(raw).expect("valid test name")
    }

    #[tokio::test]
    async fn test_insert_and_find_player() {
        let store = setup_test_db().await;

        let player = store
            .insert_player(&name("Galileo"))
            .await
            .expect("Failed to insert player")
            .expect("Name should be free");

        let found = store
            .find_player_by_name("galileo")
            .await
            .expect("Failed to find player");

        assert_eq!(found, Some(player));
    }

    #[tokio::test]
    async fn test_insert_ignores_duplicate_names() {
        let store = setup_test_db().await;

        store
            .insert_player(&name("Europa"))
            .await
            .expect("Failed to insert player");
        let duplicate = store
            .insert_player(&name("EUROPA"))
            .await
            .expect("Insert should be ignored, not fail");

        assert_eq!(duplicate, None);
        assert_eq!(store.all_players().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_player_ordering_and_soft_delete() {
        let store = setup_test_db().await;
        let carol = store.insert_player(&name("carol")).await.unwrap().unwrap();
        let alice = store.insert_player(&name("Alice")).await.unwrap().unwrap();
        let bob = store.insert_player(&name("Bob")).await.unwrap().unwrap();

        store
            .soft_delete_player(alice.id)
            .await
            .expect("Failed to delete player");

        let active: Vec<_> = store
            .active_players()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(active, vec![bob.id, carol.id]);

        let all: Vec<_> = store
            .all_players()
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.id, p.is_deleted))
            .collect();
        assert_eq!(all, vec![(bob.id, false), (carol.id, false), (alice.id, true)]);

        store
            .restore_player(alice.id)
            .await
            .expect("Failed to restore player");
        assert_eq!(store.active_players().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_player_updates_fail() {
        let store = setup_test_db().await;
        assert!(matches!(
            store.soft_delete_player(42).await,
            Err(DatabaseError::PlayerNotFound(42))
        ));
        assert!(matches!(
            store.mark_game_finished(7).await,
            Err(DatabaseError::GameNotFound(7))
        ));
    }

    #[tokio::test]
    async fn test_create_game_and_update_scores() {
        let store = setup_test_db().await;
        let a = store.insert_player(&name("A")).await.unwrap().unwrap();
        let b = store.insert_player(&name("B")).await.unwrap().unwrap();

        let (game, entries) = store
            .create_game(Utc::now(), &[b.id, a.id])
            .await
            .expect("Failed to create game");

        assert!(!game.is_finished);
        assert_eq!(
            entries.iter().map(|e| e.player_id).collect::<Vec<_>>(),
            vec![b.id, a.id]
        );
        assert!(entries.iter().all(|e| e.total() == 0));

        let updated = entries[0]
            .with_score(ScoreCategory::Assistants, 25)
            .unwrap();
        store
            .update_score_entry(&updated)
            .await
            .expect("Failed to update score");

        let stored = store.score_entries(game.id).await.unwrap();
        assert_eq!(stored, vec![updated, entries[1].clone()]);

        let players: Vec<_> = store
            .players_for_game(game.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(players, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_create_game_with_unknown_player_leaves_nothing_behind() {
        let store = setup_test_db().await;
        let a = store.insert_player(&name("A")).await.unwrap().unwrap();

        let result = store.create_game(Utc::now(), &[a.id, 999]).await;
        assert!(result.is_err());
        assert_eq!(store.latest_unfinished_game().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_game_removes_scores() {
        let store = setup_test_db().await;
        let a = store.insert_player(&name("A")).await.unwrap().unwrap();
        let (game, _) = store.create_game(Utc::now(), &[a.id]).await.unwrap();

        store
            .delete_game(game.id)
            .await
            .expect("Failed to delete game");

        assert!(store.score_entries(game.id).await.unwrap().is_empty());
        assert_eq!(store.latest_unfinished_game().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_game_queries_order_newest_first() {
        let store = setup_test_db().await;
        let a = store.insert_player(&name("A")).await.unwrap().unwrap();
        let now = Utc::now();

        let (older, _) = store
            .create_game(now - Duration::hours(2), &[a.id])
            .await
            .unwrap();
        let (newer, _) = store
            .create_game(now - Duration::hours(1), &[a.id])
            .await
            .unwrap();
        let (unfinished, _) = store.create_game(now, &[a.id]).await.unwrap();

        store.mark_game_finished(older.id).await.unwrap();
        store.mark_game_finished(newer.id).await.unwrap();

        let finished: Vec<_> = store
            .finished_games()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(finished, vec![newer.id, older.id]);

        let latest = store.latest_unfinished_game().await.unwrap();
        assert_eq!(latest.map(|g| g.id), Some(unfinished.id));
    }

    #[tokio::test]
    async fn test_game_history_joins_players() {
        let store = setup_test_db().await;
        let a = store.insert_player(&name("A")).await.unwrap().unwrap();
        let b = store.insert_player(&name("B")).await.unwrap().unwrap();
        let (game, entries) = store.create_game(Utc::now(), &[a.id, b.id]).await.unwrap();
        store
            .update_score_entry(&entries[1].with_score(ScoreCategory::Io, 9).unwrap())
            .await
            .unwrap();
        store.mark_game_finished(game.id).await.unwrap();
        store.soft_delete_player(b.id).await.unwrap();

        let history = store.game_history().await.expect("Failed to load history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].game.id, game.id);
        let names: Vec<_> = history[0]
            .scores
            .iter()
            .map(|s| (s.player.name.as_str(), s.player.is_deleted, s.total()))
            .collect();
        assert_eq!(names, vec![("A", false, 0), ("B", true, 9)]);
    }
}

mod memory_store_tests {
    use crate::*;
    use chrono::Utc;
    use types::PlayerName;

    #[tokio::test]
    async fn test_memory_store_matches_names_case_insensitively() {
        let store = MemoryStore::new();
        let name = PlayerName::parse("Callisto").unwrap();
        store.insert_player(&name).await.unwrap();

        let found = store.find_player_by_name("CALLISTO").await.unwrap();
        assert_eq!(found.map(|p| p.name), Some("Callisto".to_string()));
        assert_eq!(
            store
                .insert_player(&PlayerName::parse("callisto").unwrap())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_memory_store_cascades_game_delete() {
        let store = MemoryStore::new();
        let player = store
            .insert_player(&PlayerName::parse("Io").unwrap())
            .await
            .unwrap()
            .unwrap();
        let (game, _) = store.create_game(Utc::now(), &[player.id]).await.unwrap();
        store.insert_raw_score_entry(game.id, 404).await;
        assert_eq!(store.score_entry_count().await, 2);

        store.delete_game(game.id).await.unwrap();
        assert_eq!(store.game_count().await, 0);
        assert_eq!(store.score_entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_memory_store_rename_clash_fails() {
        let store = MemoryStore::new();
        let a = store
            .insert_player(&PlayerName::parse("A").unwrap())
            .await
            .unwrap()
            .unwrap();
        store
            .insert_player(&PlayerName::parse("B").unwrap())
            .await
            .unwrap();

        let renamed = a.with_name(&PlayerName::parse("b").unwrap());
        assert!(store.update_player(&renamed).await.is_err());
    }
}
