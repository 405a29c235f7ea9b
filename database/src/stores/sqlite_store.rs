use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use types::{name_key, Game, Player, PlayerName, ScoreEntry, ScoredPlayer};

use super::ScoreStore;
use crate::models::{GameRecord, PlayerRecord, ScoreRecord, ScoredPlayerRecord};
use crate::{retry_with_backoff, DatabaseConfig, DatabaseError};

const SCORE_COLUMNS: &str = "s.id, s.game_id, s.player_id, s.io, s.europa, s.ganymede, \
     s.callisto, s.technologies, s.achievements, s.assistants";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects (retrying while the file is busy) and brings the schema up to date.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = retry_with_backoff(
            || {
                let config = config.clone();
                Box::pin(async move { config.create_pool().await })
            },
            3,
            Duration::from_millis(100),
        )
        .await?;
        tracing::info!("Connected to score database at {}", config.url);

        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl ScoreStore for SqliteStore {
    async fn insert_player(&self, name: &PlayerName) -> Result<Option<Player>, DatabaseError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO players (name, name_key, is_deleted) VALUES (?, ?, 0)",
        )
        .bind(name.as_str())
        .bind(name.key())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::debug!("Player name {name} already taken, insert ignored");
            return Ok(None);
        }
        Ok(Some(Player::new(result.last_insert_rowid(), name.as_str())))
    }

    async fn update_player(&self, player: &Player) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE players SET name = ?, name_key = ?, is_deleted = ? WHERE id = ?",
        )
        .bind(&player.name)
        .bind(name_key(&player.name))
        .bind(player.is_deleted)
        .bind(player.id)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::PlayerNotFound(player.id));
        }
        Ok(())
    }

    async fn soft_delete_player(&self, player_id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE players SET is_deleted = 1 WHERE id = ?")
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::PlayerNotFound(player_id));
        }
        Ok(())
    }

    async fn restore_player(&self, player_id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE players SET is_deleted = 0 WHERE id = ?")
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::PlayerNotFound(player_id));
        }
        Ok(())
    }

    async fn all_players(&self) -> Result<Vec<Player>, DatabaseError> {
        let rows = sqlx::query_as::<_, PlayerRecord>(
            "SELECT id, name, is_deleted FROM players ORDER BY is_deleted, name_key ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn active_players(&self) -> Result<Vec<Player>, DatabaseError> {
        let rows = sqlx::query_as::<_, PlayerRecord>(
            "SELECT id, name, is_deleted FROM players WHERE is_deleted = 0 ORDER BY name_key ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn find_player_by_name(&self, name: &str) -> Result<Option<Player>, DatabaseError> {
        let row = sqlx::query_as::<_, PlayerRecord>(
            "SELECT id, name, is_deleted FROM players WHERE name_key = ? LIMIT 1",
        )
        .bind(name_key(name))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(row.map(Player::from))
    }

    async fn players_for_game(&self, game_id: i64) -> Result<Vec<Player>, DatabaseError> {
        let rows = sqlx::query_as::<_, PlayerRecord>(
            "SELECT p.id, p.name, p.is_deleted FROM players p
             JOIN scores s ON p.id = s.player_id
             WHERE s.game_id = ?
             ORDER BY s.id",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn create_game(
        &self,
        started_at: DateTime<Utc>,
        player_ids: &[i64],
    ) -> Result<(Game, Vec<ScoreEntry>), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        let result = sqlx::query("INSERT INTO games (started_at, is_finished) VALUES (?, 0)")
            .bind(started_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let game_id = result.last_insert_rowid();

        let mut entries = Vec::with_capacity(player_ids.len());
        for &player_id in player_ids {
            let result = sqlx::query("INSERT INTO scores (game_id, player_id) VALUES (?, ?)")
                .bind(game_id)
                .bind(player_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::Query(e.to_string()))?;
            entries.push(ScoreEntry::new(
                result.last_insert_rowid(),
                game_id,
                player_id,
            ));
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        let game = Game {
            id: game_id,
            started_at,
            is_finished: false,
        };
        Ok((game, entries))
    }

    async fn delete_game(&self, game_id: i64) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        sqlx::query("DELETE FROM scores WHERE game_id = ?")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        Ok(())
    }

    async fn mark_game_finished(&self, game_id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE games SET is_finished = 1 WHERE id = ?")
            .bind(game_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::GameNotFound(game_id));
        }
        Ok(())
    }

    async fn latest_unfinished_game(&self) -> Result<Option<Game>, DatabaseError> {
        let row = sqlx::query_as::<_, GameRecord>(
            "SELECT id, started_at, is_finished FROM games
             WHERE is_finished = 0
             ORDER BY started_at DESC, id DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(row.map(Game::from))
    }

    async fn finished_games(&self) -> Result<Vec<Game>, DatabaseError> {
        let rows = sqlx::query_as::<_, GameRecord>(
            "SELECT id, started_at, is_finished FROM games
             WHERE is_finished = 1
             ORDER BY started_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Game::from).collect())
    }

    async fn update_score_entry(&self, entry: &ScoreEntry) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE scores SET io = ?, europa = ?, ganymede = ?, callisto = ?,
                technologies = ?, achievements = ?, assistants = ?
             WHERE id = ?",
        )
        .bind(entry.io)
        .bind(entry.europa)
        .bind(entry.ganymede)
        .bind(entry.callisto)
        .bind(entry.technologies)
        .bind(entry.achievements)
        .bind(entry.assistants)
        .bind(entry.id)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(())
    }

    async fn score_entries(&self, game_id: i64) -> Result<Vec<ScoreEntry>, DatabaseError> {
        let rows = sqlx::query_as::<_, ScoreRecord>(&format!(
            "SELECT {SCORE_COLUMNS} FROM scores s WHERE s.game_id = ? ORDER BY s.id"
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(ScoreEntry::from).collect())
    }

    async fn scores_with_players(
        &self,
        game_id: i64,
    ) -> Result<Vec<ScoredPlayer>, DatabaseError> {
        let rows = sqlx::query_as::<_, ScoredPlayerRecord>(&format!(
            "SELECT {SCORE_COLUMNS}, p.name AS player_name, p.is_deleted AS player_is_deleted
             FROM scores s
             JOIN players p ON p.id = s.player_id
             WHERE s.game_id = ?
             ORDER BY s.id"
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(ScoredPlayer::from).collect())
    }
}
