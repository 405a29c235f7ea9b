use async_trait::async_trait;
use chrono::{DateTime, Utc};
use types::{Game, GameHistory, Player, PlayerName, ScoreEntry, ScoredPlayer};

use crate::DatabaseError;

/// Durable storage for players, games and score entries.
///
/// Each call is atomic on its own. `create_game` and `delete_game` touch several rows and
/// implementations make them all-or-nothing where the backend allows it.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Inserts a new active player. Returns `None` when the name is already taken
    /// (case-insensitive), leaving the existing row alone.
    async fn insert_player(&self, name: &PlayerName) -> Result<Option<Player>, DatabaseError>;
    async fn update_player(&self, player: &Player) -> Result<(), DatabaseError>;
    async fn soft_delete_player(&self, player_id: i64) -> Result<(), DatabaseError>;
    async fn restore_player(&self, player_id: i64) -> Result<(), DatabaseError>;
    /// Every player, active ones first, each group ordered by name.
    async fn all_players(&self) -> Result<Vec<Player>, DatabaseError>;
    async fn active_players(&self) -> Result<Vec<Player>, DatabaseError>;
    async fn find_player_by_name(&self, name: &str) -> Result<Option<Player>, DatabaseError>;
    /// Players with a score entry in the game, soft-deleted ones included.
    async fn players_for_game(&self, game_id: i64) -> Result<Vec<Player>, DatabaseError>;

    /// Creates an unfinished game with one zeroed entry per player, in the given order.
    async fn create_game(
        &self,
        started_at: DateTime<Utc>,
        player_ids: &[i64],
    ) -> Result<(Game, Vec<ScoreEntry>), DatabaseError>;
    /// Deletes the game and every score entry in it.
    async fn delete_game(&self, game_id: i64) -> Result<(), DatabaseError>;
    async fn mark_game_finished(&self, game_id: i64) -> Result<(), DatabaseError>;
    async fn latest_unfinished_game(&self) -> Result<Option<Game>, DatabaseError>;
    /// Finished games, newest first.
    async fn finished_games(&self) -> Result<Vec<Game>, DatabaseError>;

    async fn update_score_entry(&self, entry: &ScoreEntry) -> Result<(), DatabaseError>;
    /// Entries of one game in creation order.
    async fn score_entries(&self, game_id: i64) -> Result<Vec<ScoreEntry>, DatabaseError>;
    async fn scores_with_players(&self, game_id: i64)
        -> Result<Vec<ScoredPlayer>, DatabaseError>;

    async fn game_history(&self) -> Result<Vec<GameHistory>, DatabaseError> {
        let mut history = Vec::new();
        for game in self.finished_games().await? {
            let scores = self.scores_with_players(game.id).await?;
            history.push(GameHistory { game, scores });
        }
        Ok(history)
    }
}
