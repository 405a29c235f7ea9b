use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use types::{name_key, Game, Player, PlayerName, ScoreEntry, ScoredPlayer};

use super::ScoreStore;
use crate::DatabaseError;

#[derive(Debug, Default)]
struct Tables {
    players: Vec<Player>,
    games: Vec<Game>,
    scores: Vec<ScoreEntry>,
    last_player_id: i64,
    last_game_id: i64,
    last_score_id: i64,
}

/// Keeps everything in process memory, for tests and runs that don't need persistence.
///
/// Mirrors the SQLite store's behavior, including case-insensitive name uniqueness.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a score row as-is, without checking the game or player exist. Lets tests set up
    /// the inconsistent states startup recovery has to clean up.
    pub async fn insert_raw_score_entry(&self, game_id: i64, player_id: i64) -> ScoreEntry {
        let mut tables = self.tables.lock().await;
        tables.last_score_id += 1;
        let entry = ScoreEntry::new(tables.last_score_id, game_id, player_id);
        tables.scores.push(entry.clone());
        entry
    }

    pub async fn game_count(&self) -> usize {
        self.tables.lock().await.games.len()
    }

    pub async fn score_entry_count(&self) -> usize {
        self.tables.lock().await.scores.len()
    }
}

fn by_name(a: &Player, b: &Player) -> std::cmp::Ordering {
    name_key(&a.name).cmp(&name_key(&b.name))
}

fn newest_first(games: &mut [Game]) {
    games.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait::async_trait]
impl ScoreStore for MemoryStore {
    async fn insert_player(&self, name: &PlayerName) -> Result<Option<Player>, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if tables.players.iter().any(|p| p.has_name(name.as_str())) {
            return Ok(None);
        }
        tables.last_player_id += 1;
        let player = Player::new(tables.last_player_id, name.as_str());
        tables.players.push(player.clone());
        Ok(Some(player))
    }

    async fn update_player(&self, player: &Player) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        let clash = tables
            .players
            .iter()
            .any(|p| p.id != player.id && p.has_name(&player.name));
        if clash {
            return Err(DatabaseError::Query(format!(
                "UNIQUE constraint failed: players.name ({})",
                player.name
            )));
        }
        let row = tables
            .players
            .iter_mut()
            .find(|p| p.id == player.id)
            .ok_or(DatabaseError::PlayerNotFound(player.id))?;
        *row = player.clone();
        Ok(())
    }

    async fn soft_delete_player(&self, player_id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(DatabaseError::PlayerNotFound(player_id))?;
        row.is_deleted = true;
        Ok(())
    }

    async fn restore_player(&self, player_id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(DatabaseError::PlayerNotFound(player_id))?;
        row.is_deleted = false;
        Ok(())
    }

    async fn all_players(&self) -> Result<Vec<Player>, DatabaseError> {
        let mut players = self.tables.lock().await.players.clone();
        players.sort_by(|a, b| a.is_deleted.cmp(&b.is_deleted).then_with(|| by_name(a, b)));
        Ok(players)
    }

    async fn active_players(&self) -> Result<Vec<Player>, DatabaseError> {
        let mut players: Vec<Player> = self
            .tables
            .lock()
            .await
            .players
            .iter()
            .filter(|p| !p.is_deleted)
            .cloned()
            .collect();
        players.sort_by(by_name);
        Ok(players)
    }

    async fn find_player_by_name(&self, name: &str) -> Result<Option<Player>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables.players.iter().find(|p| p.has_name(name)).cloned())
    }

    async fn players_for_game(&self, game_id: i64) -> Result<Vec<Player>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .scores
            .iter()
            .filter(|s| s.game_id == game_id)
            .filter_map(|s| tables.players.iter().find(|p| p.id == s.player_id))
            .cloned()
            .collect())
    }

    async fn create_game(
        &self,
        started_at: DateTime<Utc>,
        player_ids: &[i64],
    ) -> Result<(Game, Vec<ScoreEntry>), DatabaseError> {
        let mut tables = self.tables.lock().await;
        if let Some(&missing) = player_ids
            .iter()
            .find(|&&id| !tables.players.iter().any(|p| p.id == id))
        {
            return Err(DatabaseError::PlayerNotFound(missing));
        }

        tables.last_game_id += 1;
        let game = Game {
            id: tables.last_game_id,
            started_at,
            is_finished: false,
        };
        tables.games.push(game.clone());

        let mut entries = Vec::with_capacity(player_ids.len());
        for &player_id in player_ids {
            tables.last_score_id += 1;
            let entry = ScoreEntry::new(tables.last_score_id, game.id, player_id);
            tables.scores.push(entry.clone());
            entries.push(entry);
        }
        Ok((game, entries))
    }

    async fn delete_game(&self, game_id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        tables.scores.retain(|s| s.game_id != game_id);
        tables.games.retain(|g| g.id != game_id);
        Ok(())
    }

    async fn mark_game_finished(&self, game_id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        let game = tables
            .games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or(DatabaseError::GameNotFound(game_id))?;
        game.is_finished = true;
        Ok(())
    }

    async fn latest_unfinished_game(&self) -> Result<Option<Game>, DatabaseError> {
        let mut games: Vec<Game> = self
            .tables
            .lock()
            .await
            .games
            .iter()
            .filter(|g| !g.is_finished)
            .cloned()
            .collect();
        newest_first(&mut games);
        Ok(games.into_iter().next())
    }

    async fn finished_games(&self) -> Result<Vec<Game>, DatabaseError> {
        let mut games: Vec<Game> = self
            .tables
            .lock()
            .await
            .games
            .iter()
            .filter(|g| g.is_finished)
            .cloned()
            .collect();
        newest_first(&mut games);
        Ok(games)
    }

    async fn update_score_entry(&self, entry: &ScoreEntry) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        if let Some(row) = tables.scores.iter_mut().find(|s| s.id == entry.id) {
            *row = entry.clone();
        }
        Ok(())
    }

    async fn score_entries(&self, game_id: i64) -> Result<Vec<ScoreEntry>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .scores
            .iter()
            .filter(|s| s.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn scores_with_players(
        &self,
        game_id: i64,
    ) -> Result<Vec<ScoredPlayer>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .scores
            .iter()
            .filter(|s| s.game_id == game_id)
            .filter_map(|s| {
                tables
                    .players
                    .iter()
                    .find(|p| p.id == s.player_id)
                    .map(|player| ScoredPlayer {
                        score: s.clone(),
                        player: player.clone(),
                    })
            })
            .collect())
    }
}
