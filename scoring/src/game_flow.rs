use chrono::Utc;
use database::ScoreStore;
use types::{Game, ScoreCategory, ScoreEntry};

use crate::{EngineError, ScoreEngine};

impl<S: ScoreStore> ScoreEngine<S> {
    /// Starts a game for the selected players, creating their score entries in selection order.
    ///
    /// Any non-empty selection is accepted; requiring at least two players is left to the caller.
    pub async fn start_new_game(&mut self) -> Result<Game, EngineError> {
        if let Some(game_id) = self.current_game.get() {
            return Err(EngineError::GameInProgress(game_id));
        }
        let player_ids = self.selection.with(|s| s.player_ids());
        if player_ids.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let (game, entries) = self.store.create_game(Utc::now(), &player_ids).await?;
        log::info!(
            "Started game {} with {} players",
            game.id,
            player_ids.len()
        );

        self.current_scores.set(entries);
        self.current_game.set(Some(game.id));
        Ok(game)
    }

    /// Sets one category of a current-game entry, addressed by its tag (`"io"`, `"tech"`, ...).
    ///
    /// Unknown tags and out-of-range values leave the entry as it was and return it unchanged.
    pub async fn update_score(
        &mut self,
        entry: &ScoreEntry,
        category: &str,
        new_value: i64,
    ) -> Result<ScoreEntry, EngineError> {
        match category.parse::<ScoreCategory>() {
            Ok(category) => self.set_score(entry, category, new_value).await,
            Err(e) => {
                log::warn!("{e}, ignoring update of entry {}", entry.id);
                Ok(entry.clone())
            }
        }
    }

    pub async fn set_score(
        &mut self,
        entry: &ScoreEntry,
        category: ScoreCategory,
        new_value: i64,
    ) -> Result<ScoreEntry, EngineError> {
        // the published copy is authoritative, the caller's may be stale
        let current = self
            .current_scores
            .with(|scores| scores.iter().find(|e| e.id == entry.id).cloned());
        let Some(current) = current else {
            log::warn!(
                "Entry {} is not part of the current game, ignoring update",
                entry.id
            );
            return Ok(entry.clone());
        };

        let Some(updated) = current.with_score(category, new_value) else {
            log::debug!("Rejected {new_value} for {category} on entry {}", entry.id);
            return Ok(current);
        };

        self.store.update_score_entry(&updated).await?;
        self.current_scores.modify(|scores| {
            if let Some(slot) = scores.iter_mut().find(|e| e.id == updated.id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    /// Marks the current game finished and clears it. Returns the finished game's id.
    pub async fn finish_game(&mut self) -> Result<Option<i64>, EngineError> {
        let Some(game_id) = self.current_game.get() else {
            return Ok(None);
        };
        self.store.mark_game_finished(game_id).await?;
        log::info!("Finished game {game_id}");

        self.current_game.set(None);
        self.current_scores.set(Vec::new());
        if let Err(e) = self.history.refresh().await {
            log::error!("Failed to reload history after finishing game {game_id}: {e}");
        }
        Ok(Some(game_id))
    }

    /// Deletes the current game with all its score entries. Returns the deleted game's id.
    pub async fn cancel_game(&mut self) -> Result<Option<i64>, EngineError> {
        let Some(game_id) = self.current_game.get() else {
            return Ok(None);
        };
        self.store.delete_game(game_id).await?;
        log::info!("Cancelled game {game_id}");

        self.current_game.set(None);
        self.current_scores.set(Vec::new());
        Ok(Some(game_id))
    }

    /// Whether anyone has scored in the current game, i.e. whether cancelling loses anything.
    pub fn has_any_scores(&self) -> bool {
        self.current_scores
            .with(|scores| scores.iter().any(|e| e.total() > 0))
    }

    /// Whether every player in the current game has scored at least one point.
    pub fn all_players_scored(&self) -> bool {
        self.current_scores
            .with(|scores| !scores.is_empty() && scores.iter().all(|e| e.total() > 0))
    }
}
