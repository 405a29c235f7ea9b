use std::sync::Arc;

use database::ScoreStore;
use tokio::sync::watch;
use types::{GameHistory, ScoredPlayer};

use crate::{EngineError, Observable};

/// Read-only view over finished games.
///
/// The game list is only reloaded while somebody is watching it. Otherwise it is marked stale
/// and reloaded by the next [`HistoryBrowser::subscribe`].
pub struct HistoryBrowser<S> {
    store: Arc<S>,
    games: Observable<Vec<GameHistory>>,
    stale: bool,
    selected_game: Observable<Option<i64>>,
    selected_scores: Observable<Vec<ScoredPlayer>>,
}

impl<S: ScoreStore> HistoryBrowser<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            games: Observable::new(Vec::new()),
            stale: true,
            selected_game: Observable::new(None),
            selected_scores: Observable::new(Vec::new()),
        }
    }

    /// Loads every finished game with its scores, newest first, and publishes the list.
    pub async fn list_finished_games(&mut self) -> Result<Vec<GameHistory>, EngineError> {
        let history = self.store.game_history().await?;
        log::debug!("Loaded {} finished games", history.len());
        self.games.set(history.clone());
        self.stale = false;
        Ok(history)
    }

    pub async fn subscribe(&mut self) -> Result<watch::Receiver<Vec<GameHistory>>, EngineError> {
        if self.stale {
            self.list_finished_games().await?;
        }
        Ok(self.games.subscribe())
    }

    /// Last published list; may be stale if nobody has subscribed since the last change.
    pub fn games(&self) -> Vec<GameHistory> {
        self.games.get()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) async fn refresh(&mut self) -> Result<(), EngineError> {
        if self.games.has_observers() {
            self.list_finished_games().await?;
        } else {
            log::debug!("Nobody is watching the history, deferring reload");
            self.stale = true;
        }
        Ok(())
    }

    /// Reloads the player half of the published joins: the list (or marks it stale) and the
    /// score sheet of the game shown in detail.
    pub(crate) async fn reload_players(&mut self) -> Result<(), EngineError> {
        self.refresh().await?;
        if let Some(game_id) = self.selected_game.get() {
            let scores = self.store.scores_with_players(game_id).await?;
            self.selected_scores.set(scores);
        }
        Ok(())
    }

    /// Picks the finished game to show as a read-only score sheet, or clears the pick.
    pub async fn select_game_for_detail(&mut self, game_id: Option<i64>) -> Result<(), EngineError> {
        let scores = match game_id {
            Some(id) => self.store.scores_with_players(id).await?,
            None => Vec::new(),
        };
        self.selected_game.set(game_id);
        self.selected_scores.set(scores);
        Ok(())
    }

    pub fn selected_game(&self) -> Option<i64> {
        self.selected_game.get()
    }

    pub fn selected_scores(&self) -> Vec<ScoredPlayer> {
        self.selected_scores.get()
    }

    pub fn subscribe_selected_game(&self) -> watch::Receiver<Option<i64>> {
        self.selected_game.subscribe()
    }

    pub fn subscribe_selected_scores(&self) -> watch::Receiver<Vec<ScoredPlayer>> {
        self.selected_scores.subscribe()
    }

    /// Deletes a finished game with its scores. Ids of unfinished or unknown games are ignored.
    pub async fn delete_finished_game(&mut self, game_id: i64) -> Result<(), EngineError> {
        let finished = self.store.finished_games().await?;
        if !finished.iter().any(|g| g.id == game_id) {
            log::warn!("Game {game_id} is not a finished game, not deleting it");
            return Ok(());
        }
        self.store.delete_game(game_id).await?;
        log::info!("Deleted finished game {game_id}");

        if self.selected_game.get() == Some(game_id) {
            self.select_game_for_detail(None).await?;
        }
        self.refresh().await
    }
}
