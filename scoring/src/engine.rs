use std::sync::Arc;

use database::ScoreStore;
use tokio::sync::watch;
use types::{AddPlayerResult, Player, PlayerName, ScoreEntry, Selection};

use crate::{EngineError, HistoryBrowser, Observable};

/// Single source of truth for who is playing and which game, if any, is in progress.
///
/// Mutations take `&mut self` so they run one at a time in the order they are issued. Everything
/// the presentation layer renders is published through [`Observable`]s and can be followed with
/// the `subscribe_*` methods.
pub struct ScoreEngine<S> {
    pub(crate) store: Arc<S>,
    pub(crate) selection: Observable<Selection>,
    pub(crate) current_game: Observable<Option<i64>>,
    pub(crate) current_scores: Observable<Vec<ScoreEntry>>,
    pub(crate) is_initializing: Observable<bool>,
    all_players: Observable<Vec<Player>>,
    active_players: Observable<Vec<Player>>,
    pub(crate) history: HistoryBrowser<S>,
}

impl<S: ScoreStore> ScoreEngine<S> {
    /// Builds an engine that has not looked at the store yet. Most callers want [`Self::start`].
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            history: HistoryBrowser::new(store.clone()),
            store,
            selection: Observable::new(Selection::new()),
            current_game: Observable::new(None),
            current_scores: Observable::new(Vec::new()),
            is_initializing: Observable::new(true),
            all_players: Observable::new(Vec::new()),
            active_players: Observable::new(Vec::new()),
        }
    }

    /// Loads the player lists and resumes any unfinished game. Never fails: store errors are
    /// logged and the engine starts without an active game.
    pub async fn start(store: S) -> Self {
        let mut engine = Self::new(store);
        if let Err(e) = engine.refresh_players().await {
            log::error!("Failed to load players: {e}");
        }
        engine.recover().await;
        engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history(&self) -> &HistoryBrowser<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryBrowser<S> {
        &mut self.history
    }

    pub fn selection(&self) -> Selection {
        self.selection.get()
    }

    pub fn current_game_id(&self) -> Option<i64> {
        self.current_game.get()
    }

    pub fn current_scores(&self) -> Vec<ScoreEntry> {
        self.current_scores.get()
    }

    pub fn is_initializing(&self) -> bool {
        self.is_initializing.get()
    }

    pub fn all_players(&self) -> Vec<Player> {
        self.all_players.get()
    }

    pub fn active_players(&self) -> Vec<Player> {
        self.active_players.get()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<Selection> {
        self.selection.subscribe()
    }

    pub fn subscribe_current_game(&self) -> watch::Receiver<Option<i64>> {
        self.current_game.subscribe()
    }

    pub fn subscribe_current_scores(&self) -> watch::Receiver<Vec<ScoreEntry>> {
        self.current_scores.subscribe()
    }

    pub fn subscribe_initializing(&self) -> watch::Receiver<bool> {
        self.is_initializing.subscribe()
    }

    pub fn subscribe_all_players(&self) -> watch::Receiver<Vec<Player>> {
        self.all_players.subscribe()
    }

    pub fn subscribe_active_players(&self) -> watch::Receiver<Vec<Player>> {
        self.active_players.subscribe()
    }

    pub async fn refresh_players(&mut self) -> Result<(), EngineError> {
        self.all_players.set(self.store.all_players().await?);
        self.active_players.set(self.store.active_players().await?);
        Ok(())
    }

    /// Creates a player and selects it if there is room.
    ///
    /// Fails with [`EngineError::InvalidName`] before touching the store when the name is blank
    /// or too long.
    pub async fn add_player(&mut self, name: &str) -> Result<AddPlayerResult, EngineError> {
        let name = PlayerName::parse(name)?;

        if let Some(conflict) = self.name_conflict(&name, None).await? {
            return Ok(conflict);
        }

        let Some(player) = self.store.insert_player(&name).await? else {
            return Ok(AddPlayerResult::AlreadyExists);
        };
        log::info!("Added player {} ({})", player.name, player.id);

        self.selection.modify(|s| s.toggle(&player));
        self.reload_after_player_change().await;
        Ok(AddPlayerResult::Success(player))
    }

    /// Renames a player, keeping its place in the selection if it is selected.
    pub async fn update_player_name(
        &mut self,
        player: &Player,
        new_name: &str,
    ) -> Result<AddPlayerResult, EngineError> {
        let name = PlayerName::parse(new_name)?;

        if let Some(conflict) = self.name_conflict(&name, Some(player.id)).await? {
            return Ok(conflict);
        }

        let updated = player.with_name(&name);
        self.store.update_player(&updated).await?;
        log::info!("Renamed player {} to {}", player.name, updated.name);

        self.selection.modify(|s| {
            s.replace(&updated);
        });
        self.reload_after_player_change().await;
        Ok(AddPlayerResult::Success(updated))
    }

    /// Deselects and soft-deletes a player. Score entries already recorded for it are untouched.
    pub async fn delete_player(&mut self, player: &Player) -> Result<(), EngineError> {
        self.selection.modify(|s| {
            s.remove(player.id);
        });
        self.store.soft_delete_player(player.id).await?;
        log::info!("Deleted player {} ({})", player.name, player.id);
        self.reload_after_player_change().await;
        Ok(())
    }

    /// Clears the soft-delete flag. The player is not re-selected.
    pub async fn restore_player(&mut self, player: &Player) -> Result<(), EngineError> {
        self.store.restore_player(player.id).await?;
        log::info!("Restored player {} ({})", player.name, player.id);
        self.reload_after_player_change().await;
        Ok(())
    }

    /// Republishes everything that shows player names or deleted flags, history included.
    ///
    /// Runs after the change is committed, so failures are logged rather than returned.
    async fn reload_after_player_change(&mut self) {
        if let Err(e) = self.refresh_players().await {
            log::error!("Failed to reload players: {e}");
        }
        if let Err(e) = self.history.reload_players().await {
            log::error!("Failed to reload history after player change: {e}");
        }
    }

    pub fn toggle_player_selection(&mut self, player: &Player) {
        self.selection.modify(|s| s.toggle(player));
    }

    async fn name_conflict(
        &self,
        name: &PlayerName,
        own_id: Option<i64>,
    ) -> Result<Option<AddPlayerResult>, EngineError> {
        let existing = self.store.find_player_by_name(name.as_str()).await?;
        Ok(match existing {
            Some(existing) if Some(existing.id) == own_id => None,
            Some(existing) if existing.is_deleted => Some(AddPlayerResult::DeletedExists(existing)),
            Some(_) => Some(AddPlayerResult::AlreadyExists),
            None => None,
        })
    }
}
