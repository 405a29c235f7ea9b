use database::ScoreStore;
use types::{Player, Selection};

use crate::{EngineError, ScoreEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryOutcome {
    NoActiveGame,
    /// The unfinished game is current again, with its players selected in sheet order.
    Resumed { game_id: i64, players: Vec<Player> },
    /// The unfinished game had no resolvable players and was deleted.
    DiscardedOrphan(i64),
    /// The store failed; the engine carries on without an active game.
    Failed,
    /// Recovery already ran for this engine.
    Skipped,
}

impl<S: ScoreStore> ScoreEngine<S> {
    /// Resumes the most recently started unfinished game, once per engine.
    ///
    /// Players are resolved by id, soft-deleted ones included, so a player deleted mid-game
    /// stays on the sheet. Entries whose player no longer exists are dropped from the
    /// selection; a game left with no players at all is deleted.
    pub async fn recover(&mut self) -> RecoveryOutcome {
        if !self.is_initializing.get() {
            log::debug!("Startup recovery already ran, skipping");
            return RecoveryOutcome::Skipped;
        }

        let outcome = match self.resume_unfinished_game().await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Error while resuming unfinished game: {e}");
                RecoveryOutcome::Failed
            }
        };
        self.is_initializing.set(false);
        outcome
    }

    async fn resume_unfinished_game(&mut self) -> Result<RecoveryOutcome, EngineError> {
        log::debug!("Checking for unfinished games...");
        let Some(game) = self.store.latest_unfinished_game().await? else {
            return Ok(RecoveryOutcome::NoActiveGame);
        };

        let entries = self.store.score_entries(game.id).await?;
        let players = self.store.players_for_game(game.id).await?;
        let ordered: Vec<Player> = entries
            .iter()
            .filter_map(|entry| players.iter().find(|p| p.id == entry.player_id))
            .cloned()
            .collect();

        if ordered.is_empty() {
            log::info!("Game {} had no players, deleting it", game.id);
            self.store.delete_game(game.id).await?;
            return Ok(RecoveryOutcome::DiscardedOrphan(game.id));
        }

        log::info!(
            "Resuming unfinished game {} with {} players",
            game.id,
            ordered.len()
        );
        let selection = Selection::from_players(ordered);
        let players = selection.players().to_vec();
        self.selection.set(selection);
        self.current_scores.set(entries);
        self.current_game.set(Some(game.id));
        Ok(RecoveryOutcome::Resumed {
            game_id: game.id,
            players,
        })
    }
}
