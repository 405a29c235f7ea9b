pub mod game;
pub mod player;
pub mod score_entry;
pub mod selection;

pub use game::{compute_outcome, Game, GameHistory, GameOutcome, ScoredPlayer};
pub use player::{name_key, AddPlayerResult, NameError, Player, PlayerName, MAX_NAME_LENGTH};
pub use score_entry::{ScoreCategory, ScoreEntry, UnknownCategory};
pub use selection::{Selection, MAX_SELECTED_PLAYERS};
