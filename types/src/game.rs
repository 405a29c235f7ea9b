use std::fmt::Display;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Player, ScoreEntry};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub is_finished: bool,
}

/// A score entry joined with the player it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPlayer {
    pub score: ScoreEntry,
    pub player: Player,
}

impl ScoredPlayer {
    pub fn total(&self) -> u32 {
        self.score.total()
    }
}

/// A finished game with its score sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistory {
    pub game: Game,
    pub scores: Vec<ScoredPlayer>,
}

impl GameHistory {
    pub fn max_total(&self) -> u32 {
        self.scores.iter().map(ScoredPlayer::total).max().unwrap_or(0)
    }

    pub fn outcome(&self) -> GameOutcome {
        compute_outcome(&self.scores)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Nobody scored, or there was nobody to score.
    Invalid,
    Winner(ScoredPlayer),
    /// Every player sharing the top total, in sheet order.
    Draw(Vec<ScoredPlayer>),
}

impl GameOutcome {
    pub fn winners(&self) -> &[ScoredPlayer] {
        match self {
            GameOutcome::Invalid => &[],
            GameOutcome::Winner(winner) => std::slice::from_ref(winner),
            GameOutcome::Draw(winners) => winners,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, GameOutcome::Draw(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, GameOutcome::Invalid)
    }
}

impl Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::Invalid => write!(f, "No winner"),
            GameOutcome::Winner(winner) => {
                write!(f, "{} wins with {} pts", winner.player.name, winner.total())
            }
            GameOutcome::Draw(winners) => write!(
                f,
                "Draw between {} at {} pts",
                winners.iter().map(|w| &w.player.name).join(", "),
                winners.first().map(ScoredPlayer::total).unwrap_or(0)
            ),
        }
    }
}

/// Decides the result of one game's score sheet.
///
/// Every entry matching the highest total wins, so ties of any size are draws. A sheet whose
/// highest total is 0 is invalid no matter how many players it has.
pub fn compute_outcome(scores: &[ScoredPlayer]) -> GameOutcome {
    let max_total = scores.iter().map(ScoredPlayer::total).max().unwrap_or(0);
    let mut winners: Vec<ScoredPlayer> = scores
        .iter()
        .filter(|s| s.total() == max_total)
        .cloned()
        .collect();

    if max_total == 0 || winners.is_empty() {
        return GameOutcome::Invalid;
    }
    if winners.len() > 1 {
        GameOutcome::Draw(winners)
    } else {
        match winners.pop() {
            Some(winner) => GameOutcome::Winner(winner),
            None => GameOutcome::Invalid,
        }
    }
}
