use chrono::{DateTime, Utc};
use types::{Game, Player, ScoreEntry, ScoredPlayer};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRecord {
    pub id: i64,
    pub name: String,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameRecord {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub is_finished: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRecord {
    pub id: i64,
    pub game_id: i64,
    pub player_id: i64,
    pub io: u32,
    pub europa: u32,
    pub ganymede: u32,
    pub callisto: u32,
    pub technologies: u32,
    pub achievements: u32,
    pub assistants: u32,
}

/// A score row joined with its player's columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoredPlayerRecord {
    #[sqlx(flatten)]
    pub score: ScoreRecord,
    pub player_name: String,
    pub player_is_deleted: bool,
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            is_deleted: record.is_deleted,
        }
    }
}

impl From<GameRecord> for Game {
    fn from(record: GameRecord) -> Self {
        Self {
            id: record.id,
            started_at: record.started_at,
            is_finished: record.is_finished,
        }
    }
}

impl From<ScoreRecord> for ScoreEntry {
    fn from(record: ScoreRecord) -> Self {
        Self {
            id: record.id,
            game_id: record.game_id,
            player_id: record.player_id,
            io: record.io,
            europa: record.europa,
            ganymede: record.ganymede,
            callisto: record.callisto,
            technologies: record.technologies,
            achievements: record.achievements,
            assistants: record.assistants,
        }
    }
}

impl From<ScoredPlayerRecord> for ScoredPlayer {
    fn from(record: ScoredPlayerRecord) -> Self {
        let player = Player {
            id: record.score.player_id,
            name: record.player_name,
            is_deleted: record.player_is_deleted,
        };
        Self {
            score: record.score.into(),
            player,
        }
    }
}
