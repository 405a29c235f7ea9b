use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_NAME_LENGTH: usize = 25;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub is_deleted: bool,
}

impl Player {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_deleted: false,
        }
    }

    pub fn with_name(&self, name: &PlayerName) -> Self {
        Self {
            name: name.as_str().to_string(),
            ..self.clone()
        }
    }

    /// Names compare by [`name_key`], so "Émile" and "ÉMILE" are the same player.
    pub fn has_name(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}

/// Full Unicode lowercase of a name. Uniqueness and name lookups go through this key in every
/// store.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_deleted {
            write!(f, "{} (deleted)", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Player name cannot be blank")]
    Blank,

    #[error("Player name cannot exceed {MAX_NAME_LENGTH} characters (got {length})")]
    TooLong { length: usize },
}

/// A trimmed, non-blank display name of at most [`MAX_NAME_LENGTH`] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Blank);
        }
        let length = trimmed.chars().count();
        if length > MAX_NAME_LENGTH {
            return Err(NameError::TooLong { length });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn key(&self) -> String {
        name_key(&self.0)
    }
}

impl Display for PlayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of adding or renaming a player.
///
/// `DeletedExists` carries the soft-deleted player holding the name so the caller can offer to
/// restore it instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddPlayerResult {
    Success(Player),
    AlreadyExists,
    DeletedExists(Player),
}

impl AddPlayerResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AddPlayerResult::Success(_))
    }

    pub fn player(&self) -> Option<&Player> {
        match self {
            AddPlayerResult::Success(player) | AddPlayerResult::DeletedExists(player) => {
                Some(player)
            }
            AddPlayerResult::AlreadyExists => None,
        }
    }
}
