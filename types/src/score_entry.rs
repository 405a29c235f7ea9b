use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The seven columns of the score sheet. The tags are part of the public mutation API and must
/// not change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreCategory {
    Io,
    Europa,
    Ganymede,
    Callisto,
    Technologies,
    Achievements,
    Assistants,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 7] = [
        ScoreCategory::Io,
        ScoreCategory::Europa,
        ScoreCategory::Ganymede,
        ScoreCategory::Callisto,
        ScoreCategory::Technologies,
        ScoreCategory::Achievements,
        ScoreCategory::Assistants,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ScoreCategory::Io => "io",
            ScoreCategory::Europa => "europa",
            ScoreCategory::Ganymede => "ganymede",
            ScoreCategory::Callisto => "callisto",
            ScoreCategory::Technologies => "tech",
            ScoreCategory::Achievements => "achievements",
            ScoreCategory::Assistants => "assistants",
        }
    }

    /// Highest value a single entry may hold in this category. The lowest is always 0.
    pub fn max_value(self) -> u32 {
        match self {
            ScoreCategory::Io => 18,
            ScoreCategory::Europa => 12,
            ScoreCategory::Ganymede => 18,
            // no hard cap in the rules; 18 covers every realistic robot layout
            ScoreCategory::Callisto => 18,
            ScoreCategory::Technologies => 8,
            ScoreCategory::Achievements => 20,
            // 6 assistants at 5 points each
            ScoreCategory::Assistants => 30,
        }
    }

    pub fn accepts(self, value: i64) -> bool {
        (0..=i64::from(self.max_value())).contains(&value)
    }
}

impl Display for ScoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown score category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ScoreCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoreCategory::ALL
            .into_iter()
            .find(|category| category.tag() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One player's row on the score sheet of one game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
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

impl ScoreEntry {
    pub fn new(id: i64, game_id: i64, player_id: i64) -> Self {
        Self {
            id,
            game_id,
            player_id,
            ..Default::default()
        }
    }

    pub fn get(&self, category: ScoreCategory) -> u32 {
        match category {
            ScoreCategory::Io => self.io,
            ScoreCategory::Europa => self.europa,
            ScoreCategory::Ganymede => self.ganymede,
            ScoreCategory::Callisto => self.callisto,
            ScoreCategory::Technologies => self.technologies,
            ScoreCategory::Achievements => self.achievements,
            ScoreCategory::Assistants => self.assistants,
        }
    }

    /// Returns a copy with `category` set to `value`, or `None` when the value is outside the
    /// category's range.
    pub fn with_score(&self, category: ScoreCategory, value: i64) -> Option<Self> {
        if !category.accepts(value) {
            return None;
        }
        let value = u32::try_from(value).ok()?;
        let mut updated = self.clone();
        let slot = match category {
            ScoreCategory::Io => &mut updated.io,
            ScoreCategory::Europa => &mut updated.europa,
            ScoreCategory::Ganymede => &mut updated.ganymede,
            ScoreCategory::Callisto => &mut updated.callisto,
            ScoreCategory::Technologies => &mut updated.technologies,
            ScoreCategory::Achievements => &mut updated.achievements,
            ScoreCategory::Assistants => &mut updated.assistants,
        };
        *slot = value;
        Some(updated)
    }

    pub fn total(&self) -> u32 {
        ScoreCategory::ALL
            .into_iter()
            .map(|category| self.get(category))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tags_parse() {
        for category in ScoreCategory::ALL {
            assert_eq!(category.tag().parse::<ScoreCategory>(), Ok(category));
        }
        assert_eq!("tech".parse::<ScoreCategory>(), Ok(ScoreCategory::Technologies));
        assert!("technologies".parse::<ScoreCategory>().is_err());
        assert!("IO".parse::<ScoreCategory>().is_err());
    }

    #[test]
    fn test_category_bounds() {
        let bounds = [
            (ScoreCategory::Io, 18),
            (ScoreCategory::Europa, 12),
            (ScoreCategory::Ganymede, 18),
            (ScoreCategory::Callisto, 18),
            (ScoreCategory::Technologies, 8),
            (ScoreCategory::Achievements, 20),
            (ScoreCategory::Assistants, 30),
        ];
        for (category, max) in bounds {
            assert!(category.accepts(0));
            assert!(category.accepts(max));
            assert!(!category.accepts(max + 1), "{category} accepted {}", max + 1);
            assert!(!category.accepts(-1));
        }
    }

    #[test]
    fn test_with_score_sets_only_that_category() {
        let entry = ScoreEntry::new(1, 1, 1);
        let updated = entry.with_score(ScoreCategory::Europa, 12).unwrap();
        assert_eq!(updated.europa, 12);
        assert_eq!(updated.total(), 12);
        assert_eq!(updated.id, entry.id);
    }

    #[test]
    fn test_with_score_rejects_out_of_range() {
        let entry = ScoreEntry::new(1, 1, 1)
            .with_score(ScoreCategory::Technologies, 5)
            .unwrap();
        assert_eq!(entry.with_score(ScoreCategory::Technologies, 9), None);
        assert_eq!(entry.with_score(ScoreCategory::Technologies, -3), None);
        assert_eq!(entry.technologies, 5);
    }

    #[test]
    fn test_total_sums_all_categories() {
        let entry = ScoreEntry {
            io: 1,
            europa: 2,
            ganymede: 3,
            callisto: 4,
            technologies: 5,
            achievements: 6,
            assistants: 7,
            ..ScoreEntry::new(1, 2, 3)
        };
        assert_eq!(entry.total(), 28);
        assert_eq!(ScoreEntry::new(1, 2, 3).total(), 0);
    }
}
