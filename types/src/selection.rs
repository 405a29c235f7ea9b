use itertools::Itertools;

use crate::Player;

pub const MAX_SELECTED_PLAYERS: usize = 4;

/// Players picked for the next game, in the order they were picked.
///
/// The order carries through to the score entries created at game start, so it is never
/// re-sorted. Membership is by player id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    players: Vec<Player>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from players in the given order, keeping the first
    /// [`MAX_SELECTED_PLAYERS`] distinct ids.
    pub fn from_players(players: impl IntoIterator<Item = Player>) -> Self {
        let players = players
            .into_iter()
            .unique_by(|p| p.id)
            .take(MAX_SELECTED_PLAYERS)
            .collect();
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_ids(&self) -> Vec<i64> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_SELECTED_PLAYERS
    }

    pub fn contains(&self, player_id: i64) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Removes the player if selected, otherwise appends it when there is room.
    pub fn toggle(&mut self, player: &Player) {
        if self.contains(player.id) {
            self.remove(player.id);
        } else if !self.is_full() {
            self.players.push(player.clone());
        } else {
            log::debug!(
                "Selection is full, ignoring {}: {}",
                player.name,
                self.players.iter().map(|p| &p.name).join(", ")
            );
        }
    }

    pub fn remove(&mut self, player_id: i64) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.players.len() != before
    }

    /// Swaps in a fresh copy of an already selected player without moving it.
    pub fn replace(&mut self, player: &Player) -> bool {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(slot) => {
                *slot = player.clone();
                true
            }
            None => false,
        }
    }
}
