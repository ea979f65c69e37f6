//! Game configuration.
//!
//! A `GameConfig` is supplied once when a game is created. It carries the
//! table size and the knobs that bound engine loops.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Configuration for a single game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players at the table (1-255).
    pub player_count: usize,

    /// Life total each player starts with.
    pub starting_life: i64,

    /// Player who takes the first turn.
    pub starting_player: PlayerId,

    /// Upper bound on event/trigger settling rounds after a single action.
    ///
    /// Reaching the bound is logged and settling stops; the game stays usable.
    pub max_trigger_rounds: usize,

    /// Publish announced values (kicker X, ...) as public events.
    pub announce_values: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            starting_life: 20,
            starting_player: PlayerId::new(0),
            max_trigger_rounds: 64,
            announce_values: true,
        }
    }
}

impl GameConfig {
    /// Default configuration for `player_count` players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    /// Set the player who takes the first turn.
    #[must_use]
    pub fn with_starting_player(mut self, player: PlayerId) -> Self {
        self.starting_player = player;
        self
    }

    /// Set the settling bound.
    #[must_use]
    pub fn with_max_trigger_rounds(mut self, rounds: usize) -> Self {
        self.max_trigger_rounds = rounds;
        self
    }

    /// Suppress publishing of announced values.
    #[must_use]
    pub fn without_announcements(mut self) -> Self {
        self.announce_values = false;
        self
    }
}
