//! Core engine types: ids, players, configuration, turn structure, state.
//!
//! Everything here is game-rule agnostic plumbing; the MTG-specific behaviour
//! lives in `layers`, `triggers`, `abilities` and `game`.

pub mod config;
pub mod ids;
pub mod player;
pub mod side_channel;
pub mod state;
pub mod turn;

pub use config::GameConfig;
pub use ids::{AbilityId, EffectId, ObjectId, StackEntryId};
pub use player::{Player, PlayerId, PlayerMap};
pub use side_channel::{SideChannel, SideValue};
pub use state::{GameState, ZoneTransition};
pub use turn::{Step, TurnState};
