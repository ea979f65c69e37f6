//! Engine error types.
//!
//! Errors split into two families:
//!
//! - **Fatal** invariant violations (`InvariantViolation`,
//!   `KickerSourceMissing`). The current ability resolution is aborted and the
//!   deployment decides whether to abort or roll back the whole match.
//! - **Rejections** of a player action (not enough mana, illegal target, ...).
//!   The action is rolled back and the game continues.
//!
//! Stale references (an effect whose source has vanished) are never errors:
//! the effect discards itself and does nothing.

use thiserror::Error;

use crate::core::{AbilityId, ObjectId, PlayerId};
use crate::zones::Zone;

/// Errors surfaced by the rules engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("kicker source {0} not found while recording its zone-change counter")]
    KickerSourceMissing(ObjectId),

    #[error("{0} not found")]
    ObjectNotFound(ObjectId),

    #[error("{0} not found")]
    PlayerNotFound(PlayerId),

    #[error("{0} not found")]
    AbilityNotFound(AbilityId),

    #[error("{object} is in {actual:?}, expected {expected:?}")]
    WrongZone {
        object: ObjectId,
        expected: Zone,
        actual: Zone,
    },

    #[error("{player} cannot pay {cost}")]
    InsufficientMana { player: PlayerId, cost: String },

    #[error("cost cannot be paid: {0}")]
    CannotPayCost(String),

    #[error("invalid mana cost `{0}`")]
    InvalidManaCost(String),

    #[error("illegal target {0}")]
    IllegalTarget(ObjectId),

    #[error("{player} does not control {object}")]
    NotController { player: PlayerId, object: ObjectId },

    #[error("{0} is detained")]
    Detained(ObjectId),

    #[error("no legal targets for {0}")]
    NoLegalTargets(ObjectId),

    #[error("card `{0}` is already registered")]
    DuplicateCard(String),

    #[error("no card named `{0}`")]
    UnknownCard(String),

    #[error("{0} has left the game")]
    PlayerLeft(PlayerId),

    #[error("game is over")]
    GameOver,
}

impl EngineError {
    /// Whether this error means the game state can no longer be trusted.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation(_) | Self::KickerSourceMissing(_)
        )
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
