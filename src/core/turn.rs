//! Turn structure: steps and the turn cursor.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Steps of a turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    PrecombatMain,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    PostcombatMain,
    End,
    Cleanup,
}

impl Step {
    /// Every step in turn order.
    pub const ALL: [Step; 12] = [
        Step::Untap,
        Step::Upkeep,
        Step::Draw,
        Step::PrecombatMain,
        Step::BeginCombat,
        Step::DeclareAttackers,
        Step::DeclareBlockers,
        Step::CombatDamage,
        Step::EndCombat,
        Step::PostcombatMain,
        Step::End,
        Step::Cleanup,
    ];

    /// The following step, or `None` after cleanup.
    #[must_use]
    pub fn next(self) -> Option<Step> {
        let index = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// Whether sorcery-speed actions are possible in this step.
    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Step::PrecombatMain | Step::PostcombatMain)
    }
}

/// Where the game currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number (starts at 1).
    pub number: u32,
    pub active_player: PlayerId,
    pub step: Step,
}

impl TurnState {
    #[must_use]
    pub fn new(active_player: PlayerId) -> Self {
        Self {
            number: 1,
            active_player,
            step: Step::PrecombatMain,
        }
    }
}
