//! Typed per-ability scratch values.
//!
//! A trigger sometimes learns something at match time that its effect needs
//! later (the controller of the creature that dealt damage, for instance).
//! The matcher stores it here keyed by the ability id together with the turn,
//! and the effect reads it back when it applies. One-shot effects only see
//! values stored in the current turn; a lasting effect (a control change)
//! keeps reading its value until the source changes zones, which clears it.
//! Values are overwritten by the next trigger of the same ability and are part
//! of the game snapshot, so rollbacks restore them.

use serde::{Deserialize, Serialize};

use super::{AbilityId, ObjectId, PlayerId};

/// A value stashed by a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideValue {
    Player(PlayerId),
    Object(ObjectId),
    Amount(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SideEntry {
    value: SideValue,
    turn: u32,
}

/// Stash of trigger-time values keyed by ability.
#[derive(Clone, Debug, Default)]
pub struct SideChannel {
    values: im::HashMap<AbilityId, SideEntry>,
}

impl SideChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `ability`, replacing any previous value.
    pub fn set(&mut self, ability: AbilityId, value: SideValue, turn: u32) {
        self.values.insert(ability, SideEntry { value, turn });
    }

    #[must_use]
    pub fn get(&self, ability: AbilityId) -> Option<SideValue> {
        self.values.get(&ability).map(|e| e.value)
    }

    /// The stashed player, if the stored value is a player.
    #[must_use]
    pub fn player(&self, ability: AbilityId) -> Option<PlayerId> {
        match self.get(ability)? {
            SideValue::Player(p) => Some(p),
            _ => None,
        }
    }

    /// The value, if it was stored during `turn`.
    #[must_use]
    pub fn get_in_turn(&self, ability: AbilityId, turn: u32) -> Option<SideValue> {
        self.values
            .get(&ability)
            .filter(|e| e.turn == turn)
            .map(|e| e.value)
    }

    /// Drop every value belonging to one of `abilities`.
    pub fn remove_all(&mut self, abilities: impl IntoIterator<Item = AbilityId>) {
        for ability in abilities {
            self.values.remove(&ability);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
