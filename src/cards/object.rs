//! Game objects - runtime card state.
//!
//! A `GameObject` is one card in one game: a private copy of its definition's
//! characteristics and abilities plus the state that changes during play.
//! Every zone change makes it a new object as far as the rules are concerned;
//! the zone-change counter tells incarnations apart.

use serde::{Deserialize, Serialize};

use super::characteristics::{Characteristics, Counters};
use super::definition::CardDefinition;
use crate::abilities::{Ability, KickerAbility};
use crate::core::{AbilityId, ObjectId, PlayerId};
use crate::zones::Zone;

/// A card in a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: ObjectId,
    pub owner: PlayerId,
    /// Controller before continuous effects.
    pub controller: PlayerId,
    pub base: Characteristics,
    pub abilities: Vec<Ability>,
    pub zone: Zone,
    /// Incremented on every zone change.
    pub zone_change_counter: u32,
    /// When the object last entered its zone.
    pub timestamp: u64,
    pub counters: Counters,
    pub tapped: bool,
    pub attacking: bool,
}

impl GameObject {
    /// Instantiate a definition. Abilities stay unbound until the game binds them.
    #[must_use]
    pub fn new(id: ObjectId, owner: PlayerId, definition: &CardDefinition) -> Self {
        Self {
            id,
            owner,
            controller: owner,
            base: definition.characteristics.clone(),
            abilities: definition.abilities.clone(),
            zone: Zone::Library,
            zone_change_counter: 0,
            timestamp: 0,
            counters: Counters::default(),
            tapped: false,
            attacking: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.base.name
    }

    #[must_use]
    pub fn ability(&self, id: AbilityId) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.id == id)
    }

    pub fn ability_mut(&mut self, id: AbilityId) -> Option<&mut Ability> {
        self.abilities.iter_mut().find(|a| a.id == id)
    }

    /// The object's kicker, if it has one.
    #[must_use]
    pub fn kicker(&self) -> Option<&KickerAbility> {
        self.abilities.iter().find_map(Ability::kicker_ability)
    }

    pub fn kicker_mut(&mut self) -> Option<&mut KickerAbility> {
        self.abilities.iter_mut().find_map(Ability::kicker_ability_mut)
    }

    /// Clear per-incarnation state when leaving a zone.
    pub(crate) fn reset_for_zone_change(&mut self) {
        self.controller = self.owner;
        self.counters.clear();
        self.tapped = false;
        self.attacking = false;
    }
}

impl std::fmt::Display for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.base.name, self.id)
    }
}
