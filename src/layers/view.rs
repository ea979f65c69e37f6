//! Computed object views.
//!
//! An `ObjectView` is what the rest of the engine sees of an object: its base
//! values with every applicable continuous effect applied.

use serde::{Deserialize, Serialize};

use crate::abilities::Ability;
use crate::cards::{Characteristics, Counters, GameObject, Keyword};
use crate::core::{AbilityId, ObjectId, PlayerId};
use crate::zones::Zone;

/// An object as currently modified by continuous effects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectView {
    pub id: ObjectId,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub zone: Zone,
    pub zone_change_counter: u32,
    pub timestamp: u64,
    pub characteristics: Characteristics,
    pub counters: Counters,
    pub tapped: bool,
    pub attacking: bool,
    /// Set by an effect that removes all abilities.
    pub lost_all_abilities: bool,
    /// Abilities granted by continuous effects, bound to this object.
    pub granted: Vec<Ability>,
    pub detained: bool,
}

impl ObjectView {
    /// The unmodified view of an object.
    #[must_use]
    pub fn from_object(object: &GameObject) -> Self {
        Self {
            id: object.id,
            owner: object.owner,
            controller: object.controller,
            zone: object.zone,
            zone_change_counter: object.zone_change_counter,
            timestamp: object.timestamp,
            characteristics: object.base.clone(),
            counters: object.counters.clone(),
            tapped: object.tapped,
            attacking: object.attacking,
            lost_all_abilities: false,
            granted: Vec::new(),
            detained: false,
        }
    }

    /// A granted ability by id.
    #[must_use]
    pub fn granted_ability(&self, id: AbilityId) -> Option<&Ability> {
        self.granted.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.characteristics.name
    }

    #[must_use]
    pub fn power(&self) -> Option<i32> {
        self.characteristics.power
    }

    #[must_use]
    pub fn toughness(&self) -> Option<i32> {
        self.characteristics.toughness
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.characteristics.has_keyword(keyword)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.characteristics.is_creature()
    }
}
