//! The spell being cast.

use serde::{Deserialize, Serialize};

use crate::costs::{Cost, ManaCost};
use crate::core::{ObjectId, PlayerId};
use crate::effects::Target;

/// Cost assembly for one cast of a spell.
///
/// Starts with the card's mana cost; optional additional costs add to
/// `mana_to_pay` and `costs` before anything is paid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellAbility {
    pub source: ObjectId,
    pub controller: PlayerId,
    pub mana_to_pay: ManaCost,
    /// Additional non-mana costs.
    pub costs: Vec<Cost>,
    pub targets: Vec<Target>,
}

impl SpellAbility {
    #[must_use]
    pub fn new(source: ObjectId, controller: PlayerId, mana_cost: ManaCost) -> Self {
        Self {
            source,
            controller,
            mana_to_pay: mana_cost,
            costs: Vec::new(),
            targets: Vec::new(),
        }
    }
}
