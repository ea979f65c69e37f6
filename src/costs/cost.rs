//! Costs: mana and the non-mana costs abilities may carry.

use serde::{Deserialize, Serialize};

use super::ManaCost;
use crate::cards::CardType;
use crate::core::{GameState, ObjectId, PlayerId};
use crate::effects::{FilterContext, ObjectFilter};
use crate::error::{EngineError, Result};
use crate::zones::Zone;

/// A single cost component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    Mana(ManaCost),
    /// `{T}`: tap the source permanent.
    TapSource,
    /// Sacrifice the source permanent.
    SacrificeSource,
    /// Sacrifice a permanent of the payer's choice matching the filter.
    Sacrifice(ObjectFilter),
    PayLife(u32),
}

impl Cost {
    /// Parse a mana cost into a `Cost::Mana`.
    pub fn mana(text: &str) -> Result<Cost> {
        ManaCost::parse(text).map(Cost::Mana)
    }

    #[must_use]
    pub fn as_mana(&self) -> Option<&ManaCost> {
        match self {
            Cost::Mana(cost) => Some(cost),
            _ => None,
        }
    }

    /// Rules text of this cost.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Cost::Mana(cost) => cost.to_string(),
            Cost::TapSource => "{T}".to_string(),
            Cost::SacrificeSource => "Sacrifice this permanent".to_string(),
            Cost::Sacrifice(filter) if filter.card_types.contains(&CardType::Creature) => {
                "Sacrifice a creature".to_string()
            }
            Cost::Sacrifice(_) => "Sacrifice a permanent".to_string(),
            Cost::PayLife(n) => format!("Pay {} life", n),
        }
    }

    /// Permanents `player` could sacrifice to pay this cost, in id order.
    #[must_use]
    pub fn sacrifice_candidates(&self, state: &GameState, source: ObjectId, player: PlayerId) -> Vec<ObjectId> {
        let Cost::Sacrifice(filter) = self else {
            return Vec::new();
        };
        let ctx = FilterContext::new(source, player);
        state
            .objects_in(Zone::Battlefield)
            .into_iter()
            .filter(|id| state.view(*id).is_some_and(|v| v.controller == player && filter.matches(&v, &ctx)))
            .collect()
    }

    /// Whether a non-mana cost can be paid right now.
    ///
    /// Mana costs are checked against the pool by the caller together with
    /// every other mana the ability needs, so they always answer `true` here.
    #[must_use]
    pub fn can_pay(&self, state: &GameState, source: ObjectId, player: PlayerId) -> bool {
        match self {
            Cost::Mana(_) => true,
            Cost::TapSource => state
                .object(source)
                .is_some_and(|o| o.zone == Zone::Battlefield && !o.tapped),
            Cost::SacrificeSource => state
                .object(source)
                .is_some_and(|o| o.zone == Zone::Battlefield),
            Cost::Sacrifice(_) => !self.sacrifice_candidates(state, source, player).is_empty(),
            Cost::PayLife(n) => state
                .player(player)
                .is_some_and(|p| p.life >= i64::from(*n)),
        }
    }

    /// Pay a non-mana cost. A sacrifice takes the first candidate; the game
    /// asks the player instead.
    pub fn pay(&self, state: &mut GameState, source: ObjectId, player: PlayerId) -> Result<()> {
        if !self.can_pay(state, source, player) {
            return Err(EngineError::CannotPayCost(self.text()));
        }
        match self {
            Cost::Mana(cost) => {
                let pool = &mut state
                    .player_mut(player)
                    .ok_or(EngineError::PlayerNotFound(player))?
                    .mana_pool;
                if !pool.pay(cost) {
                    return Err(EngineError::InsufficientMana {
                        player,
                        cost: cost.to_string(),
                    });
                }
            }
            Cost::TapSource => {
                if let Some(object) = state.object_mut(source) {
                    object.tapped = true;
                }
            }
            Cost::SacrificeSource => {
                state.move_object(source, Zone::Graveyard)?;
            }
            Cost::Sacrifice(_) => {
                if let Some(&victim) = self.sacrifice_candidates(state, source, player).first() {
                    state.move_object(victim, Zone::Graveyard)?;
                }
            }
            Cost::PayLife(n) => {
                state.lose_life(player, i64::from(*n))?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}
