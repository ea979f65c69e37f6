//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card: its printed
//! characteristics and ability templates. Filters and effects are embedded as
//! values, so every game instantiating the card gets its own copy and no
//! state is shared between games.
//!
//! Instance-specific data (zone, counters, kicked status) lives on the
//! `GameObject` created from the definition.

use serde::{Deserialize, Serialize};

use super::characteristics::{CardType, Characteristics, ColorSet, Keyword};
use crate::abilities::{Ability, AbilityKind};
use crate::costs::ManaCost;

/// Static card definition.
///
/// ## Example
///
/// ```
/// use mtg_engine::cards::{CardDefinition, CardType, Color};
/// use mtg_engine::costs::ManaCost;
///
/// let bears = CardDefinition::new("Grizzly Bears")
///     .with_mana_cost(ManaCost::parse("{1}{G}").unwrap())
///     .with_type(CardType::Creature)
///     .with_subtype("Bear")
///     .with_pt(2, 2);
///
/// assert!(bears.characteristics.colors.has(Color::Green));
/// assert_eq!(bears.characteristics.power, Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub characteristics: Characteristics,
    /// Unbound ability templates.
    pub abilities: Vec<Ability>,
}

impl CardDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            characteristics: Characteristics::named(name),
            abilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.characteristics.name
    }

    /// Set the mana cost; the card's colors follow the cost.
    #[must_use]
    pub fn with_mana_cost(mut self, cost: ManaCost) -> Self {
        self.characteristics.colors = cost.colors();
        self.characteristics.mana_cost = Some(cost);
        self
    }

    /// Override the colors (e.g. color indicators, colorless costs).
    #[must_use]
    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.characteristics.colors = colors;
        self
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.characteristics.add_type(card_type);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.characteristics.add_subtype(subtype);
        self
    }

    #[must_use]
    pub fn with_pt(mut self, power: i32, toughness: i32) -> Self {
        self.characteristics.power = Some(power);
        self.characteristics.toughness = Some(toughness);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.characteristics.add_keyword(keyword);
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    /// The spell ability of an instant or sorcery.
    #[must_use]
    pub fn spell_ability(&self) -> Option<&Ability> {
        self.abilities
            .iter()
            .find(|a| matches!(a.kind, AbilityKind::Spell))
    }
}
