//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores the card definitions a game may instantiate,
//! keyed by card name.

use rustc_hash::FxHashMap;

use super::definition::CardDefinition;
use crate::error::{EngineError, Result};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use mtg_engine::cards::{CardDefinition, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::new("Grizzly Bears").with_type(CardType::Creature)).unwrap();
///
/// assert!(registry.get("Grizzly Bears").is_some());
/// assert!(registry.register(CardDefinition::new("Grizzly Bears")).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, CardDefinition>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition. Names must be unique.
    pub fn register(&mut self, card: CardDefinition) -> Result<()> {
        if self.cards.contains_key(card.name()) {
            return Err(EngineError::DuplicateCard(card.name().to_string()));
        }
        self.cards.insert(card.name().to_string(), card);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
