//! Abilities.
//!
//! An ability is one of a small set of kinds. What the engine can do with it
//! (pay costs, check triggers, apply continuous effects...) is described by
//! its [`Capabilities`], so callers dispatch on capability instead of on a
//! deep type hierarchy.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::kicker::KickerAbility;
use crate::core::{AbilityId, ObjectId};
use crate::costs::Cost;
use crate::effects::{Condition, ContinuousEffect, Effect, TargetSpec};
use crate::triggers::TriggerSpec;
use crate::zones::Zone;

bitflags! {
    /// What an ability takes part in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Goes on the stack and resolves its effects.
        const RESOLVES = 1 << 0;
        /// Has costs a player pays to activate it.
        const PAYS_COSTS = 1 << 1;
        /// Checked against published events.
        const CHECKS_EVENTS = 1 << 2;
        /// Checked against game state after each action.
        const CHECKS_STATE = 1 << 3;
        /// Generates a continuous effect while it functions.
        const CONTINUOUS = 1 << 4;
        /// Adds optional costs while its spell is cast.
        const OPTIONAL_COSTS = 1 << 5;
        /// Resolves immediately, without using the stack.
        const IMMEDIATE = 1 << 6;
    }
}

/// A static ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticAbility {
    Continuous(ContinuousEffect),
    Kicker(KickerAbility),
}

/// Kind of ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// The effects of an instant or sorcery; empty for permanent spells.
    Spell,
    Activated,
    /// Activated ability that adds mana; never uses the stack.
    Mana,
    Triggered(TriggerSpec),
    /// Triggers whenever the condition holds and no instance is pending.
    StateTriggered(Condition),
    Static(StaticAbility),
}

impl AbilityKind {
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        match self {
            AbilityKind::Spell => Capabilities::RESOLVES,
            AbilityKind::Activated => Capabilities::RESOLVES | Capabilities::PAYS_COSTS,
            AbilityKind::Mana => Capabilities::PAYS_COSTS | Capabilities::IMMEDIATE,
            AbilityKind::Triggered(_) => Capabilities::RESOLVES | Capabilities::CHECKS_EVENTS,
            AbilityKind::StateTriggered(_) => Capabilities::RESOLVES | Capabilities::CHECKS_STATE,
            AbilityKind::Static(StaticAbility::Continuous(_)) => Capabilities::CONTINUOUS,
            AbilityKind::Static(StaticAbility::Kicker(_)) => Capabilities::OPTIONAL_COSTS,
        }
    }
}

/// An ability of an object.
///
/// Abilities on a `CardDefinition` are unbound templates; creating a game
/// object copies them and assigns each a fresh `AbilityId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub id: AbilityId,
    pub source: ObjectId,
    pub kind: AbilityKind,
    /// Zone the ability functions in.
    pub zone: Zone,
    pub costs: Vec<Cost>,
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
    /// "You may": the controller chooses on resolution.
    pub optional: bool,
    pub text: String,
}

impl Ability {
    fn of_kind(kind: AbilityKind, zone: Zone) -> Self {
        Self {
            id: AbilityId::UNBOUND,
            source: ObjectId::default(),
            kind,
            zone,
            costs: Vec::new(),
            targets: Vec::new(),
            effects: Vec::new(),
            optional: false,
            text: String::new(),
        }
    }

    /// Spell effects of an instant or sorcery.
    #[must_use]
    pub fn spell(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            ..Self::of_kind(AbilityKind::Spell, Zone::Stack)
        }
    }

    #[must_use]
    pub fn activated(costs: Vec<Cost>, effects: impl IntoIterator<Item = Effect>) -> Self {
        Self {
            costs,
            effects: effects.into_iter().collect(),
            ..Self::of_kind(AbilityKind::Activated, Zone::Battlefield)
        }
    }

    #[must_use]
    pub fn mana(costs: Vec<Cost>, effect: Effect) -> Self {
        Self {
            costs,
            effects: vec![effect],
            ..Self::of_kind(AbilityKind::Mana, Zone::Battlefield)
        }
    }

    #[must_use]
    pub fn triggered(spec: TriggerSpec, effects: impl IntoIterator<Item = Effect>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            ..Self::of_kind(AbilityKind::Triggered(spec), Zone::Battlefield)
        }
    }

    #[must_use]
    pub fn state_triggered(condition: Condition, effects: impl IntoIterator<Item = Effect>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            ..Self::of_kind(AbilityKind::StateTriggered(condition), Zone::Battlefield)
        }
    }

    /// Static ability generating a continuous effect on the battlefield.
    #[must_use]
    pub fn static_effect(effect: ContinuousEffect) -> Self {
        Self::of_kind(AbilityKind::Static(StaticAbility::Continuous(effect)), Zone::Battlefield)
    }

    #[must_use]
    pub fn kicker(kicker: KickerAbility) -> Self {
        let text = kicker.rule_text();
        Self {
            text,
            ..Self::of_kind(AbilityKind::Static(StaticAbility::Kicker(kicker)), Zone::Stack)
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.targets.push(target);
        self
    }

    /// An extra cost, e.g. a spell's additional cost.
    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.costs.push(cost);
        self
    }

    /// Make it a "you may" ability.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Function in another zone.
    #[must_use]
    pub fn functions_in(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    #[must_use]
    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    #[must_use]
    pub fn trigger(&self) -> Option<&TriggerSpec> {
        match &self.kind {
            AbilityKind::Triggered(spec) => Some(spec),
            _ => None,
        }
    }

    #[must_use]
    pub fn continuous_effect(&self) -> Option<&ContinuousEffect> {
        match &self.kind {
            AbilityKind::Static(StaticAbility::Continuous(effect)) => Some(effect),
            _ => None,
        }
    }

    #[must_use]
    pub fn kicker_ability(&self) -> Option<&KickerAbility> {
        match &self.kind {
            AbilityKind::Static(StaticAbility::Kicker(kicker)) => Some(kicker),
            _ => None,
        }
    }

    pub fn kicker_ability_mut(&mut self) -> Option<&mut KickerAbility> {
        match &mut self.kind {
            AbilityKind::Static(StaticAbility::Kicker(kicker)) => Some(kicker),
            _ => None,
        }
    }

    /// Bind a template to a game object.
    #[must_use]
    pub(crate) fn bind(&self, id: AbilityId, source: ObjectId) -> Self {
        Self {
            id,
            source,
            ..self.clone()
        }
    }
}
