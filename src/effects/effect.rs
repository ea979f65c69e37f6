//! Effect definitions.
//!
//! Effects are what an ability does when it resolves:
//!
//! - `OneShotEffect`: happens once (counters, life, damage, mana, ...)
//! - `ContinuousEffect`: registered with the layer system for a duration
//! - `Conditional`: one of the above, gated on a `Condition`

use serde::{Deserialize, Serialize};

use im::OrdMap;

use super::continuous::ContinuousEffect;
use super::filter::{FilterContext, ObjectFilter};
use crate::cards::CounterType;
use crate::costs::ManaType;
use crate::core::{GameState, ObjectId, PlayerId};
use crate::layers::ObjectView;
use crate::zones::Zone;

/// A resolved ability's effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    OneShot(OneShotEffect),
    Continuous(ContinuousEffect),
    Conditional {
        condition: Condition,
        then: Box<Effect>,
        otherwise: Option<Box<Effect>>,
    },
}

impl Effect {
    /// Wrap `effect` so it only happens when `condition` holds.
    #[must_use]
    pub fn when(condition: Condition, effect: Effect) -> Self {
        Effect::Conditional {
            condition,
            then: Box::new(effect),
            otherwise: None,
        }
    }

    /// Pick between two effects on `condition`.
    #[must_use]
    pub fn either(condition: Condition, then: Effect, otherwise: Effect) -> Self {
        Effect::Conditional {
            condition,
            then: Box::new(then),
            otherwise: Some(Box::new(otherwise)),
        }
    }
}

impl From<OneShotEffect> for Effect {
    fn from(effect: OneShotEffect) -> Self {
        Effect::OneShot(effect)
    }
}

impl From<ContinuousEffect> for Effect {
    fn from(effect: ContinuousEffect) -> Self {
        Effect::Continuous(effect)
    }
}

/// An effect that happens once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OneShotEffect {
    // === Objects ===
    AddCounters {
        target: EffectTarget,
        counter: CounterType,
        amount: Amount,
    },
    RemoveCounters {
        target: EffectTarget,
        counter: CounterType,
        amount: Amount,
    },
    /// Put the object into its owner's graveyard.
    Destroy { target: EffectTarget },
    Sacrifice { target: EffectTarget },
    Exile { target: EffectTarget },
    Tap { target: EffectTarget },
    Untap { target: EffectTarget },

    // === Players ===
    GainLife { player: PlayerRef, amount: Amount },
    LoseLife { player: PlayerRef, amount: Amount },
    /// Non-combat damage from the ability's source.
    DamagePlayer { player: PlayerRef, amount: Amount },
    DrawCards { player: PlayerRef, amount: Amount },
    AddMana { mana: ManaType, amount: Amount },
    /// Each named player sacrifices a permanent of their choice matching the
    /// filter.
    PlayerSacrifices { player: PlayerRef, filter: ObjectFilter },
    /// The controller searches their library for a matching card and puts it
    /// into their hand.
    SearchLibrary { filter: ObjectFilter },
}

/// Object an effect acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    Source,
    /// The chosen target in this slot.
    Target(usize),
    /// The source object of the triggering event.
    EventSource,
    /// The object the ability's trigger stashed this turn.
    Stashed,
}

/// Player an effect acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRef {
    Controller,
    Target(usize),
    /// The player named by the triggering event.
    EventPlayer,
    EachOpponent,
    /// The player the ability's trigger stashed this turn.
    Stashed,
}

/// A number computed at resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i64),
    /// Total kicker activations of the source, if it is still kicked.
    KickedCount,
    /// The value announced for the source's kicker X.
    KickerX,
    CountersOnSource(CounterType),
    /// The amount carried by the triggering event.
    EventAmount,
    /// The amount the ability's trigger stashed this turn; 0 if none.
    Stashed,
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Fixed(value)
    }
}

/// A yes/no question about the game, asked from an ability's perspective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// The source was kicked and has not changed zones since.
    Kicked,
    SourceOnBattlefield,
    /// The ability's controller controls no matching permanent.
    ControlsNone(ObjectFilter),
    /// The ability's controller controls at least `n` matching permanents.
    ControlsAtLeast(ObjectFilter, usize),
    /// The ability's controller controls their commander on the battlefield.
    ControlsCommander,
    Not(Box<Condition>),
}

impl Condition {
    /// Evaluate from the perspective of `source` controlled by `controller`.
    #[must_use]
    pub fn evaluate(&self, state: &GameState, source: ObjectId, controller: PlayerId) -> bool {
        self.holds_in(state.views(), state, source, controller)
    }

    /// Evaluate against `views` instead of the state's last computed views.
    ///
    /// The layer engine uses this while views are still being built.
    #[must_use]
    pub fn holds_in(
        &self,
        views: &OrdMap<ObjectId, ObjectView>,
        state: &GameState,
        source: ObjectId,
        controller: PlayerId,
    ) -> bool {
        let ctx = FilterContext::new(source, controller);
        match self {
            Condition::Kicked => state.is_kicked(source),
            Condition::SourceOnBattlefield => state.zone_of(source) == Some(Zone::Battlefield),
            Condition::ControlsNone(filter) => count_controlled(views, filter, &ctx) == 0,
            Condition::ControlsAtLeast(filter, n) => count_controlled(views, filter, &ctx) >= *n,
            Condition::ControlsCommander => state
                .player(controller)
                .and_then(|p| p.commander)
                .and_then(|commander| views.get(&commander))
                .is_some_and(|v| v.zone == Zone::Battlefield && v.controller == controller),
            Condition::Not(inner) => !inner.holds_in(views, state, source, controller),
        }
    }
}

fn count_controlled(views: &OrdMap<ObjectId, ObjectView>, filter: &ObjectFilter, ctx: &FilterContext) -> usize {
    views
        .values()
        .filter(|view| view.controller == ctx.controller && filter.matches(view, ctx))
        .count()
}
