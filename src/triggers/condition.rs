//! Trigger conditions.
//!
//! A `TriggerCondition` is the semantic half of trigger matching: it is only
//! evaluated after the cheap event-type check passed, and it may look at the
//! current game state (controllers, characteristics, the active player).

use serde::{Deserialize, Serialize};

use crate::cards::CounterType;
use crate::core::{GameState, ObjectId, PlayerId, Step};
use crate::effects::{FilterContext, ObjectFilter};
use crate::zones::Zone;

use super::event::GameEvent;

/// A predicate over an event, seen from a triggered ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    // === Objects ===

    /// The event's source is the ability's source.
    SourceIsSelf,

    /// The event's target is the ability's source.
    TargetIsSelf,

    /// The event's source currently matches the filter.
    EventSourceMatches(ObjectFilter),

    /// The event's target currently matches the filter.
    EventTargetMatches(ObjectFilter),

    // === Players ===

    /// The event's player controls the ability.
    EventPlayerIsController,

    /// The event's player is an opponent of the ability's controller.
    EventPlayerIsOpponent,

    /// It is the turn of the ability's controller.
    ActivePlayerIsController,

    // === Payload ===

    /// The damage was combat damage.
    CombatDamage,

    StepIs(Step),

    CounterIs(CounterType),

    /// The object moved to this zone.
    ToZone(Zone),

    // === Combinators ===

    All(Vec<TriggerCondition>),
    Any(Vec<TriggerCondition>),
    Not(Box<TriggerCondition>),
    Always,
}

impl TriggerCondition {
    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            Self::Always => other,
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }
}

/// What a condition is evaluated against.
pub struct ConditionContext<'a> {
    pub event: &'a GameEvent,
    pub state: &'a GameState,
    /// Source of the triggered ability.
    pub source: ObjectId,
    /// Controller of the triggered ability.
    pub controller: PlayerId,
}

impl<'a> ConditionContext<'a> {
    pub fn new(event: &'a GameEvent, state: &'a GameState, source: ObjectId, controller: PlayerId) -> Self {
        Self {
            event,
            state,
            source,
            controller,
        }
    }

    fn matches(&self, object: Option<ObjectId>, filter: &ObjectFilter) -> bool {
        let Some(object) = object else {
            return false;
        };
        let ctx = FilterContext::new(self.source, self.controller);
        self.state
            .view(object)
            .is_some_and(|view| filter.matches(&view, &ctx))
    }
}

/// Evaluator for trigger conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &TriggerCondition, ctx: &ConditionContext) -> bool {
        let event = ctx.event;
        match condition {
            TriggerCondition::SourceIsSelf => event.source == Some(ctx.source),

            TriggerCondition::TargetIsSelf => event.target == Some(ctx.source),

            TriggerCondition::EventSourceMatches(filter) => ctx.matches(event.source, filter),

            TriggerCondition::EventTargetMatches(filter) => ctx.matches(event.target, filter),

            TriggerCondition::EventPlayerIsController => event.player == Some(ctx.controller),

            TriggerCondition::EventPlayerIsOpponent => {
                event.player.is_some_and(|p| p != ctx.controller)
            }

            TriggerCondition::ActivePlayerIsController => {
                ctx.state.turn.active_player == ctx.controller
            }

            TriggerCondition::CombatDamage => event.combat,

            TriggerCondition::StepIs(step) => event.step == Some(*step),

            TriggerCondition::CounterIs(counter) => event.counter == Some(*counter),

            TriggerCondition::ToZone(zone) => event.to == Some(*zone),

            TriggerCondition::All(conditions) => {
                conditions.iter().all(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Any(conditions) => {
                conditions.iter().any(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Not(inner) => !Self::evaluate(inner, ctx),

            TriggerCondition::Always => true,
        }
    }
}
