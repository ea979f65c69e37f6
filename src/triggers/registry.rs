//! Trigger registry.
//!
//! Triggered abilities are registered when their source enters the zone they
//! function in and unregistered when it leaves. For each event the registry
//! runs the two-step check: `check_event_type` against an index keyed by
//! event type, then `check_trigger` (condition plus intervening-if) against
//! the current state.

use im::{OrdMap, OrdSet};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tracing::debug;

use crate::abilities::AbilityKind;
use crate::core::{AbilityId, GameState, ObjectId, PlayerId, SideValue};
use crate::effects::Condition;
use crate::zones::Zone;

use super::condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
use super::event::{EventType, GameEvent};

/// What a trigger writes into the side channel when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StashRule {
    /// Controller of the event's source (e.g. who dealt the damage).
    EventSourceController,
    EventPlayer,
    EventSource,
    EventAmount,
}

impl StashRule {
    /// Value to stash for `event`, if the event carries one.
    #[must_use]
    pub fn value(self, event: &GameEvent, state: &GameState) -> Option<SideValue> {
        match self {
            StashRule::EventSourceController => event
                .source
                .and_then(|s| state.controller_of(s))
                .map(SideValue::Player),
            StashRule::EventPlayer => event.player.map(SideValue::Player),
            StashRule::EventSource => event.source.map(SideValue::Object),
            StashRule::EventAmount => Some(SideValue::Amount(event.amount)),
        }
    }
}

/// When a triggered ability triggers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub event_types: SmallVec<[EventType; 2]>,
    pub condition: TriggerCondition,
    /// Checked when the trigger fires and again on resolution.
    pub intervening_if: Option<Condition>,
    pub stash: Option<StashRule>,
}

impl TriggerSpec {
    /// Trigger on one event type, unconditionally.
    #[must_use]
    pub fn on(event_type: EventType) -> Self {
        Self {
            event_types: smallvec![event_type],
            condition: TriggerCondition::Always,
            intervening_if: None,
            stash: None,
        }
    }

    /// Also listen for another event type.
    #[must_use]
    pub fn also_on(mut self, event_type: EventType) -> Self {
        if !self.event_types.contains(&event_type) {
            self.event_types.push(event_type);
        }
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = self.condition.and(condition);
        self
    }

    #[must_use]
    pub fn with_intervening_if(mut self, condition: Condition) -> Self {
        self.intervening_if = Some(condition);
        self
    }

    #[must_use]
    pub fn stash(mut self, rule: StashRule) -> Self {
        self.stash = Some(rule);
        self
    }

    /// Cheap filter on the event type alone.
    #[must_use]
    pub fn check_event_type(&self, event: &GameEvent) -> bool {
        self.event_types.contains(&event.event_type)
    }

    /// Semantic check against the event and the current state.
    #[must_use]
    pub fn check_trigger(&self, event: &GameEvent, state: &GameState, source: ObjectId, controller: PlayerId) -> bool {
        let ctx = ConditionContext::new(event, state, source, controller);
        ConditionEvaluator::evaluate(&self.condition, &ctx)
            && self
                .intervening_if
                .as_ref()
                .is_none_or(|c| c.evaluate(state, source, controller))
    }
}

/// A registered triggered ability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerEntry {
    pub ability: AbilityId,
    pub source: ObjectId,
    /// Zone the ability functions in.
    pub zone: Zone,
    pub spec: TriggerSpec,
}

/// A trigger that fired and waits to be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub ability: AbilityId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub event: GameEvent,
    /// Value to write into the side channel before the ability is put on the stack.
    pub stash: Option<SideValue>,
}

/// All registered triggered abilities of a game.
#[derive(Clone, Debug, Default)]
pub struct TriggerRegistry {
    entries: OrdMap<AbilityId, TriggerEntry>,
    by_event_type: OrdMap<EventType, OrdSet<AbilityId>>,
}

impl TriggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a triggered ability. Re-registering replaces the old entry.
    pub fn register(&mut self, entry: TriggerEntry) {
        self.unregister(entry.ability);
        for event_type in &entry.spec.event_types {
            let mut ids = self.by_event_type.get(event_type).cloned().unwrap_or_default();
            ids.insert(entry.ability);
            self.by_event_type.insert(*event_type, ids);
        }
        self.entries.insert(entry.ability, entry);
    }

    pub fn unregister(&mut self, ability: AbilityId) -> Option<TriggerEntry> {
        let entry = self.entries.remove(&ability)?;
        for event_type in &entry.spec.event_types {
            if let Some(ids) = self.by_event_type.get_mut(event_type) {
                ids.remove(&ability);
                if ids.is_empty() {
                    self.by_event_type.remove(event_type);
                }
            }
        }
        Some(entry)
    }

    /// Remove every trigger of a source.
    pub fn unregister_source(&mut self, source: ObjectId) {
        let ids: Vec<AbilityId> = self
            .entries
            .values()
            .filter(|e| e.source == source)
            .map(|e| e.ability)
            .collect();
        for id in ids {
            self.unregister(id);
        }
    }

    #[must_use]
    pub fn get(&self, ability: AbilityId) -> Option<&TriggerEntry> {
        self.entries.get(&ability)
    }

    /// Every trigger that fires for `event`, in ability id order.
    ///
    /// A trigger functions if its source is in its zone, or just left it with
    /// this very event (leaves-the-zone triggers look back in time).
    #[must_use]
    ///
    /// Triggered abilities granted by continuous effects are matched after
    /// the registered ones.
    pub fn find_triggers(&self, event: &GameEvent, state: &GameState) -> Vec<PendingTrigger> {
        let mut fired = Vec::new();
        let ids = self.by_event_type.get(&event.event_type).into_iter().flatten();
        for id in ids {
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            if !entry.spec.check_event_type(event) {
                continue;
            }

            let looks_back = event.source == Some(entry.source) && event.from == Some(entry.zone);
            if state.zone_of(entry.source) != Some(entry.zone) && !looks_back {
                continue;
            }
            let Some(controller) = state.controller_of(entry.source) else {
                continue;
            };

            if !entry.spec.check_trigger(event, state, entry.source, controller) {
                continue;
            }

            debug!(ability = %entry.ability, source = %entry.source, %event, "trigger matched");
            fired.push(PendingTrigger {
                ability: entry.ability,
                source: entry.source,
                controller,
                event: event.clone(),
                stash: entry.spec.stash.and_then(|rule| rule.value(event, state)),
            });
        }

        for view in state.views().values().filter(|v| !v.granted.is_empty()) {
            if state.zone_change_counter(view.id) != Some(view.zone_change_counter) {
                continue;
            }
            for ability in &view.granted {
                let AbilityKind::Triggered(spec) = &ability.kind else {
                    continue;
                };
                if ability.zone != view.zone
                    || !spec.check_event_type(event)
                    || !spec.check_trigger(event, state, view.id, view.controller)
                {
                    continue;
                }
                debug!(ability = %ability.id, source = %view.id, %event, "granted trigger matched");
                fired.push(PendingTrigger {
                    ability: ability.id,
                    source: view.id,
                    controller: view.controller,
                    event: event.clone(),
                    stash: spec.stash.and_then(|rule| rule.value(event, state)),
                });
            }
        }
        fired
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriggerEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardType};
    use crate::core::{GameConfig, Step};
    use crate::effects::ObjectFilter;

    fn entry(ability: u32, source: ObjectId, spec: TriggerSpec) -> TriggerEntry {
        TriggerEntry {
            ability: AbilityId(ability),
            source,
            zone: Zone::Battlefield,
            spec,
        }
    }

    fn artifact(state: &mut GameState, owner: PlayerId) -> ObjectId {
        let def = CardDefinition::new("Relic").with_type(CardType::Artifact);
        state.create_object(&def, owner, Zone::Battlefield)
    }

    #[test]
    fn test_event_type_index() {
        let mut state = GameState::new(&GameConfig::default());
        let relic = artifact(&mut state, PlayerId(0));
        let mut registry = TriggerRegistry::new();
        registry.register(entry(1, relic, TriggerSpec::on(EventType::StepBegan)));
        registry.register(entry(2, relic, TriggerSpec::on(EventType::SpellCast)));

        let upkeep = GameEvent::step_began(Step::Upkeep, PlayerId(0));
        let fired = registry.find_triggers(&upkeep, &state);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].ability, AbilityId(1));
        assert_eq!(fired[0].controller, PlayerId(0));

        assert!(registry.unregister(AbilityId(1)).is_some());
        assert!(registry.find_triggers(&upkeep, &state).is_empty());
    }

    #[test]
    fn test_source_must_be_in_zone() {
        let mut state = GameState::new(&GameConfig::default());
        let relic = artifact(&mut state, PlayerId(0));
        let mut registry = TriggerRegistry::new();
        registry.register(entry(1, relic, TriggerSpec::on(EventType::StepBegan)));

        state.move_object(relic, Zone::Graveyard).unwrap();
        let upkeep = GameEvent::step_began(Step::Upkeep, PlayerId(0));
        assert!(registry.find_triggers(&upkeep, &state).is_empty());
    }

    #[test]
    fn test_leaves_battlefield_looks_back() {
        let mut state = GameState::new(&GameConfig::default());
        let relic = artifact(&mut state, PlayerId(0));
        let mut registry = TriggerRegistry::new();
        let dies = TriggerSpec::on(EventType::ZoneChanged)
            .with_condition(TriggerCondition::SourceIsSelf)
            .with_condition(TriggerCondition::ToZone(Zone::Graveyard));
        registry.register(entry(1, relic, dies));

        state.move_object(relic, Zone::Graveyard).unwrap();
        let event = GameEvent::zone_change(relic, Some(Zone::Battlefield), Zone::Graveyard);
        assert_eq!(registry.find_triggers(&event, &state).len(), 1);
    }

    #[test]
    fn test_stash_event_source_controller() {
        let mut state = GameState::new(&GameConfig::default());
        let land = artifact(&mut state, PlayerId(0));
        let attacker = state.create_object(
            &CardDefinition::new("Bear").with_type(CardType::Creature).with_pt(2, 2),
            PlayerId(1),
            Zone::Battlefield,
        );
        state.apply_effects();

        let spec = TriggerSpec::on(EventType::DamagedPlayer)
            .with_condition(TriggerCondition::EventPlayerIsController)
            .with_condition(TriggerCondition::CombatDamage)
            .with_condition(TriggerCondition::EventSourceMatches(ObjectFilter::creature()))
            .stash(StashRule::EventSourceController);
        let mut registry = TriggerRegistry::new();
        registry.register(entry(1, land, spec));

        let combat = GameEvent::damaged_player(attacker, PlayerId(0), 2, true);
        let fired = registry.find_triggers(&combat, &state);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].stash, Some(SideValue::Player(PlayerId(1))));

        let noncombat = GameEvent::damaged_player(attacker, PlayerId(0), 2, false);
        assert!(registry.find_triggers(&noncombat, &state).is_empty());
    }

    #[test]
    fn test_intervening_if() {
        let mut state = GameState::new(&GameConfig::default());
        let relic = artifact(&mut state, PlayerId(0));
        state.apply_effects();
        let mut registry = TriggerRegistry::new();
        let spec = TriggerSpec::on(EventType::StepBegan)
            .with_intervening_if(Condition::ControlsAtLeast(ObjectFilter::permanent().with_type(CardType::Artifact), 2));
        registry.register(entry(1, relic, spec));

        let upkeep = GameEvent::step_began(Step::Upkeep, PlayerId(0));
        assert!(registry.find_triggers(&upkeep, &state).is_empty());

        artifact(&mut state, PlayerId(0));
        state.apply_effects();
        assert_eq!(registry.find_triggers(&upkeep, &state).len(), 1);
    }

    #[test]
    fn test_unregister_source() {
        let mut registry = TriggerRegistry::new();
        registry.register(entry(1, ObjectId(5), TriggerSpec::on(EventType::SpellCast)));
        registry.register(entry(2, ObjectId(5), TriggerSpec::on(EventType::DrewCard)));
        registry.register(entry(3, ObjectId(6), TriggerSpec::on(EventType::SpellCast)));

        registry.unregister_source(ObjectId(5));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(AbilityId(3)).is_some());
    }
}
