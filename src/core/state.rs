//! Game state.
//!
//! `GameState` is a plain value: every collection in it is an `im`
//! persistent structure (or small), so cloning it is cheap and a clone taken
//! before an action is a complete checkpoint to roll back to.
//!
//! ## Contents
//!
//! - Players (life, mana pool, in-game flag)
//! - Objects and the zones they are in
//! - Turn cursor
//! - Continuous effect registry and trigger registry
//! - Typed side channel between triggers and their effects
//! - The stack
//! - Computed object views, refreshed by `apply_effects`
//! - Events emitted since the last `take_events`

use std::borrow::Cow;

use im::{OrdMap, Vector};
use tracing::{debug, info, trace};

use super::config::GameConfig;
use super::ids::{AbilityId, ObjectId};
use super::player::{Player, PlayerId, PlayerMap};
use super::side_channel::SideChannel;
use super::turn::TurnState;
use crate::abilities::Ability;
use crate::cards::{CardDefinition, CounterType, GameObject};
use crate::effects::{ContinuousEffect, Modification};
use crate::error::{EngineError, Result};
use crate::layers::{ContinuousEffects, LayerEngine, LayerReport, NewEffect, ObjectView};
use crate::stack::Stack;
use crate::triggers::{GameEvent, TriggerEntry, TriggerRegistry};
use crate::zones::{Zone, ZoneManager, ZonePosition};

/// Result of moving an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneTransition {
    pub object: ObjectId,
    pub from: Zone,
    pub to: Zone,
    /// Counter of the new incarnation.
    pub zone_change_counter: u32,
}

/// Complete game state.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    players: PlayerMap<Player>,
    objects: OrdMap<ObjectId, GameObject>,
    pub zones: ZoneManager,
    pub turn: super::turn::TurnState,
    pub effects: ContinuousEffects,
    pub triggers: TriggerRegistry,
    pub side_channel: SideChannel,
    pub stack: Stack,
    views: OrdMap<ObjectId, ObjectView>,
    events: Vector<GameEvent>,
    next_object_id: u32,
    next_ability_id: u32,
    timestamp: u64,
}

impl GameState {
    /// Create an empty game.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let life = config.starting_life;
        Self {
            config: config.clone(),
            players: PlayerMap::new(config.player_count, |id| Player::new(id, life)),
            objects: OrdMap::new(),
            zones: ZoneManager::new(),
            turn: TurnState::new(config.starting_player),
            effects: ContinuousEffects::new(),
            triggers: TriggerRegistry::new(),
            side_channel: SideChannel::default(),
            stack: Stack::new(),
            views: OrdMap::new(),
            events: Vector::new(),
            next_object_id: 0,
            next_ability_id: 0,
            timestamp: 0,
        }
    }

    // === Players ===

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&Player> {
        self.players.get(player)
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(player)
    }

    /// All players, in seat order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().map(|(_, p)| p)
    }

    #[must_use]
    pub fn is_in_game(&self, player: PlayerId) -> bool {
        self.players.get(player).is_some_and(|p| p.in_game)
    }

    /// Remove a player from the game (concession, loss, disconnection).
    pub fn leave_game(&mut self, player: PlayerId) -> Result<()> {
        let p = self
            .players
            .get_mut(player)
            .ok_or(EngineError::PlayerNotFound(player))?;
        if p.in_game {
            p.in_game = false;
            info!(%player, "player left the game");
        }
        Ok(())
    }

    /// Designate `object` as `player`'s commander.
    pub fn set_commander(&mut self, player: PlayerId, object: ObjectId) -> Result<()> {
        if !self.objects.contains_key(&object) {
            return Err(EngineError::ObjectNotFound(object));
        }
        let p = self
            .players
            .get_mut(player)
            .ok_or(EngineError::PlayerNotFound(player))?;
        p.commander = Some(object);
        debug!(%player, %object, "commander designated");
        Ok(())
    }

    /// Players still in the game.
    #[must_use]
    pub fn remaining_players(&self) -> Vec<PlayerId> {
        self.players().filter(|p| p.in_game).map(|p| p.id).collect()
    }

    // === Objects ===

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// All objects, in id order.
    pub fn objects(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    #[must_use]
    pub fn zone_of(&self, id: ObjectId) -> Option<Zone> {
        self.zones.zone_of(id)
    }

    #[must_use]
    pub fn zone_change_counter(&self, id: ObjectId) -> Option<u32> {
        self.objects.get(&id).map(|o| o.zone_change_counter)
    }

    /// Objects in a zone, in id order.
    #[must_use]
    pub fn objects_in(&self, zone: Zone) -> Vec<ObjectId> {
        self.zones.objects_in(zone).collect()
    }

    /// Views computed by the last `apply_effects`.
    #[must_use]
    pub fn views(&self) -> &OrdMap<ObjectId, ObjectView> {
        &self.views
    }

    /// Current view of an object; the unmodified object if it has no view yet.
    #[must_use]
    pub fn view(&self, id: ObjectId) -> Option<Cow<'_, ObjectView>> {
        match self.views.get(&id) {
            Some(view) if self.zone_change_counter(id) == Some(view.zone_change_counter) => {
                Some(Cow::Borrowed(view))
            }
            _ => self.objects.get(&id).map(|o| Cow::Owned(ObjectView::from_object(o))),
        }
    }

    /// A printed or granted ability of an object.
    #[must_use]
    pub fn ability(&self, source: ObjectId, ability: AbilityId) -> Option<Ability> {
        let object = self.objects.get(&source)?;
        if let Some(printed) = object.ability(ability) {
            return Some(printed.clone());
        }
        self.view(source)?.granted_ability(ability).cloned()
    }

    /// Current controller, after control-changing effects.
    #[must_use]
    pub fn controller_of(&self, id: ObjectId) -> Option<PlayerId> {
        self.view(id).map(|v| v.controller)
    }

    /// Create an object from a definition directly in a zone.
    ///
    /// No events are emitted; this is game setup, not a zone change.
    pub fn create_object(&mut self, definition: &CardDefinition, owner: PlayerId, zone: Zone) -> ObjectId {
        self.next_object_id += 1;
        let id = ObjectId(self.next_object_id);

        let mut object = GameObject::new(id, owner, definition);
        object.abilities = definition
            .abilities
            .iter()
            .map(|template| {
                self.next_ability_id += 1;
                template.bind(AbilityId(self.next_ability_id), id)
            })
            .collect();
        object.zone = zone;
        object.zone_change_counter = 1;
        object.timestamp = self.next_timestamp();

        trace!(object = %id, name = object.name(), %zone, "created object");
        self.objects.insert(id, object);
        self.zones.add(id, zone, owner, ZonePosition::Top);
        self.register_abilities(id);
        id
    }

    /// Move an object to another zone. It becomes a new object.
    pub fn move_object(&mut self, id: ObjectId, to: Zone) -> Result<ZoneTransition> {
        let timestamp = self.next_timestamp();
        let object = self.objects.get_mut(&id).ok_or(EngineError::ObjectNotFound(id))?;
        let from = object.zone;

        object.reset_for_zone_change();
        object.zone = to;
        object.zone_change_counter += 1;
        object.timestamp = timestamp;
        let zcc = object.zone_change_counter;
        let controller = object.controller;
        if let Some(kicker) = object.kicker_mut() {
            kicker.refresh(Some(zcc));
        }
        let stale: Vec<AbilityId> = object
            .abilities
            .iter()
            .map(|a| a.id)
            .chain(self.views.get(&id).into_iter().flat_map(|v| v.granted.iter().map(|a| a.id)))
            .filter(|ability| !self.stack.contains_ability(*ability))
            .collect();
        self.side_channel.remove_all(stale);

        if from == Zone::Battlefield {
            self.effects.expire_static_from(id);
        }
        self.zones.move_to(id, to, ZonePosition::Top);
        self.register_abilities(id);

        debug!(object = %id, %from, %to, zone_change_counter = zcc, "zone change");
        self.emit(GameEvent::zone_change(id, Some(from), to));
        if to == Zone::Battlefield {
            self.emit(GameEvent::entered_battlefield(id, controller));
        }

        Ok(ZoneTransition {
            object: id,
            from,
            to,
            zone_change_counter: zcc,
        })
    }

    /// Register the triggered and static abilities that function in the
    /// object's current zone.
    fn register_abilities(&mut self, id: ObjectId) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        let zone = object.zone;
        let zcc = object.zone_change_counter;
        let timestamp = object.timestamp;
        let controller = object.controller;

        let mut statics = Vec::new();
        for ability in object.abilities.iter().filter(|a| a.zone == zone) {
            if let Some(spec) = ability.trigger() {
                self.triggers.register(TriggerEntry {
                    ability: ability.id,
                    source: id,
                    zone,
                    spec: spec.clone(),
                });
            }
            if let Some(effect) = ability.continuous_effect() {
                statics.push(NewEffect {
                    effect: effect.clone(),
                    source: id,
                    source_zone_change_counter: zcc,
                    source_ability: ability.id,
                    controller,
                    from_static: true,
                });
            }
        }

        for mut new in statics {
            new.effect = self.bind_granted(new.effect);
            let effect = self.effects.add(new);
            self.effects.activate(effect, timestamp);
        }
    }

    /// Give an ability granted by `effect` its own id.
    ///
    /// Every registration of a granting effect grants a distinct ability.
    pub(crate) fn bind_granted(&mut self, mut effect: ContinuousEffect) -> ContinuousEffect {
        if let Modification::AddAbility(ability) = &mut effect.modification {
            self.next_ability_id += 1;
            ability.id = AbilityId(self.next_ability_id);
        }
        effect
    }

    /// Unregister triggers whose source has left the zone they function in.
    ///
    /// Entries survive the move itself so leaves-the-zone triggers can look
    /// back at the event; call this once the move's events are processed.
    pub fn prune_triggers(&mut self) -> usize {
        let inert: Vec<AbilityId> = self
            .triggers
            .iter()
            .filter(|e| self.zones.zone_of(e.source) != Some(e.zone))
            .map(|e| e.ability)
            .collect();
        for ability in &inert {
            self.triggers.unregister(*ability);
        }
        inert.len()
    }

    // === Object state ===

    pub fn add_counters(&mut self, id: ObjectId, counter: CounterType, amount: u32) -> Result<()> {
        let object = self.objects.get_mut(&id).ok_or(EngineError::ObjectNotFound(id))?;
        object.counters.add(counter, amount);
        debug!(object = %id, %counter, amount, "added counters");
        self.emit(GameEvent::counters_added(id, counter, amount));
        Ok(())
    }

    /// Remove up to `amount` counters. Returns how many were removed.
    pub fn remove_counters(&mut self, id: ObjectId, counter: CounterType, amount: u32) -> Result<u32> {
        let object = self.objects.get_mut(&id).ok_or(EngineError::ObjectNotFound(id))?;
        Ok(object.counters.remove(counter, amount))
    }

    pub fn gain_life(&mut self, player: PlayerId, amount: i64) -> Result<()> {
        self.change_life(player, amount)
    }

    pub fn lose_life(&mut self, player: PlayerId, amount: i64) -> Result<()> {
        self.change_life(player, -amount)
    }

    /// `source` deals damage to a player.
    pub fn damage_player(&mut self, source: ObjectId, player: PlayerId, amount: i64, combat: bool) -> Result<()> {
        if amount <= 0 {
            return Ok(());
        }
        self.change_life(player, -amount)?;
        self.emit(GameEvent::damaged_player(source, player, amount, combat));
        Ok(())
    }

    fn change_life(&mut self, player: PlayerId, amount: i64) -> Result<()> {
        let p = self
            .players
            .get_mut(player)
            .ok_or(EngineError::PlayerNotFound(player))?;
        if amount == 0 {
            return Ok(());
        }
        p.life += amount;
        trace!(%player, amount, life = p.life, "life changed");
        self.emit(GameEvent::life_changed(player, amount));
        Ok(())
    }

    /// Draw up to `count` cards. Returns how many were drawn.
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> Result<usize> {
        if self.player(player).is_none() {
            return Err(EngineError::PlayerNotFound(player));
        }
        let mut drawn = 0;
        for _ in 0..count {
            let Some(card) = self.zones.top(Zone::Library, player) else {
                break;
            };
            self.move_object(card, Zone::Hand)?;
            self.emit(GameEvent::drew_card(player, card));
            drawn += 1;
        }
        Ok(drawn)
    }

    // === Kicker ===

    /// Whether the object is the kicked incarnation of a kicked spell.
    #[must_use]
    pub fn is_kicked(&self, id: ObjectId) -> bool {
        self.object(id)
            .and_then(|o| Some(o.kicker()?.is_kicked(Some(o.zone_change_counter))))
            .unwrap_or(false)
    }

    #[must_use]
    pub fn kicked_count(&self, id: ObjectId) -> u32 {
        self.object(id)
            .and_then(|o| Some(o.kicker()?.kicked_count(Some(o.zone_change_counter))))
            .unwrap_or(0)
    }

    /// Announced kicker X, or 0 if the object is not kicked.
    #[must_use]
    pub fn kicker_x(&self, id: ObjectId) -> u32 {
        if !self.is_kicked(id) {
            return 0;
        }
        self.object(id)
            .and_then(|o| o.kicker())
            .map_or(0, |k| k.x_value())
    }

    // === Events and time ===

    /// Queue an event for publication.
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events).into_iter().collect()
    }

    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// A fresh timestamp, later than every earlier one.
    pub fn next_timestamp(&mut self) -> u64 {
        self.timestamp += 1;
        self.timestamp
    }

    // === Layers ===

    /// Recompute every object's view from the registry.
    ///
    /// Stale entries found during the computation are expired and purged, so
    /// calling this twice in a row yields the same views.
    pub fn apply_effects(&mut self) -> LayerReport {
        self.effects.purge_expired();
        let outcome = LayerEngine::compute(self);
        for id in &outcome.report.discarded {
            self.effects.discard(*id);
        }
        self.effects.purge_expired();

        for view in outcome.views.values() {
            let before = self.views.get(&view.id).map(|v| v.controller);
            if before.is_some_and(|c| c != view.controller) && view.zone == Zone::Battlefield {
                info!(object = %view.id, controller = %view.controller, "control changed");
                self.events.push_back(GameEvent::control_changed(view.id, view.controller));
            }
        }
        self.views = outcome.views;
        outcome.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardType;
    use crate::triggers::EventType;

    fn bear() -> CardDefinition {
        CardDefinition::new("Grizzly Bears")
            .with_type(CardType::Creature)
            .with_pt(2, 2)
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(&GameConfig::new(3).with_starting_life(30));
        assert_eq!(state.player_count(), 3);
        assert!(state.players().all(|p| p.life == 30 && p.in_game));
        assert_eq!(state.turn.number, 1);
    }

    #[test]
    fn test_create_and_move() {
        let mut state = GameState::new(&GameConfig::default());
        let id = state.create_object(&bear(), PlayerId(0), Zone::Hand);
        assert_eq!(state.zone_change_counter(id), Some(1));
        assert!(state.take_events().is_empty());

        let moved = state.move_object(id, Zone::Battlefield).unwrap();
        assert_eq!(moved.from, Zone::Hand);
        assert_eq!(moved.zone_change_counter, 2);
        assert_eq!(state.zone_of(id), Some(Zone::Battlefield));

        let events: Vec<EventType> = state.take_events().iter().map(|e| e.event_type).collect();
        assert_eq!(events, vec![EventType::ZoneChanged, EventType::EnteredBattlefield]);
    }

    #[test]
    fn test_move_unknown_object() {
        let mut state = GameState::new(&GameConfig::default());
        assert_eq!(
            state.move_object(ObjectId(5), Zone::Exile),
            Err(EngineError::ObjectNotFound(ObjectId(5)))
        );
    }

    #[test]
    fn test_zone_change_clears_counters() {
        let mut state = GameState::new(&GameConfig::default());
        let id = state.create_object(&bear(), PlayerId(0), Zone::Battlefield);
        state.add_counters(id, CounterType::PlusOnePlusOne, 2).unwrap();
        state.move_object(id, Zone::Graveyard).unwrap();
        assert!(state.object(id).unwrap().counters.is_empty());
    }

    #[test]
    fn test_life_and_damage_events() {
        let mut state = GameState::new(&GameConfig::default());
        let id = state.create_object(&bear(), PlayerId(0), Zone::Battlefield);

        state.damage_player(id, PlayerId(1), 3, true).unwrap();
        state.gain_life(PlayerId(0), 2).unwrap();
        assert_eq!(state.player(PlayerId(1)).unwrap().life, 17);
        assert_eq!(state.player(PlayerId(0)).unwrap().life, 22);

        let events = state.take_events();
        assert!(events
            .iter()
            .any(|e| e.event_type == EventType::DamagedPlayer && e.combat && e.amount == 3));
        assert!(state.damage_player(id, PlayerId(9), 1, false).is_err());
    }

    #[test]
    fn test_draw_cards() {
        let mut state = GameState::new(&GameConfig::default());
        let first = state.create_object(&bear(), PlayerId(0), Zone::Library);
        let second = state.create_object(&bear(), PlayerId(0), Zone::Library);

        assert_eq!(state.draw_cards(PlayerId(0), 5).unwrap(), 2);
        assert_eq!(state.zone_of(second), Some(Zone::Hand));
        assert_eq!(state.zone_of(first), Some(Zone::Hand));
    }

    #[test]
    fn test_snapshot_rollback() {
        let mut state = GameState::new(&GameConfig::default());
        let id = state.create_object(&bear(), PlayerId(0), Zone::Hand);
        let checkpoint = state.clone();

        state.move_object(id, Zone::Battlefield).unwrap();
        state.lose_life(PlayerId(0), 5).unwrap();

        state = checkpoint;
        assert_eq!(state.zone_of(id), Some(Zone::Hand));
        assert_eq!(state.player(PlayerId(0)).unwrap().life, 20);
        assert!(!state.has_events());
    }

    #[test]
    fn test_view_falls_back_to_base() {
        let mut state = GameState::new(&GameConfig::default());
        let id = state.create_object(&bear(), PlayerId(1), Zone::Battlefield);
        assert!(state.views().is_empty());
        assert_eq!(state.view(id).unwrap().power(), Some(2));
        assert_eq!(state.controller_of(id), Some(PlayerId(1)));

        state.apply_effects();
        assert!(matches!(state.view(id), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn test_zone_change_clears_stashed_values() {
        use crate::core::SideValue;
        use crate::triggers::TriggerSpec;

        let mut state = GameState::new(&GameConfig::default());
        let def = bear().with_ability(Ability::triggered(TriggerSpec::on(EventType::DamagedPlayer), []));
        let id = state.create_object(&def, PlayerId(0), Zone::Battlefield);
        let ability = state.object(id).unwrap().abilities[0].id;
        let turn = state.turn.number;
        state.side_channel.set(ability, SideValue::Player(PlayerId(1)), turn);
        state.side_channel.set(AbilityId(999), SideValue::Amount(2), turn);

        state.move_object(id, Zone::Graveyard).unwrap();
        assert_eq!(state.side_channel.get(ability), None);
        assert_eq!(state.side_channel.get(AbilityId(999)), Some(SideValue::Amount(2)));
    }

    #[test]
    fn test_leave_game() {
        let mut state = GameState::new(&GameConfig::default());
        state.leave_game(PlayerId(1)).unwrap();
        assert!(!state.is_in_game(PlayerId(1)));
        assert_eq!(state.remaining_players(), vec![PlayerId(0)]);
        assert!(state.leave_game(PlayerId(4)).is_err());
    }
}
