//! The game driver.
//!
//! [`Game`] owns the [`GameState`], the [`EventBus`] and one
//! [`DecisionMaker`] per player. Every player action goes through it:
//!
//! 1. The action mutates the state, which queues events.
//! 2. `settle` recomputes the layers, performs state-based actions, publishes
//!    the queued events and collects the triggers they fire, until nothing
//!    new happens (bounded by `GameConfig::max_trigger_rounds`).
//! 3. Collected triggers go on the stack in APNAP order.
//!
//! Actions that fail part-way restore the state they started from.

mod casting;
mod resolution;
mod turn;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cards::{CardDefinition, CardRegistry, GameObject};
use crate::core::{GameConfig, GameState, ObjectId, PlayerId, PlayerMap};
use crate::decisions::{Decision, DecisionMaker, DeclineAll, PlayerLeft};
use crate::effects::{FilterContext, Target, TargetSpec};
use crate::error::{EngineError, Result};
use crate::layers::ObjectView;
use crate::stack::StackItem;
use crate::triggers::{EventBus, GameEvent, PendingTrigger};
use crate::zones::Zone;

pub use turn::Attack;

/// Result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// The last player standing.
    Winner(PlayerId),
    /// Everybody left.
    Draw,
}

impl GameResult {
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }
}

/// A running game.
pub struct Game {
    state: GameState,
    bus: EventBus,
    deciders: PlayerMap<Box<dyn DecisionMaker>>,
    pending: Vec<PendingTrigger>,
    attacks: Vec<Attack>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("turn", &self.state.turn)
            .field("stack", &self.state.stack.len())
            .field("pending", &self.pending.len())
            .field("bus", &self.bus)
            .finish()
    }
}

impl Game {
    /// Start a game where every player declines every decision.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let deciders = PlayerMap::new(config.player_count, |_| {
            Box::new(DeclineAll) as Box<dyn DecisionMaker>
        });
        Self {
            state: GameState::new(&config),
            bus: EventBus::new(),
            deciders,
            pending: Vec::new(),
            attacks: Vec::new(),
        }
    }

    /// Set who makes `player`'s decisions.
    #[must_use]
    pub fn with_decider(mut self, player: PlayerId, decider: impl DecisionMaker + 'static) -> Self {
        self.set_decider(player, decider);
        self
    }

    pub fn set_decider(&mut self, player: PlayerId, decider: impl DecisionMaker + 'static) {
        if let Some(slot) = self.deciders.get_mut(player) {
            *slot = Box::new(decider);
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for setup. Call [`Game::settle`] afterwards.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.state.object(id)
    }

    /// Current characteristics of an object, after continuous effects.
    #[must_use]
    pub fn characteristics(&self, id: ObjectId) -> Option<ObjectView> {
        self.state.view(id).map(|v| v.into_owned())
    }

    /// Triggers that fired but are not on the stack yet.
    #[must_use]
    pub fn pending_triggers(&self) -> &[PendingTrigger] {
        &self.pending
    }

    /// Create an object directly in a zone and bring the game up to date.
    pub fn create_object(&mut self, definition: &CardDefinition, owner: PlayerId, zone: Zone) -> Result<ObjectId> {
        let id = self.state.create_object(definition, owner, zone);
        self.settle()?;
        Ok(id)
    }

    /// Instantiate the registered card called `name`.
    pub fn create_named(&mut self, registry: &CardRegistry, name: &str, owner: PlayerId, zone: Zone) -> Result<ObjectId> {
        let definition = registry
            .get(name)
            .ok_or_else(|| EngineError::UnknownCard(name.to_string()))?;
        self.create_object(definition, owner, zone)
    }

    /// The player leaves the game.
    pub fn concede(&mut self, player: PlayerId) -> Result<()> {
        self.state.leave_game(player)?;
        info!(%player, "conceded");
        self.settle()
    }

    /// `Some` once at most one player remains.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        match self.state.remaining_players().as_slice() {
            [] => Some(GameResult::Draw),
            [winner] => Some(GameResult::Winner(*winner)),
            _ => None,
        }
    }

    /// Ask `player` something. A player who left (or leaves now) gets
    /// `fallback` without being asked.
    fn decide<T>(
        &mut self,
        player: PlayerId,
        fallback: T,
        ask: impl FnOnce(&mut dyn DecisionMaker, &GameState) -> Decision<T>,
    ) -> Result<T> {
        if !self.state.is_in_game(player) {
            return Ok(fallback);
        }
        let Some(decider) = self.deciders.get_mut(player) else {
            return Ok(fallback);
        };
        match ask(decider.as_mut(), &self.state) {
            Ok(answer) => Ok(answer),
            Err(PlayerLeft) => {
                self.state.leave_game(player)?;
                Ok(fallback)
            }
        }
    }

    /// Choose one target per slot, or up to the bound of an `UpTo` slot.
    /// `None` if a required slot has no legal choice or the player declined.
    fn choose_targets(
        &mut self,
        player: PlayerId,
        source: ObjectId,
        specs: &[TargetSpec],
    ) -> Result<Option<Vec<Target>>> {
        let ctx = FilterContext::new(source, player);
        let mut chosen = Vec::with_capacity(specs.len());
        for spec in specs {
            let (min, max) = spec.count();
            let candidates = spec.candidates(&self.state, &ctx);
            let mut picked = 0;
            while picked < max {
                let open: Vec<Target> = candidates.iter().filter(|c| !chosen.contains(*c)).copied().collect();
                if open.is_empty() {
                    break;
                }
                let pick = self.decide(player, None, |d, s| d.choose_target(spec, &open, s))?;
                match pick {
                    Some(target) if open.contains(&target) => {
                        chosen.push(target);
                        picked += 1;
                    }
                    _ => break,
                }
            }
            if picked < min {
                return Ok(None);
            }
        }
        Ok(Some(chosen))
    }

    /// Ask `player` to pick one of `candidates`. The choice is mandatory:
    /// declining or leaving takes the first candidate.
    fn choose_object(&mut self, player: PlayerId, prompt: &str, candidates: &[ObjectId]) -> Result<Option<ObjectId>> {
        let Some(first) = candidates.first().copied() else {
            return Ok(None);
        };
        let pick = self.decide(player, Some(first), |d, s| d.choose_object(prompt, candidates, s))?;
        Ok(Some(pick.filter(|id| candidates.contains(id)).unwrap_or(first)))
    }

    /// Run an action; restore the starting state if it fails.
    fn transaction<T>(&mut self, action: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.state.clone();
        let pending = self.pending.len();
        let attacks = self.attacks.len();
        match action(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(%err, fatal = err.is_fatal(), "action failed, restoring state");
                self.state = checkpoint;
                self.pending.truncate(pending);
                self.attacks.truncate(attacks);
                Err(err)
            }
        }
    }

    /// Bring the game up to date after a change: layers, state-based actions,
    /// event publication and trigger collection, then put triggers on the
    /// stack.
    pub fn settle(&mut self) -> Result<()> {
        let max_rounds = self.state.config.max_trigger_rounds;
        let mut rounds = 0;
        loop {
            self.state.apply_effects();
            let acted = self.state_based_actions()?;
            if acted {
                self.state.apply_effects();
            }

            let events = self.state.take_events();
            for event in &events {
                self.bus.publish(event);
                let fired = self.state.triggers.find_triggers(event, &self.state);
                self.pending.extend(fired);
            }
            self.state.prune_triggers();
            self.collect_state_triggers();

            if events.is_empty() && !acted {
                break;
            }
            rounds += 1;
            if rounds >= max_rounds {
                warn!(rounds, "events still pending after the round limit");
                break;
            }
        }
        self.put_triggers_on_stack()
    }

    /// Players at 0 or less life lose; creatures with 0 or less toughness go
    /// to the graveyard. Returns whether anything happened.
    fn state_based_actions(&mut self) -> Result<bool> {
        let mut acted = false;

        let losers: Vec<PlayerId> = self
            .state
            .players()
            .filter(|p| p.in_game && p.life <= 0)
            .map(|p| p.id)
            .collect();
        for player in losers {
            info!(%player, "lost the game at 0 life");
            self.state.leave_game(player)?;
            acted = true;
        }

        let dying: Vec<ObjectId> = self
            .state
            .views()
            .values()
            .filter(|v| v.zone == Zone::Battlefield && v.is_creature())
            .filter(|v| v.toughness().is_some_and(|t| t <= 0))
            .map(|v| v.id)
            .collect();
        for id in dying {
            debug!(object = %id, "dies from zero toughness");
            self.state.move_object(id, Zone::Graveyard)?;
            acted = true;
        }
        Ok(acted)
    }

    /// Fire state triggers whose condition holds and that have no instance
    /// pending or on the stack.
    fn collect_state_triggers(&mut self) {
        let mut fired = Vec::new();
        for object in self.state.objects() {
            let granted = self.state.views().get(&object.id).map(|v| v.granted.as_slice()).unwrap_or_default();
            for ability in object.abilities.iter().chain(granted) {
                let crate::abilities::AbilityKind::StateTriggered(condition) = &ability.kind else {
                    continue;
                };
                if ability.zone != object.zone
                    || self.state.stack.contains_ability(ability.id)
                    || self.pending.iter().any(|p| p.ability == ability.id)
                {
                    continue;
                }
                let Some(controller) = self.state.controller_of(object.id) else {
                    continue;
                };
                if condition.evaluate(&self.state, object.id, controller) {
                    debug!(ability = %ability.id, source = %object.id, "state trigger");
                    fired.push(PendingTrigger {
                        ability: ability.id,
                        source: object.id,
                        controller,
                        event: GameEvent::state_condition(object.id, controller),
                        stash: None,
                    });
                }
            }
        }
        self.pending.extend(fired);
    }

    /// Put pending triggers on the stack: active player's first, each
    /// player's in the order they choose.
    fn put_triggers_on_stack(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.pending);
        let order: Vec<PlayerId> =
            PlayerId::apnap(self.state.turn.active_player, self.state.player_count()).collect();

        for player in order {
            let mine: Vec<PendingTrigger> = pending.iter().filter(|t| t.controller == player).cloned().collect();
            if mine.is_empty() || !self.state.is_in_game(player) {
                continue;
            }

            let identity: Vec<usize> = (0..mine.len()).collect();
            let chosen = if mine.len() > 1 {
                self.decide(player, identity.clone(), |d, s| d.order_triggers(&mine, s))?
            } else {
                identity.clone()
            };
            let order = if is_permutation(&chosen, mine.len()) { chosen } else { identity };

            for index in order {
                self.push_trigger(&mine[index])?;
            }
        }
        Ok(())
    }

    fn push_trigger(&mut self, trigger: &PendingTrigger) -> Result<()> {
        let Some(ability) = self.state.ability(trigger.source, trigger.ability) else {
            return Err(EngineError::AbilityNotFound(trigger.ability));
        };

        let Some(targets) = self.choose_targets(trigger.controller, trigger.source, &ability.targets)? else {
            debug!(ability = %trigger.ability, "trigger has no legal targets, removed");
            return Ok(());
        };
        if let Some(value) = trigger.stash {
            let turn = self.state.turn.number;
            self.state.side_channel.set(trigger.ability, value, turn);
        }

        let id = self.state.stack.push(
            trigger.controller,
            StackItem::Ability {
                ability,
                source: trigger.source,
                event: Some(trigger.event.clone()),
            },
            targets,
        );
        debug!(entry = %id, ability = %trigger.ability, controller = %trigger.controller, "trigger put on stack");
        Ok(())
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    let mut seen = vec![false; len];
    order.len() == len
        && order
            .iter()
            .all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
}
