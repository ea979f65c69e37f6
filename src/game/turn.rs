//! Turn structure and combat.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Game;
use crate::cards::Keyword;
use crate::core::{ObjectId, PlayerId, Step};
use crate::effects::Duration;
use crate::error::{EngineError, Result};
use crate::triggers::GameEvent;
use crate::zones::Zone;

/// One attacking creature and the player it attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub attacker: ObjectId,
    pub defender: PlayerId,
}

impl Game {
    /// Move to the next step, resolving whatever is left on the stack first.
    ///
    /// After cleanup the next turn begins with its untap step.
    pub fn advance_step(&mut self) -> Result<Step> {
        if self.result().is_some() {
            return Err(EngineError::GameOver);
        }
        self.run_stack()?;
        for player in self.state.remaining_players() {
            if let Some(p) = self.state.player_mut(player) {
                p.mana_pool.empty();
            }
        }

        match self.state.turn.step.next() {
            Some(step) => self.state.turn.step = step,
            None => self.begin_turn(),
        }
        let step = self.state.turn.step;
        let active = self.state.turn.active_player;
        debug!(turn = self.state.turn.number, ?step, %active, "step began");

        match step {
            Step::Untap => {
                let expired = self
                    .state
                    .effects
                    .expire_where(|e| e.effect.duration == Duration::UntilYourNextTurn && e.controller == active);
                debug!(count = expired.len(), %active, "until-your-next-turn effects expired");
                self.untap(active);
            }
            Step::Draw if self.state.turn.number > 1 => {
                self.state.draw_cards(active, 1)?;
            }
            Step::CombatDamage => self.combat_damage()?,
            Step::EndCombat => self.end_combat(),
            Step::Cleanup => {
                let expired = self.state.effects.expire_duration(Duration::EndOfTurn);
                debug!(count = expired.len(), "until-end-of-turn effects expired");
            }
            _ => {}
        }
        self.state.emit(GameEvent::step_began(step, active));
        self.settle()?;
        Ok(step)
    }

    /// Advance until `step` of the current or next turn begins.
    pub fn advance_to(&mut self, step: Step) -> Result<()> {
        loop {
            if self.advance_step()? == step {
                return Ok(());
            }
        }
    }

    fn begin_turn(&mut self) {
        let remaining = self.state.remaining_players();
        let current = self.state.turn.active_player;
        let next = PlayerId::apnap(current, self.state.player_count())
            .skip(1)
            .find(|p| remaining.contains(p))
            .unwrap_or(current);

        self.state.turn.number += 1;
        self.state.turn.active_player = next;
        self.state.turn.step = Step::Untap;
        info!(turn = self.state.turn.number, active = %next, "turn began");
    }

    fn untap(&mut self, player: PlayerId) {
        let mine: Vec<ObjectId> = self
            .state
            .objects_in(Zone::Battlefield)
            .into_iter()
            .filter(|id| self.state.controller_of(*id) == Some(player))
            .collect();
        for id in mine {
            if let Some(object) = self.state.object_mut(id) {
                object.tapped = false;
            }
        }
    }

    /// The active player declares attackers.
    ///
    /// Each attacker must be an untapped, undetained creature they control;
    /// it taps unless it has vigilance.
    pub fn declare_attackers(&mut self, attacks: &[Attack]) -> Result<()> {
        let active = self.state.turn.active_player;
        self.transaction(|game| {
            for attack in attacks {
                let view = game
                    .state
                    .view(attack.attacker)
                    .ok_or(EngineError::ObjectNotFound(attack.attacker))?
                    .into_owned();
                if view.zone != Zone::Battlefield || !view.is_creature() || view.tapped {
                    return Err(EngineError::IllegalTarget(attack.attacker));
                }
                if view.detained {
                    return Err(EngineError::Detained(attack.attacker));
                }
                if view.controller != active {
                    return Err(EngineError::NotController {
                        player: active,
                        object: attack.attacker,
                    });
                }
                if attack.defender == active || !game.state.is_in_game(attack.defender) {
                    return Err(EngineError::PlayerNotFound(attack.defender));
                }

                let vigilance = view.has_keyword(Keyword::Vigilance);
                if let Some(object) = game.state.object_mut(attack.attacker) {
                    object.attacking = true;
                    object.tapped |= !vigilance;
                }
                game.attacks.push(*attack);
                game.state.emit(GameEvent::attacker_declared(attack.attacker, active));
            }
            Ok(())
        })?;
        self.settle()
    }

    /// Current attacks.
    #[must_use]
    pub fn attacks(&self) -> &[Attack] {
        &self.attacks
    }

    /// Attackers still in combat deal damage equal to their power to the
    /// player they attack.
    fn combat_damage(&mut self) -> Result<()> {
        for attack in self.attacks.clone() {
            let Some(view) = self.state.view(attack.attacker).map(|v| v.into_owned()) else {
                continue;
            };
            if view.zone != Zone::Battlefield || !view.attacking {
                continue;
            }
            let power = i64::from(view.power().unwrap_or(0));
            self.state.damage_player(attack.attacker, attack.defender, power, true)?;
        }
        Ok(())
    }

    fn end_combat(&mut self) {
        for attack in std::mem::take(&mut self.attacks) {
            if let Some(object) = self.state.object_mut(attack.attacker) {
                object.attacking = false;
            }
        }
    }
}
