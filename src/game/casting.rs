//! Casting spells and activating abilities.

use tracing::{debug, info};

use super::Game;
use crate::abilities::{AbilityKind, Capabilities, SpellAbility};
use crate::core::{AbilityId, ObjectId, PlayerId, StackEntryId};
use crate::costs::Cost;
use crate::effects::{Outcome, ResolverContext};
use crate::error::{EngineError, Result};
use crate::stack::StackItem;
use crate::triggers::GameEvent;
use crate::zones::Zone;

impl Game {
    /// Cast a spell from `player`'s hand.
    ///
    /// The card moves to the stack, X is announced, optional costs (kicker)
    /// are offered, targets are chosen, then every cost is paid. If anything
    /// fails the game returns to the state before the cast.
    ///
    /// Announced values are clamped to what the caster's pool could cover.
    pub fn cast_spell(&mut self, player: PlayerId, object: ObjectId) -> Result<StackEntryId> {
        let id = self.transaction(|game| game.cast(player, object))?;
        self.settle()?;
        Ok(id)
    }

    fn cast(&mut self, player: PlayerId, object: ObjectId) -> Result<StackEntryId> {
        if !self.state.is_in_game(player) {
            return Err(EngineError::PlayerLeft(player));
        }
        let card = self.state.object(object).ok_or(EngineError::ObjectNotFound(object))?;
        if card.zone != Zone::Hand {
            return Err(EngineError::WrongZone {
                object,
                expected: Zone::Hand,
                actual: card.zone,
            });
        }
        if card.owner != player {
            return Err(EngineError::NotController { player, object });
        }
        let mana_cost = card.base.mana_cost.clone().unwrap_or_default();
        let (target_specs, additional) = card
            .abilities
            .iter()
            .find(|a| matches!(a.kind, AbilityKind::Spell))
            .map(|a| (a.targets.clone(), a.costs.clone()))
            .unwrap_or_default();

        self.state.move_object(object, Zone::Stack)?;

        let mana_cost = if mana_cost.has_x() {
            let available = self.state.player(player).map_or(0, |p| p.mana_pool.total());
            let (min, max) = mana_cost.x_range(available);
            let prompt = format!("Announce the value for {{X}} of {}", mana_cost);
            let x = self
                .decide(player, min, |d, s| d.announce_x_mana(min, max, &prompt, s, object))?
                .clamp(min, max);
            mana_cost.with_x(x)
        } else {
            mana_cost
        };
        let mut spell = SpellAbility::new(object, player, mana_cost);
        spell.costs.extend(additional);

        let kicker = self.state.object(object).and_then(|o| o.kicker().cloned());
        if let Some(mut kicker) = kicker {
            if let Some(decider) = self.deciders.get_mut(player) {
                kicker.add_optional_additional_costs(&mut spell, &mut self.state, decider.as_mut())?;
            }
            if let Some(slot) = self.state.object_mut(object).and_then(|o| o.kicker_mut()) {
                *slot = kicker;
            }
        }

        spell.targets = self
            .choose_targets(player, object, &target_specs)?
            .ok_or(EngineError::NoLegalTargets(object))?;

        self.pay(player, object, &Cost::Mana(spell.mana_to_pay.clone()))?;
        for cost in &spell.costs {
            self.pay(player, object, cost)?;
        }

        let name = self.state.object(object).map(|o| o.name().to_string()).unwrap_or_default();
        let suffix = self
            .state
            .object(object)
            .and_then(|o| o.kicker())
            .map(|k| k.cast_message_suffix())
            .unwrap_or_default();
        info!(%player, spell = %name, kicker = %suffix, "cast");

        self.state.emit(GameEvent::spell_cast(object, player));
        Ok(self
            .state
            .stack
            .push(player, StackItem::Spell { object }, spell.targets))
    }

    /// Activate an ability of a permanent `player` controls.
    ///
    /// Mana abilities resolve at once and return `None`; other abilities go
    /// on the stack.
    pub fn activate_ability(
        &mut self,
        player: PlayerId,
        source: ObjectId,
        ability: AbilityId,
    ) -> Result<Option<StackEntryId>> {
        let id = self.transaction(|game| game.activate(player, source, ability))?;
        self.settle()?;
        Ok(id)
    }

    fn activate(&mut self, player: PlayerId, source: ObjectId, ability: AbilityId) -> Result<Option<StackEntryId>> {
        if !self.state.is_in_game(player) {
            return Err(EngineError::PlayerLeft(player));
        }
        let object = self.state.object(source).ok_or(EngineError::ObjectNotFound(source))?;
        let ability = object
            .ability(ability)
            .filter(|a| a.has(Capabilities::PAYS_COSTS))
            .cloned()
            .ok_or(EngineError::AbilityNotFound(ability))?;
        if ability.zone != object.zone {
            return Err(EngineError::WrongZone {
                object: source,
                expected: ability.zone,
                actual: object.zone,
            });
        }
        if self.state.controller_of(source) != Some(player) {
            return Err(EngineError::NotController {
                player,
                object: source,
            });
        }
        if self.state.view(source).is_some_and(|v| v.detained) {
            return Err(EngineError::Detained(source));
        }

        let targets = self
            .choose_targets(player, source, &ability.targets)?
            .ok_or(EngineError::NoLegalTargets(source))?;

        let last_known = self.state.view(source).map(|v| v.into_owned());
        // Sacrifice last so the other costs still see the source.
        let (sacrifice, others): (Vec<&Cost>, Vec<&Cost>) =
            ability.costs.iter().partition(|c| matches!(c, Cost::SacrificeSource));
        for cost in others.into_iter().chain(sacrifice) {
            self.pay(player, source, cost)?;
        }

        if ability.has(Capabilities::IMMEDIATE) {
            let context = ResolverContext::new(source, ability.id, player)
                .with_targets(&targets)
                .with_last_known(last_known.as_ref());
            self.resolve_effect_list(&ability.effects, &context)?;
            debug!(ability = %ability.id, "mana ability resolved");
            return Ok(None);
        }

        self.state.emit(GameEvent::ability_activated(source, player));
        let id = self.state.stack.push(
            player,
            StackItem::Ability {
                ability,
                source,
                event: None,
            },
            targets,
        );
        Ok(Some(id))
    }

    fn pay(&mut self, player: PlayerId, source: ObjectId, cost: &Cost) -> Result<()> {
        if let Cost::Mana(mana) = cost {
            if mana.is_zero() {
                return Ok(());
            }
        }
        let result = match cost {
            Cost::Sacrifice(_) => self.sacrifice(player, source, cost),
            _ => cost.pay(&mut self.state, source, player),
        };
        if result.is_err() {
            debug!(%player, cost = %cost, "cost not paid");
        }
        result
    }

    fn sacrifice(&mut self, player: PlayerId, source: ObjectId, cost: &Cost) -> Result<()> {
        let candidates = cost.sacrifice_candidates(&self.state, source, player);
        let Some(victim) = self.choose_object(player, &cost.text(), &candidates)? else {
            return Err(EngineError::CannotPayCost(cost.text()));
        };
        self.state.move_object(victim, Zone::Graveyard)?;
        Ok(())
    }

    /// Ask whether to use an optional ability.
    pub(super) fn choose_use(&mut self, player: PlayerId, prompt: &str) -> Result<bool> {
        self.decide(player, false, |d, s| d.choose_use(Outcome::Benefit, prompt, s))
    }
}
