//! Priority and stack resolution.

use tracing::{debug, info};

use super::Game;
use crate::abilities::{Ability, AbilityKind};
use crate::core::{ObjectId, PlayerId, StackEntryId};
use crate::effects::{
    Effect, EffectResolver, FilterContext, PendingChoice, ResolveResult, ResolverContext, Target, TargetSpec,
};
use crate::error::{EngineError, Result};
use crate::stack::{StackItem, StackObject};
use crate::triggers::GameEvent;
use crate::zones::Zone;

/// Upper bound on resolutions in one `run_stack` call.
const MAX_RESOLUTIONS: usize = 10_000;

impl Game {
    /// `player` passes priority. When every remaining player has passed in
    /// succession, the top of the stack resolves and its id is returned.
    pub fn pass_priority(&mut self, player: PlayerId) -> Result<Option<StackEntryId>> {
        let remaining = self.state.remaining_players();
        if self.state.stack.is_empty() || !self.state.stack.pass(player, &remaining) {
            return Ok(None);
        }
        self.resolve_top()
    }

    /// Resolve the top of the stack. A failure leaves the entry on the stack
    /// and the state as it was.
    pub fn resolve_top(&mut self) -> Result<Option<StackEntryId>> {
        self.transaction(|game| {
            let Some(entry) = game.state.stack.pop() else {
                return Ok(None);
            };
            let id = entry.id;
            match &entry.item {
                StackItem::Spell { object } => game.resolve_spell(&entry, *object)?,
                StackItem::Ability { ability, source, event } => {
                    game.resolve_ability(&entry, ability, *source, event.as_ref())?;
                }
            }

            game.settle()?;
            if !game.state.stack.is_empty() {
                game.state.stack.set_priority(game.state.turn.active_player);
            }
            Ok(Some(id))
        })
    }

    /// Resolve until the stack is empty, as if every player always passed.
    /// Returns how many entries resolved.
    pub fn run_stack(&mut self) -> Result<usize> {
        let mut resolved = 0;
        while self.resolve_top()?.is_some() {
            resolved += 1;
            if resolved >= MAX_RESOLUTIONS {
                return Err(EngineError::InvariantViolation(format!(
                    "stack still not empty after {} resolutions",
                    resolved
                )));
            }
        }
        Ok(resolved)
    }

    /// Whether the entry has targets and none of them is legal any more.
    fn fizzles(&self, entry: &StackObject, specs: &[TargetSpec], source: ObjectId) -> bool {
        if entry.targets.is_empty() {
            return false;
        }
        let ctx = FilterContext::new(source, entry.controller);
        !TargetSpec::per_target(specs, entry.targets.len())
            .zip(&entry.targets)
            .any(|(spec, target)| spec.is_legal(target, &self.state, &ctx))
    }

    fn resolve_spell(&mut self, entry: &StackObject, object: ObjectId) -> Result<()> {
        let Some(card) = self.state.object(object) else {
            return Err(EngineError::ObjectNotFound(object));
        };
        if card.zone != Zone::Stack {
            debug!(%object, "spell left the stack before resolving");
            return Ok(());
        }
        let permanent = card.base.is_permanent();
        let spell = card
            .abilities
            .iter()
            .find(|a| matches!(a.kind, AbilityKind::Spell))
            .cloned();

        if let Some(spell) = &spell {
            if self.fizzles(entry, &spell.targets, object) {
                info!(%object, "spell fizzles, all targets illegal");
                self.state.move_object(object, Zone::Graveyard)?;
                return Ok(());
            }
            self.resolve_effects(spell, object, entry.controller, &entry.targets, None)?;
        }

        if permanent {
            self.state.move_object(object, Zone::Battlefield)?;
            if let Some(card) = self.state.object_mut(object) {
                card.controller = entry.controller;
            }
            debug!(%object, "permanent spell resolved");
        } else if self.state.zone_of(object) == Some(Zone::Stack) {
            self.state.move_object(object, Zone::Graveyard)?;
        }
        Ok(())
    }

    fn resolve_ability(
        &mut self,
        entry: &StackObject,
        ability: &Ability,
        source: ObjectId,
        event: Option<&GameEvent>,
    ) -> Result<()> {
        if self.fizzles(entry, &ability.targets, source) {
            info!(ability = %ability.id, "ability fizzles, all targets illegal");
            return Ok(());
        }
        if let Some(condition) = ability.trigger().and_then(|t| t.intervening_if.as_ref()) {
            if !condition.evaluate(&self.state, source, entry.controller) {
                debug!(ability = %ability.id, "intervening-if no longer true, removed");
                return Ok(());
            }
        }
        if ability.optional {
            let prompt = if ability.text.is_empty() {
                format!("Use the ability of {}?", source)
            } else {
                format!("{}?", ability.text)
            };
            if !self.choose_use(entry.controller, &prompt)? {
                debug!(ability = %ability.id, "declined optional ability");
                return Ok(());
            }
        }
        self.resolve_effects(ability, source, entry.controller, &entry.targets, event)
    }

    /// Resolve the effects in order, then activate the continuous effects
    /// they created with one shared timestamp.
    fn resolve_effects(
        &mut self,
        ability: &Ability,
        source: ObjectId,
        controller: PlayerId,
        targets: &[Target],
        event: Option<&GameEvent>,
    ) -> Result<()> {
        let context = ResolverContext::new(source, ability.id, controller)
            .with_targets(targets)
            .with_event(event);
        self.resolve_effect_list(&ability.effects, &context)
    }

    /// Resolve `effects` one at a time, letting players make the choices an
    /// effect asks for before the next one resolves.
    pub(super) fn resolve_effect_list(&mut self, effects: &[Effect], context: &ResolverContext) -> Result<()> {
        let mut registered = Vec::new();
        for effect in effects {
            match EffectResolver::resolve(&mut self.state, effect, context)? {
                ResolveResult::Registered(effect) => registered.push(effect),
                ResolveResult::Choose(choices) => {
                    for choice in choices {
                        self.complete_choice(&choice)?;
                    }
                }
                ResolveResult::Failed(reason) => {
                    debug!(ability = %context.ability, %reason, "effect did nothing");
                }
                ResolveResult::Success | ResolveResult::Skipped => {}
            }
        }

        if !registered.is_empty() {
            let timestamp = self.state.next_timestamp();
            for effect in registered {
                self.state.effects.activate(effect, timestamp);
            }
        }
        Ok(())
    }

    fn complete_choice(&mut self, choice: &PendingChoice) -> Result<()> {
        let player = choice.player();
        let Some(object) = self.choose_object(player, choice.prompt(), choice.candidates())? else {
            return Ok(());
        };
        debug!(%player, %object, to = ?choice.destination(), "object chosen");
        self.state.move_object(object, choice.destination())?;
        Ok(())
    }
}
