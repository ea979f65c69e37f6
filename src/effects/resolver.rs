//! Effect resolution: executing an ability's effects on game state.
//!
//! One-shot effects mutate the state directly. Continuous effects are
//! registered with the layer registry as pending entries; the caller activates
//! them together once the whole ability has resolved.

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::continuous::{Affected, ContinuousEffect, LockedObject};
use super::effect::{Amount, Effect, EffectTarget, OneShotEffect, PlayerRef};
use super::filter::FilterContext;
use super::targeting::Target;
use crate::core::{AbilityId, EffectId, GameState, ObjectId, PlayerId, SideValue};
use crate::error::Result;
use crate::layers::{NewEffect, ObjectView};
use crate::triggers::GameEvent;
use crate::zones::Zone;

/// What the resolving ability knows about itself.
#[derive(Clone, Copy, Debug)]
pub struct ResolverContext<'a> {
    pub source: ObjectId,
    pub ability: AbilityId,
    pub controller: PlayerId,
    pub targets: &'a [Target],
    /// The event that triggered the ability, if any.
    pub event: Option<&'a GameEvent>,
    /// The source as it last existed, when it left play paying costs.
    pub last_known: Option<&'a ObjectView>,
}

impl<'a> ResolverContext<'a> {
    #[must_use]
    pub fn new(source: ObjectId, ability: AbilityId, controller: PlayerId) -> Self {
        Self {
            source,
            ability,
            controller,
            targets: &[],
            event: None,
            last_known: None,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: &'a [Target]) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: Option<&'a GameEvent>) -> Self {
        self.event = event;
        self
    }

    #[must_use]
    pub fn with_last_known(mut self, view: Option<&'a ObjectView>) -> Self {
        self.last_known = view;
        self
    }

    fn filter_context(&self) -> FilterContext {
        FilterContext::new(self.source, self.controller)
    }
}

/// Result of resolving an effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Effect resolved successfully.
    Success,
    /// A continuous effect was registered (pending activation).
    Registered(EffectId),
    /// Effect failed (e.g., its target is gone).
    Failed(String),
    /// Effect was skipped (e.g., conditional not met).
    Skipped,
    /// Players must pick objects before the effect is done.
    Choose(Vec<PendingChoice>),
}

/// An object choice an effect leaves to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingChoice {
    /// `player` sacrifices one of `candidates`.
    Sacrifice { player: PlayerId, candidates: Vec<ObjectId> },
    /// `player` puts one of the library `candidates` into their hand.
    Search { player: PlayerId, candidates: Vec<ObjectId> },
}

impl PendingChoice {
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            PendingChoice::Sacrifice { player, .. } | PendingChoice::Search { player, .. } => *player,
        }
    }

    #[must_use]
    pub fn candidates(&self) -> &[ObjectId] {
        match self {
            PendingChoice::Sacrifice { candidates, .. } | PendingChoice::Search { candidates, .. } => candidates,
        }
    }

    /// Where the chosen object goes.
    #[must_use]
    pub fn destination(&self) -> Zone {
        match self {
            PendingChoice::Sacrifice { .. } => Zone::Graveyard,
            PendingChoice::Search { .. } => Zone::Hand,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingChoice::Sacrifice { .. } => "Choose a permanent to sacrifice",
            PendingChoice::Search { .. } => "Search your library for a card",
        }
    }
}

/// Resolves effects on game state.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve effects in the order listed.
    pub fn resolve_all(
        state: &mut GameState,
        effects: &[Effect],
        context: &ResolverContext,
    ) -> Result<Vec<ResolveResult>> {
        effects
            .iter()
            .map(|effect| Self::resolve(state, effect, context))
            .collect()
    }

    /// Resolve a single effect.
    pub fn resolve(
        state: &mut GameState,
        effect: &Effect,
        context: &ResolverContext,
    ) -> Result<ResolveResult> {
        match effect {
            Effect::OneShot(one_shot) => Self::resolve_one_shot(state, one_shot, context),
            Effect::Continuous(continuous) => Ok(Self::register(state, continuous, context)),
            Effect::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if condition.evaluate(state, context.source, context.controller) {
                    Self::resolve(state, then, context)
                } else if let Some(otherwise) = otherwise {
                    Self::resolve(state, otherwise, context)
                } else {
                    Ok(ResolveResult::Skipped)
                }
            }
        }
    }

    /// Evaluate an amount at resolution time.
    #[must_use]
    pub fn amount(state: &GameState, amount: Amount, context: &ResolverContext) -> i64 {
        match amount {
            Amount::Fixed(n) => n,
            Amount::KickedCount => i64::from(state.kicked_count(context.source)),
            Amount::KickerX => i64::from(state.kicker_x(context.source)),
            Amount::CountersOnSource(counter) => match context.last_known {
                Some(view) => i64::from(view.counters.get(counter)),
                None => state
                    .object(context.source)
                    .map_or(0, |o| i64::from(o.counters.get(counter))),
            },
            Amount::EventAmount => context.event.map_or(0, |e| e.amount),
            Amount::Stashed => match Self::stashed(state, context) {
                Some(SideValue::Amount(n)) => n,
                _ => 0,
            },
        }
    }

    /// The value the ability's trigger stored during the current turn.
    fn stashed(state: &GameState, context: &ResolverContext) -> Option<SideValue> {
        state.side_channel.get_in_turn(context.ability, state.turn.number)
    }

    fn resolve_one_shot(
        state: &mut GameState,
        effect: &OneShotEffect,
        context: &ResolverContext,
    ) -> Result<ResolveResult> {
        trace!(?effect, source = %context.source, "resolving one-shot effect");

        match effect {
            OneShotEffect::AddCounters {
                target,
                counter,
                amount,
            } => {
                let Some(object) = Self::object(state, *target, context) else {
                    return Ok(ResolveResult::Failed("counter target is gone".into()));
                };
                let n = Self::amount(state, *amount, context).max(0) as u32;
                if n == 0 {
                    return Ok(ResolveResult::Skipped);
                }
                state.add_counters(object, *counter, n)?;
                Ok(ResolveResult::Success)
            }

            OneShotEffect::RemoveCounters {
                target,
                counter,
                amount,
            } => {
                let Some(object) = Self::object(state, *target, context) else {
                    return Ok(ResolveResult::Failed("counter target is gone".into()));
                };
                let n = Self::amount(state, *amount, context).max(0) as u32;
                state.remove_counters(object, *counter, n)?;
                Ok(ResolveResult::Success)
            }

            OneShotEffect::Destroy { target } | OneShotEffect::Sacrifice { target } => {
                let Some(object) = Self::object(state, *target, context) else {
                    return Ok(ResolveResult::Failed("target is gone".into()));
                };
                if state.zone_of(object) != Some(Zone::Battlefield) {
                    return Ok(ResolveResult::Failed(format!("{} is not on the battlefield", object)));
                }
                state.move_object(object, Zone::Graveyard)?;
                Ok(ResolveResult::Success)
            }

            OneShotEffect::Exile { target } => {
                let Some(object) = Self::object(state, *target, context) else {
                    return Ok(ResolveResult::Failed("target is gone".into()));
                };
                state.move_object(object, Zone::Exile)?;
                Ok(ResolveResult::Success)
            }

            OneShotEffect::Tap { target } | OneShotEffect::Untap { target } => {
                let tapped = matches!(effect, OneShotEffect::Tap { .. });
                let Some(object) = Self::object(state, *target, context) else {
                    return Ok(ResolveResult::Failed("target is gone".into()));
                };
                if let Some(obj) = state.object_mut(object) {
                    obj.tapped = tapped;
                }
                Ok(ResolveResult::Success)
            }

            OneShotEffect::GainLife { player, amount } => {
                let n = Self::amount(state, *amount, context);
                for p in Self::players(state, *player, context) {
                    state.gain_life(p, n)?;
                }
                Ok(ResolveResult::Success)
            }

            OneShotEffect::LoseLife { player, amount } => {
                let n = Self::amount(state, *amount, context);
                for p in Self::players(state, *player, context) {
                    state.lose_life(p, n)?;
                }
                Ok(ResolveResult::Success)
            }

            OneShotEffect::DamagePlayer { player, amount } => {
                let n = Self::amount(state, *amount, context);
                for p in Self::players(state, *player, context) {
                    state.damage_player(context.source, p, n, false)?;
                }
                Ok(ResolveResult::Success)
            }

            OneShotEffect::DrawCards { player, amount } => {
                let n = Self::amount(state, *amount, context).max(0) as usize;
                let mut drawn = 0;
                for p in Self::players(state, *player, context) {
                    drawn += state.draw_cards(p, n)?;
                }
                if drawn > 0 {
                    Ok(ResolveResult::Success)
                } else {
                    Ok(ResolveResult::Failed("library was empty".into()))
                }
            }

            OneShotEffect::AddMana { mana, amount } => {
                let n = Self::amount(state, *amount, context).max(0) as u32;
                if let Some(player) = state.player_mut(context.controller) {
                    player.mana_pool.add(*mana, n);
                }
                Ok(ResolveResult::Success)
            }

            OneShotEffect::PlayerSacrifices { player, filter } => {
                let choices: Vec<PendingChoice> = Self::players(state, *player, context)
                    .into_iter()
                    .filter_map(|p| {
                        let ctx = FilterContext::new(context.source, p);
                        let candidates: Vec<ObjectId> = state
                            .objects_in(Zone::Battlefield)
                            .into_iter()
                            .filter(|id| state.view(*id).is_some_and(|v| v.controller == p && filter.matches(&v, &ctx)))
                            .collect();
                        (!candidates.is_empty()).then_some(PendingChoice::Sacrifice { player: p, candidates })
                    })
                    .collect();
                if choices.is_empty() {
                    Ok(ResolveResult::Skipped)
                } else {
                    Ok(ResolveResult::Choose(choices))
                }
            }

            OneShotEffect::SearchLibrary { filter } => {
                let ctx = context.filter_context();
                let candidates: Vec<ObjectId> = state
                    .objects_in(Zone::Library)
                    .into_iter()
                    .filter(|id| state.object(*id).is_some_and(|o| o.owner == context.controller))
                    .filter(|id| state.view(*id).is_some_and(|v| filter.matches(&v, &ctx)))
                    .collect();
                if candidates.is_empty() {
                    return Ok(ResolveResult::Failed("no matching card in library".into()));
                }
                Ok(ResolveResult::Choose(vec![PendingChoice::Search {
                    player: context.controller,
                    candidates,
                }]))
            }
        }
    }

    /// Register a continuous effect as a pending registry entry.
    fn register(
        state: &mut GameState,
        effect: &ContinuousEffect,
        context: &ResolverContext,
    ) -> ResolveResult {
        let affected = match &effect.affected {
            Affected::Target(index) => match context.targets.get(*index) {
                Some(Target::Object {
                    id,
                    zone_change_counter,
                }) => Affected::Objects(SmallVec::from_elem(
                    LockedObject {
                        id: *id,
                        zone_change_counter: *zone_change_counter,
                    },
                    1,
                )),
                _ => return ResolveResult::Failed(format!("no object target in slot {}", index)),
            },
            Affected::AllTargets => Affected::Objects(
                context
                    .targets
                    .iter()
                    .filter_map(|target| match target {
                        Target::Object {
                            id,
                            zone_change_counter,
                        } => Some(LockedObject {
                            id: *id,
                            zone_change_counter: *zone_change_counter,
                        }),
                        Target::Player(_) => None,
                    })
                    .collect(),
            ),
            Affected::LockedFilter(filter) => {
                let ctx = context.filter_context();
                Affected::Objects(
                    state
                        .views()
                        .values()
                        .filter(|view| filter.matches(view, &ctx))
                        .map(|view| LockedObject {
                            id: view.id,
                            zone_change_counter: view.zone_change_counter,
                        })
                        .collect(),
                )
            }
            other => other.clone(),
        };

        let source_zcc = state.zone_change_counter(context.source).unwrap_or(0);
        let effect = state.bind_granted(ContinuousEffect {
            affected,
            ..effect.clone()
        });
        let layer = effect.layer();
        let id = state.effects.add(NewEffect {
            effect,
            source: context.source,
            source_zone_change_counter: source_zcc,
            source_ability: context.ability,
            controller: context.controller,
            from_static: false,
        });
        debug!(effect = %id, source = %context.source, ?layer, "registered continuous effect");
        ResolveResult::Registered(id)
    }

    /// Resolve an object reference; targets must still be the same object.
    fn object(state: &GameState, target: EffectTarget, context: &ResolverContext) -> Option<ObjectId> {
        match target {
            EffectTarget::Source => state.object(context.source).map(|o| o.id),
            EffectTarget::Target(index) => match context.targets.get(index)? {
                Target::Object {
                    id,
                    zone_change_counter,
                } => (state.zone_change_counter(*id)? == *zone_change_counter).then_some(*id),
                Target::Player(_) => None,
            },
            EffectTarget::EventSource => context.event?.source,
            EffectTarget::Stashed => match Self::stashed(state, context)? {
                SideValue::Object(id) => state.object(id).map(|o| o.id),
                _ => None,
            },
        }
    }

    fn players(state: &GameState, player: PlayerRef, context: &ResolverContext) -> Vec<PlayerId> {
        let players = match player {
            PlayerRef::Controller => vec![context.controller],
            PlayerRef::Target(index) => context
                .targets
                .get(index)
                .and_then(Target::player)
                .into_iter()
                .collect(),
            PlayerRef::EventPlayer => context.event.and_then(|e| e.player).into_iter().collect(),
            PlayerRef::EachOpponent => state
                .players()
                .map(|p| p.id)
                .filter(|p| *p != context.controller)
                .collect(),
            PlayerRef::Stashed => match Self::stashed(state, context) {
                Some(SideValue::Player(p)) => vec![p],
                _ => Vec::new(),
            },
        };
        players.into_iter().filter(|p| state.is_in_game(*p)).collect()
    }
}
