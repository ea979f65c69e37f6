//! Layer application engine.
//!
//! `LayerEngine::compute` takes a game state and produces a view of every
//! object with all active continuous effects applied:
//!
//! 1. Start from each object's base characteristics.
//! 2. Drop entries whose source or locked objects are gone.
//! 3. For each layer (and each power/toughness sublayer), order the entries
//!    by dependency then timestamp and apply them.
//!
//! The computation is pure: entries that turn out to be stale are reported,
//! not removed. `GameState::apply_effects` expires them afterwards, which makes
//! applying twice in a row a no-op.

use im::OrdMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::dependency::sort_with_dependencies;
use super::registry::RegisteredEffect;
use super::view::ObjectView;
use crate::abilities::Ability;
use crate::core::{EffectId, GameState, ObjectId, PlayerId};
use crate::effects::{
    Affected, ControlSource, CountValue, FilterContext, Layer, Modification, SubLayer,
};
use crate::zones::Zone;

/// Effects that could not be ordered because they depend on each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyLoop {
    pub layer: Layer,
    pub sublayer: SubLayer,
    /// The group that fell back to timestamp order.
    pub effects: Vec<EffectId>,
}

/// Side findings of one computation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerReport {
    /// Entries that should be expired.
    pub discarded: Vec<EffectId>,
    pub dependency_loops: Vec<DependencyLoop>,
}

/// Views plus report.
#[derive(Clone, Debug)]
pub struct LayerOutcome {
    pub views: OrdMap<ObjectId, ObjectView>,
    pub report: LayerReport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Applied {
    Applied,
    /// Not functioning right now; stays registered.
    Skipped,
    /// Can never apply again.
    Discard,
}

/// Computes object views from base state and the effect registry.
pub struct LayerEngine;

impl LayerEngine {
    /// Compute every object's current view.
    #[must_use]
    pub fn compute(state: &GameState) -> LayerOutcome {
        let mut views: OrdMap<ObjectId, ObjectView> = state
            .objects()
            .map(|o| (o.id, ObjectView::from_object(o)))
            .collect();
        let mut report = LayerReport::default();

        let mut live: Vec<&RegisteredEffect> = Vec::new();
        for entry in state.effects.active() {
            if Self::is_stale(entry, state) {
                trace!(effect = %entry.id, source = %entry.source, "dropping stale effect");
                report.discarded.push(entry.id);
            } else {
                live.push(entry);
            }
        }

        for layer in Layer::ALL {
            let sublayers: &[SubLayer] = if layer == Layer::PowerToughness {
                &SubLayer::POWER_TOUGHNESS
            } else {
                &[SubLayer::None]
            };

            for &sublayer in sublayers {
                if sublayer == SubLayer::Counters {
                    Self::apply_counters(&mut views);
                    continue;
                }

                let group: Vec<&RegisteredEffect> = live
                    .iter()
                    .copied()
                    .filter(|e| e.effect.layer() == layer && e.effect.sublayer() == sublayer)
                    .collect();
                if group.is_empty() {
                    continue;
                }

                let timestamps: Vec<u64> = group.iter().map(|e| e.timestamp).collect();
                let ordered = sort_with_dependencies(&timestamps, |a, b| {
                    Self::depends_on(group[a], group[b], &views, state)
                });

                if ordered.cycle {
                    let effects: Vec<EffectId> = group.iter().map(|e| e.id).collect();
                    warn!(?layer, ?sublayer, ?effects, "dependency loop, applying in timestamp order");
                    report.dependency_loops.push(DependencyLoop {
                        layer,
                        sublayer,
                        effects,
                    });
                }

                for index in ordered.order {
                    let entry = group[index];
                    if Self::apply(entry, &mut views, state) == Applied::Discard {
                        report.discarded.push(entry.id);
                    }
                }
            }
        }

        LayerOutcome { views, report }
    }

    /// Whether the entry's source or locked objects are permanently gone.
    fn is_stale(entry: &RegisteredEffect, state: &GameState) -> bool {
        let source_left = || {
            state.object(entry.source).map_or(true, |o| {
                o.zone != Zone::Battlefield || o.zone_change_counter != entry.source_zone_change_counter
            })
        };

        if entry.from_static || entry.effect.duration == crate::effects::Duration::WhileOnBattlefield {
            if source_left() {
                return true;
            }
        }

        match &entry.effect.affected {
            Affected::Source => state.object(entry.source).map_or(true, |o| {
                o.zone_change_counter != entry.source_zone_change_counter
            }),
            Affected::Objects(locked) => !locked.iter().any(|l| {
                state
                    .object(l.id)
                    .is_some_and(|o| o.zone_change_counter == l.zone_change_counter)
            }),
            _ => false,
        }
    }

    /// Perspective the entry's filters are evaluated from.
    fn context(entry: &RegisteredEffect, views: &OrdMap<ObjectId, ObjectView>) -> FilterContext {
        let controller = if entry.from_static {
            views.get(&entry.source).map_or(entry.controller, |v| v.controller)
        } else {
            entry.controller
        };
        FilterContext::new(entry.source, controller)
    }

    /// A static ability stops functioning once its source loses all
    /// abilities. A conditional effect functions while its condition holds.
    fn is_functioning(entry: &RegisteredEffect, views: &OrdMap<ObjectId, ObjectView>, state: &GameState) -> bool {
        if entry.from_static && views.get(&entry.source).is_some_and(|v| v.lost_all_abilities) {
            return false;
        }
        entry.effect.condition.as_ref().is_none_or(|condition| {
            let ctx = Self::context(entry, views);
            condition.holds_in(views, state, entry.source, ctx.controller)
        })
    }

    /// Objects the entry applies to right now, in id order.
    fn affected(
        entry: &RegisteredEffect,
        views: &OrdMap<ObjectId, ObjectView>,
    ) -> Vec<ObjectId> {
        match &entry.effect.affected {
            Affected::Source => views
                .get(&entry.source)
                .filter(|v| v.zone_change_counter == entry.source_zone_change_counter)
                .map(|v| vec![v.id])
                .unwrap_or_default(),
            Affected::Filter(filter) => {
                let ctx = Self::context(entry, views);
                views
                    .values()
                    .filter(|v| filter.matches(v, &ctx))
                    .map(|v| v.id)
                    .collect()
            }
            Affected::Objects(locked) => locked
                .iter()
                .filter(|l| {
                    views
                        .get(&l.id)
                        .is_some_and(|v| v.zone_change_counter == l.zone_change_counter)
                })
                .map(|l| l.id)
                .collect(),
            // Resolved into `Objects` at registration.
            Affected::LockedFilter(_) | Affected::Target(_) | Affected::AllTargets => Vec::new(),
        }
    }

    /// `a` depends on `b` if applying `b` changes whether `a` functions or
    /// what it applies to.
    fn depends_on(
        a: &RegisteredEffect,
        b: &RegisteredEffect,
        views: &OrdMap<ObjectId, ObjectView>,
        state: &GameState,
    ) -> bool {
        let reach = |views: &OrdMap<ObjectId, ObjectView>| {
            (Self::is_functioning(a, views, state), Self::affected(a, views))
        };
        let before = reach(views);
        let mut simulated = views.clone();
        Self::apply(b, &mut simulated, state);
        before != reach(&simulated)
    }

    fn apply(
        entry: &RegisteredEffect,
        views: &mut OrdMap<ObjectId, ObjectView>,
        state: &GameState,
    ) -> Applied {
        if !Self::is_functioning(entry, views, state) {
            return Applied::Skipped;
        }
        let targets = Self::affected(entry, views);

        match &entry.effect.modification {
            Modification::CopyOf(original) => {
                let copiable = views
                    .get(original)
                    .map(|v| v.characteristics.clone())
                    .or_else(|| state.object(*original).map(|o| o.base.clone()));
                let Some(copiable) = copiable else {
                    return Applied::Discard;
                };
                for id in targets {
                    if let Some(view) = views.get_mut(&id) {
                        view.characteristics = copiable.clone();
                    }
                }
            }

            Modification::ChangeControl(source) => {
                let controller: Option<PlayerId> = match source {
                    ControlSource::Player(p) => Some(*p),
                    ControlSource::EffectController => Some(entry.controller),
                    ControlSource::Stashed => state.side_channel.player(entry.source_ability),
                };
                let Some(controller) = controller.filter(|p| state.is_in_game(*p)) else {
                    return Applied::Discard;
                };
                for id in targets {
                    if let Some(view) = views.get_mut(&id) {
                        view.controller = controller;
                    }
                }
            }

            Modification::ReplaceSubtype { from, to } => {
                for id in targets {
                    if let Some(view) = views.get_mut(&id) {
                        for subtype in view.characteristics.subtypes.iter_mut() {
                            if subtype == from {
                                subtype.clone_from(to);
                            }
                        }
                    }
                }
            }

            Modification::AddCardType(card_type) => {
                Self::for_each(views, &targets, |v| v.characteristics.add_type(*card_type));
            }
            Modification::AddSubtype(subtype) => {
                Self::for_each(views, &targets, |v| v.characteristics.add_subtype(subtype));
            }
            Modification::SetColors(colors) => {
                Self::for_each(views, &targets, |v| v.characteristics.colors = *colors);
            }
            Modification::AddColors(colors) => {
                Self::for_each(views, &targets, |v| v.characteristics.colors |= *colors);
            }
            Modification::AddKeyword(keyword) => {
                Self::for_each(views, &targets, |v| v.characteristics.add_keyword(*keyword));
            }
            Modification::RemoveKeyword(keyword) => {
                Self::for_each(views, &targets, |v| v.characteristics.remove_keyword(*keyword));
            }
            Modification::AddAbility(ability) => {
                Self::for_each(views, &targets, |v| {
                    if v.granted_ability(ability.id).is_none() {
                        v.granted.push(Ability {
                            source: v.id,
                            ..ability.as_ref().clone()
                        });
                    }
                });
            }
            Modification::RemoveAllAbilities => {
                Self::for_each(views, &targets, |v| {
                    v.characteristics.keywords.clear();
                    v.granted.clear();
                    v.lost_all_abilities = true;
                });
            }
            Modification::Detain => {
                Self::for_each(views, &targets, |v| v.detained = true);
            }

            Modification::DefinePowerToughness { power, toughness } => {
                let ctx = Self::context(entry, views);
                let power = Self::count(power, views, &ctx);
                let toughness = Self::count(toughness, views, &ctx);
                Self::for_each(views, &targets, |v| {
                    v.characteristics.power = Some(power);
                    v.characteristics.toughness = Some(toughness);
                });
            }
            Modification::SetPowerToughness { power, toughness } => {
                Self::for_each(views, &targets, |v| {
                    v.characteristics.power = Some(*power);
                    v.characteristics.toughness = Some(*toughness);
                });
            }
            Modification::ModifyPowerToughness { power, toughness } => {
                Self::for_each(views, &targets, |v| {
                    let chars = &mut v.characteristics;
                    chars.power = chars.power.map(|p| p + power);
                    chars.toughness = chars.toughness.map(|t| t + toughness);
                });
            }
            Modification::SwitchPowerToughness => {
                Self::for_each(views, &targets, |v| {
                    let chars = &mut v.characteristics;
                    std::mem::swap(&mut chars.power, &mut chars.toughness);
                });
            }
        }

        Applied::Applied
    }

    fn for_each(
        views: &mut OrdMap<ObjectId, ObjectView>,
        targets: &[ObjectId],
        mut f: impl FnMut(&mut ObjectView),
    ) {
        for id in targets {
            if let Some(view) = views.get_mut(id) {
                f(view);
            }
        }
    }

    fn count(value: &CountValue, views: &OrdMap<ObjectId, ObjectView>, ctx: &FilterContext) -> i32 {
        match value {
            CountValue::Fixed(n) => *n,
            CountValue::CountOf(filter) => views.values().filter(|v| filter.matches(v, ctx)).count() as i32,
        }
    }

    fn apply_counters(views: &mut OrdMap<ObjectId, ObjectView>) {
        let ids: Vec<ObjectId> = views
            .values()
            .filter(|v| v.counters.pt_delta() != 0)
            .map(|v| v.id)
            .collect();
        Self::for_each(views, &ids, |v| {
            let delta = v.counters.pt_delta();
            let chars = &mut v.characteristics;
            chars.power = chars.power.map(|p| p + delta);
            chars.toughness = chars.toughness.map(|t| t + delta);
        });
    }
}
