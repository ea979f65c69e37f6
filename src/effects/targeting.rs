//! Targets.
//!
//! - `TargetSpec`: what one target slot of an ability accepts
//! - `Target`: a chosen target, pinned to the incarnation it was chosen in
//!
//! An `UpTo` slot takes any number of distinct targets up to its bound,
//! including none. It must be the ability's last slot.

use serde::{Deserialize, Serialize};

use super::filter::{ControllerFilter, FilterContext, ObjectFilter};
use crate::core::{GameState, ObjectId, PlayerId};

/// One target slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSpec {
    /// An object matching the filter.
    Object(ObjectFilter),
    /// A player still in the game.
    Player(ControllerFilter),
    /// Zero to `n` distinct targets for the inner slot.
    UpTo(Box<TargetSpec>, usize),
}

impl TargetSpec {
    #[must_use]
    pub fn creature() -> Self {
        TargetSpec::Object(ObjectFilter::creature())
    }

    #[must_use]
    pub fn player() -> Self {
        TargetSpec::Player(ControllerFilter::Any)
    }

    #[must_use]
    pub fn opponent() -> Self {
        TargetSpec::Player(ControllerFilter::Opponent)
    }

    /// Up to `n` targets of this kind.
    #[must_use]
    pub fn up_to(self, n: usize) -> Self {
        TargetSpec::UpTo(Box::new(self), n)
    }

    /// The slot's bounds as (minimum, maximum) number of targets.
    #[must_use]
    pub fn count(&self) -> (usize, usize) {
        match self {
            TargetSpec::UpTo(_, n) => (0, *n),
            _ => (1, 1),
        }
    }

    /// The spec each of `count` chosen targets answers to, in order.
    pub fn per_target(specs: &[TargetSpec], count: usize) -> impl Iterator<Item = &TargetSpec> {
        let tail = specs.last().filter(|s| matches!(s, TargetSpec::UpTo(..)));
        specs
            .iter()
            .take(if tail.is_some() { specs.len() - 1 } else { specs.len() })
            .chain(std::iter::repeat_n(tail, count.saturating_sub(specs.len().saturating_sub(1))).flatten())
            .take(count)
    }

    /// Every legal choice for this slot, objects in id order then players.
    #[must_use]
    pub fn candidates(&self, state: &GameState, ctx: &FilterContext) -> Vec<Target> {
        match self {
            TargetSpec::UpTo(inner, _) => inner.candidates(state, ctx),
            TargetSpec::Object(filter) => state
                .views()
                .values()
                .filter(|view| filter.matches(view, ctx))
                .map(|view| Target::Object {
                    id: view.id,
                    zone_change_counter: view.zone_change_counter,
                })
                .collect(),
            TargetSpec::Player(who) => state
                .players()
                .filter(|p| p.in_game && who.allows(p.id, ctx.controller))
                .map(|p| Target::Player(p.id))
                .collect(),
        }
    }

    /// Whether `target` is still legal for this slot.
    #[must_use]
    pub fn is_legal(&self, target: &Target, state: &GameState, ctx: &FilterContext) -> bool {
        match (self, target) {
            (TargetSpec::UpTo(inner, _), _) => inner.is_legal(target, state, ctx),
            (TargetSpec::Object(filter), Target::Object { id, zone_change_counter }) => state
                .view(*id)
                .is_some_and(|view| {
                    view.zone_change_counter == *zone_change_counter && filter.matches(&view, ctx)
                }),
            (TargetSpec::Player(who), Target::Player(player)) => state
                .player(*player)
                .is_some_and(|p| p.in_game && who.allows(p.id, ctx.controller)),
            _ => false,
        }
    }
}

/// A chosen target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Object {
        id: ObjectId,
        zone_change_counter: u32,
    },
    Player(PlayerId),
}

impl Target {
    #[must_use]
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Target::Object { id, .. } => Some(*id),
            Target::Player(_) => None,
        }
    }

    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Target::Player(p) => Some(*p),
            Target::Object { .. } => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Object { id, .. } => write!(f, "{}", id),
            Target::Player(p) => write!(f, "{}", p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardType};
    use crate::core::GameConfig;
    use crate::zones::Zone;

    fn bear() -> CardDefinition {
        CardDefinition::new("Grizzly Bears")
            .with_type(CardType::Creature)
            .with_pt(2, 2)
    }

    #[test]
    fn test_object_candidates_and_legality() {
        let mut state = GameState::new(&GameConfig::default());
        let ours = state.create_object(&bear(), PlayerId(0), Zone::Battlefield);
        let theirs = state.create_object(&bear(), PlayerId(1), Zone::Battlefield);
        state.create_object(&bear(), PlayerId(1), Zone::Hand);
        state.apply_effects();

        let ctx = FilterContext::new(ours, PlayerId(0));
        let spec = TargetSpec::Object(ObjectFilter::creature().opponent_controls());
        let candidates = spec.candidates(&state, &ctx);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].object(), Some(theirs));
        assert!(spec.is_legal(&candidates[0], &state, &ctx));

        state.move_object(theirs, Zone::Graveyard).unwrap();
        state.apply_effects();
        assert!(!spec.is_legal(&candidates[0], &state, &ctx));
    }

    #[test]
    fn test_player_candidates() {
        let mut state = GameState::new(&GameConfig::new(3));
        let ctx = FilterContext::new(ObjectId(1), PlayerId(0));

        let opponents = TargetSpec::opponent().candidates(&state, &ctx);
        assert_eq!(opponents, vec![Target::Player(PlayerId(1)), Target::Player(PlayerId(2))]);

        if let Some(p) = state.player_mut(PlayerId(2)) {
            p.in_game = false;
        }
        assert!(!TargetSpec::opponent().is_legal(&Target::Player(PlayerId(2)), &state, &ctx));
        assert_eq!(TargetSpec::player().candidates(&state, &ctx).len(), 2);
    }

    #[test]
    fn test_up_to_slot() {
        let mut state = GameState::new(&GameConfig::default());
        let theirs = state.create_object(&bear(), PlayerId(1), Zone::Battlefield);
        state.apply_effects();
        let ctx = FilterContext::new(ObjectId(99), PlayerId(0));

        let spec = TargetSpec::Object(ObjectFilter::creature().opponent_controls()).up_to(2);
        assert_eq!(spec.count(), (0, 2));
        assert_eq!(TargetSpec::player().count(), (1, 1));
        let candidates = spec.candidates(&state, &ctx);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].object(), Some(theirs));
        assert!(spec.is_legal(&candidates[0], &state, &ctx));
    }

    #[test]
    fn test_per_target_specs() {
        let specs = vec![TargetSpec::player(), TargetSpec::creature().up_to(2)];
        let mapped: Vec<&TargetSpec> = TargetSpec::per_target(&specs, 3).collect();
        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped[0], &TargetSpec::player());
        assert_eq!(mapped[1], &specs[1]);
        assert_eq!(mapped[2], &specs[1]);

        let plain = vec![TargetSpec::player(), TargetSpec::creature()];
        assert_eq!(TargetSpec::per_target(&plain, 2).count(), 2);
        assert_eq!(TargetSpec::per_target(&specs, 1).count(), 1);
    }
}
