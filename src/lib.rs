//! # mtg-engine
//!
//! Rules core for a Magic: The Gathering engine: the layer system for
//! continuous effects, triggered-ability matching, the kicker / multikicker
//! cost engine and the event bus they share.
//!
//! ## Design Principles
//!
//! 1. **State is a value**: `GameState` is built from `im` persistent
//!    structures, so a clone is an O(1) checkpoint. Failed actions roll back
//!    to it.
//!
//! 2. **Definitions are immutable**: card definitions embed their filters and
//!    effects as values. Each game instantiates its own copies; nothing is
//!    shared between games.
//!
//! 3. **Derived, not mutated**: an object's current characteristics are
//!    recomputed from its base state and the effect registry, layer by layer.
//!    Effects never write into objects.
//!
//! 4. **N-player first**: players are `PlayerMap` entries; nothing assumes
//!    two players.
//!
//! ## Modules
//!
//! - `core`: ids, players, configuration, turn structure, `GameState`
//! - `zones`: zones and per-owner ordering
//! - `cards`: characteristics, definitions, game objects, registry
//! - `costs`: mana costs, mana pools, optional additional costs
//! - `effects`: one-shot and continuous effects, filters, targets, resolver
//! - `layers`: continuous effect registry and the layer engine
//! - `triggers`: events, event bus, trigger conditions and matching
//! - `abilities`: ability kinds, kicker
//! - `decisions`: the `DecisionMaker` trait and scripted players
//! - `stack`: the stack and priority passing
//! - `game`: the `Game` driver tying it all together

pub mod abilities;
pub mod cards;
pub mod core;
pub mod costs;
pub mod decisions;
pub mod effects;
pub mod error;
pub mod game;
pub mod layers;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    AbilityId, EffectId, GameConfig, GameState, ObjectId, Player, PlayerId, PlayerMap, SideChannel,
    SideValue, StackEntryId, Step, TurnState,
};

pub use crate::zones::{Zone, ZoneManager, ZonePosition};

pub use crate::cards::{
    CardDefinition, CardRegistry, CardType, Characteristics, Color, ColorSet, CounterType, GameObject,
    Keyword,
};

pub use crate::costs::{Cost, ManaCost, ManaPool, ManaType, OptionalAdditionalCost};

pub use crate::effects::{
    Affected, Amount, Condition, ContinuousEffect, Duration, Effect, EffectResolver, Layer,
    Modification, ObjectFilter, OneShotEffect, Outcome, ResolverContext, SubLayer, Target,
    TargetSpec,
};

pub use crate::layers::{
    ContinuousEffects, DependencyLoop, LayerEngine, LayerReport, NewEffect, ObjectView,
};

pub use crate::triggers::{
    EventBus, EventType, GameEvent, PendingTrigger, StashRule, TriggerCondition, TriggerRegistry,
    TriggerSpec,
};

pub use crate::abilities::{Ability, AbilityKind, Capabilities, KickerAbility, SpellAbility};

pub use crate::decisions::{DecisionMaker, DeclineAll, PlayerLeft, ScriptedDecisions};

pub use crate::stack::{Stack, StackItem, StackObject};

pub use crate::game::{Attack, Game, GameResult};

pub use crate::error::{EngineError, Result};
