//! Events and triggered abilities.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: An immutable record of something that happened
//! - [`EventBus`]: Synchronous publish/subscribe for observers
//! - [`TriggerSpec`]: When a triggered ability triggers
//! - [`TriggerRegistry`]: Event-type index and two-step matching
//!
//! ## Matching
//!
//! Every published event is checked against the registry: first the cheap
//! event-type filter, then the semantic condition against current state. A
//! trigger may stash a value from the event (who dealt the damage, how much)
//! into the game's side channel for its effect to read on resolution.
//!
//! ```
//! use mtg_engine::cards::{CardDefinition, CardType};
//! use mtg_engine::core::{AbilityId, GameConfig, GameState, PlayerId, Step};
//! use mtg_engine::triggers::{EventType, GameEvent, TriggerCondition, TriggerEntry, TriggerRegistry, TriggerSpec};
//! use mtg_engine::zones::Zone;
//!
//! let mut state = GameState::new(&GameConfig::default());
//! let shrine = CardDefinition::new("Shrine").with_type(CardType::Artifact);
//! let source = state.create_object(&shrine, PlayerId::new(0), Zone::Battlefield);
//!
//! let mut registry = TriggerRegistry::new();
//! registry.register(TriggerEntry {
//!     ability: AbilityId::new(1),
//!     source,
//!     zone: Zone::Battlefield,
//!     spec: TriggerSpec::on(EventType::StepBegan)
//!         .with_condition(TriggerCondition::StepIs(Step::Upkeep))
//!         .with_condition(TriggerCondition::ActivePlayerIsController),
//! });
//!
//! let upkeep = GameEvent::step_began(Step::Upkeep, PlayerId::new(0));
//! assert_eq!(registry.find_triggers(&upkeep, &state).len(), 1);
//! ```

mod bus;
mod condition;
mod event;
mod registry;

pub use bus::{EventBus, SubscriptionId};
pub use condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
pub use event::{EventType, GameEvent};
pub use registry::{PendingTrigger, StashRule, TriggerEntry, TriggerRegistry, TriggerSpec};
