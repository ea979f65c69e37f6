//! Effect system for card abilities.
//!
//! ## Key Types
//!
//! - `Effect`: One-shot, continuous, or conditional effect
//! - `ContinuousEffect`: A layered modification with a duration
//! - `ObjectFilter`: Immutable description of a set of objects
//! - `TargetSpec` / `Target`: Target slots and chosen targets
//! - `EffectResolver`: Executes effects on game state

pub mod continuous;
pub mod effect;
pub mod filter;
pub mod resolver;
pub mod targeting;

pub use continuous::{
    Affected, ContinuousEffect, ControlSource, CountValue, Duration, Layer, LockedObject,
    Modification, Outcome, SubLayer,
};
pub use effect::{Amount, Condition, Effect, EffectTarget, OneShotEffect, PlayerRef};
pub use filter::{ControllerFilter, FilterContext, ObjectFilter};
pub use resolver::{EffectResolver, PendingChoice, ResolveResult, ResolverContext};
pub use targeting::{Target, TargetSpec};
