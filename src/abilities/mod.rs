//! Ability object model.
//!
//! - `Ability`: one ability of an object, tagged with its `AbilityKind`
//! - `Capabilities`: what the engine may do with an ability
//! - `KickerAbility`: optional additional costs paid while casting
//! - `SpellAbility`: cost assembly for a spell being cast

pub mod ability;
pub mod kicker;
pub mod spell;

pub use ability::{Ability, AbilityKind, Capabilities, StaticAbility};
pub use kicker::KickerAbility;
pub use spell::SpellAbility;
