//! Costs: mana, non-mana components and optional additional costs.
//!
//! ## Key Types
//!
//! - `ManaCost` / `ManaPool`: brace-notation costs and the mana that pays them
//! - `Cost`: one component of an ability's cost
//! - `OptionalAdditionalCost`: a kicker line with its activation count

pub mod cost;
pub mod mana;
pub mod optional;

pub use cost::Cost;
pub use mana::{ManaCost, ManaPool, ManaType};
pub use optional::OptionalAdditionalCost;
