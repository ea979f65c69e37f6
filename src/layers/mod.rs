//! Continuous effects and the layer system.
//!
//! ## Key Types
//!
//! - `ContinuousEffects`: registry of continuous effect entries and their
//!   lifecycle (pending, active, expired)
//! - `LayerEngine`: recomputes object views, layer by layer
//! - `ObjectView`: an object's characteristics after all effects
//! - `sort_with_dependencies`: dependency-aware ordering within a layer

pub mod dependency;
pub mod engine;
pub mod registry;
pub mod view;

pub use dependency::{sort_with_dependencies, DependencyOrder};
pub use engine::{DependencyLoop, LayerEngine, LayerOutcome, LayerReport};
pub use registry::{ContinuousEffects, EntryStatus, NewEffect, RegisteredEffect};
pub use view::ObjectView;
