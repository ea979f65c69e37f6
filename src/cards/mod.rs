//! Card system: characteristics, definitions, game objects, and registry.
//!
//! ## Key Types
//!
//! - `Characteristics`: name, cost, colors, types, keywords, power/toughness
//! - `CardDefinition`: Immutable card data with ability templates
//! - `GameObject`: One card in one game, with its mutable state
//! - `CardRegistry`: Card definition lookup by name

pub mod characteristics;
pub mod definition;
pub mod object;
pub mod registry;

pub use characteristics::{
    CardType, Characteristics, Color, ColorSet, CounterType, Counters, Keyword,
};
pub use definition::CardDefinition;
pub use object::GameObject;
pub use registry::CardRegistry;
