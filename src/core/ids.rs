//! Identifiers for game objects, abilities and registered effects.
//!
//! Every id is a plain `u32` newtype. Ids are allocated by `GameState` and are
//! never reused within a game, so a stale id simply fails to resolve.
//!
//! ## Usage
//!
//! ```
//! use mtg_engine::core::{AbilityId, ObjectId};
//!
//! let wurm = ObjectId::new(12);
//! assert_eq!(wurm.raw(), 12);
//! assert_eq!(format!("{}", AbilityId::new(3)), "Ability(3)");
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of a game object (card, spell or permanent).
///
/// The id survives zone changes; use the object's zone-change counter to tell
/// one incarnation from the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Create a new object ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Identifier of an ability instance bound to a source object.
///
/// `AbilityId(0)` marks an ability template that has not been bound yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    /// Placeholder id carried by ability templates inside card definitions.
    pub const UNBOUND: Self = Self(0);

    /// Create a new ability ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this id has been assigned by a game.
    #[must_use]
    pub const fn is_bound(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}

/// Identifier of a continuous effect registered with the layer system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl EffectId {
    /// Create a new effect ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// Identifier of an entry on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackEntryId(pub u32);

impl std::fmt::Display for StackEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackEntry({})", self.0)
    }
}
