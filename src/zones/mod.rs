//! Zones and object locations.
//!
//! ## Key Types
//!
//! - `Zone`: The fixed set of game zones
//! - `ZoneManager`: Object location tracking and movement
//! - `ZonePosition`: Position specifier for ordered zones

pub mod manager;

pub use manager::{ZoneManager, ZonePosition};

use serde::{Deserialize, Serialize};

/// A game zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
}

impl Zone {
    /// Zones where every player may see the objects.
    #[must_use]
    pub fn is_public(self) -> bool {
        !matches!(self, Zone::Library | Zone::Hand)
    }

    /// Zones where object order matters.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        matches!(self, Zone::Library | Zone::Graveyard)
    }

    /// Zones that exist once per player rather than being shared.
    #[must_use]
    pub fn is_per_player(self) -> bool {
        matches!(self, Zone::Library | Zone::Hand | Zone::Graveyard)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Stack => "stack",
            Zone::Exile => "exile",
        };
        f.write_str(name)
    }
}
