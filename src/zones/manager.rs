//! Zone manager for object locations and movement.
//!
//! The `ZoneManager` tracks where objects are and keeps the order of the
//! ordered per-player zones (library, graveyard). The stack keeps its own
//! order in `stack::Stack`.
//!
//! Backed by `im` collections so a game snapshot clones in O(1).

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::Zone;
use crate::core::{ObjectId, PlayerId};

/// Position for inserting an object into an ordered zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (e.g., top of library).
    #[default]
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct OrderKey {
    zone: Zone,
    owner: PlayerId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Location {
    zone: Zone,
    owner: PlayerId,
}

/// Tracks which zone every object is in.
///
/// ```
/// use mtg_engine::zones::{Zone, ZoneManager, ZonePosition};
/// use mtg_engine::core::{ObjectId, PlayerId};
///
/// let mut zones = ZoneManager::new();
/// let owner = PlayerId::new(0);
/// zones.add(ObjectId(10), Zone::Library, owner, ZonePosition::Top);
/// zones.add(ObjectId(11), Zone::Library, owner, ZonePosition::Top);
///
/// assert_eq!(zones.top(Zone::Library, owner), Some(ObjectId(11)));
/// zones.move_to(ObjectId(11), Zone::Hand, ZonePosition::Top);
/// assert_eq!(zones.zone_of(ObjectId(11)), Some(Zone::Hand));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    locations: OrdMap<ObjectId, Location>,
    order: OrdMap<OrderKey, Vector<ObjectId>>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to a zone.
    ///
    /// Returns `false` (and changes nothing) if the object is already tracked.
    pub fn add(&mut self, object: ObjectId, zone: Zone, owner: PlayerId, position: ZonePosition) -> bool {
        if self.locations.contains_key(&object) {
            return false;
        }
        self.locations.insert(object, Location { zone, owner });
        self.insert_ordered(object, zone, owner, position);
        true
    }

    /// Move an object to another zone.
    ///
    /// Returns the old zone, or `None` if the object isn't tracked.
    pub fn move_to(&mut self, object: ObjectId, zone: Zone, position: ZonePosition) -> Option<Zone> {
        let old = self.locations.get(&object).copied()?;
        self.remove_ordered(object, old);
        self.locations.insert(object, Location { zone, owner: old.owner });
        self.insert_ordered(object, zone, old.owner, position);
        Some(old.zone)
    }

    /// Stop tracking an object entirely.
    pub fn remove(&mut self, object: ObjectId) -> Option<Zone> {
        let old = self.locations.remove(&object)?;
        self.remove_ordered(object, old);
        Some(old.zone)
    }

    /// Get the zone an object is in.
    #[must_use]
    pub fn zone_of(&self, object: ObjectId) -> Option<Zone> {
        self.locations.get(&object).map(|l| l.zone)
    }

    #[must_use]
    pub fn is_in(&self, object: ObjectId, zone: Zone) -> bool {
        self.zone_of(object) == Some(zone)
    }

    /// All objects in a zone, in id order.
    pub fn objects_in(&self, zone: Zone) -> impl Iterator<Item = ObjectId> + '_ {
        self.locations
            .iter()
            .filter(move |(_, l)| l.zone == zone)
            .map(|(&id, _)| id)
    }

    /// Objects in one player's ordered zone, bottom first.
    #[must_use]
    pub fn ordered(&self, zone: Zone, owner: PlayerId) -> Vec<ObjectId> {
        self.order
            .get(&OrderKey { zone, owner })
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Top object of one player's ordered zone.
    #[must_use]
    pub fn top(&self, zone: Zone, owner: PlayerId) -> Option<ObjectId> {
        self.order.get(&OrderKey { zone, owner })?.last().copied()
    }

    /// Number of objects in a zone across all owners.
    #[must_use]
    pub fn count(&self, zone: Zone) -> usize {
        self.objects_in(zone).count()
    }

    fn insert_ordered(&mut self, object: ObjectId, zone: Zone, owner: PlayerId, position: ZonePosition) {
        if !zone.is_ordered() {
            return;
        }
        let key = OrderKey { zone, owner };
        let mut order = self.order.get(&key).cloned().unwrap_or_default();
        match position {
            ZonePosition::Top => order.push_back(object),
            ZonePosition::Bottom => order.push_front(object),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, object);
            }
        }
        self.order.insert(key, order);
    }

    fn remove_ordered(&mut self, object: ObjectId, location: Location) {
        if let Some(order) = self.order.get_mut(&OrderKey {
            zone: location.zone,
            owner: location.owner,
        }) {
            *order = order.iter().copied().filter(|&o| o != object).collect();
        }
    }
}
