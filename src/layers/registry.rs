//! Continuous effect registry.
//!
//! Every registered continuous effect moves through
//! `Pending -> Active -> Expired`. Entries are created pending when an ability
//! resolves (or a static ability starts to function), activated with a fresh
//! timestamp, and expired by a duration boundary, an explicit discard, or the
//! source becoming invalid. Expired entries are purged before the next
//! characteristic computation.

use im::OrdMap;
use tracing::debug;

use crate::core::{AbilityId, EffectId, ObjectId, PlayerId};
use crate::effects::{ContinuousEffect, Duration};

/// Lifecycle state of a registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    Pending,
    Active,
    Expired,
}

/// Everything needed to register an effect.
#[derive(Clone, Debug)]
pub struct NewEffect {
    pub effect: ContinuousEffect,
    pub source: ObjectId,
    /// Zone-change counter of the source when the effect was created.
    pub source_zone_change_counter: u32,
    pub source_ability: AbilityId,
    pub controller: PlayerId,
    /// Generated by a static ability rather than a resolving one.
    pub from_static: bool,
}

/// A registered continuous effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredEffect {
    pub id: EffectId,
    pub effect: ContinuousEffect,
    pub source: ObjectId,
    pub source_zone_change_counter: u32,
    pub source_ability: AbilityId,
    pub controller: PlayerId,
    /// Assigned on activation; zero while pending.
    pub timestamp: u64,
    pub status: EntryStatus,
    pub from_static: bool,
}

impl RegisteredEffect {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }
}

/// All continuous effects of a game.
#[derive(Clone, Debug, Default)]
pub struct ContinuousEffects {
    entries: OrdMap<EffectId, RegisteredEffect>,
    next_id: u32,
}

impl ContinuousEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending effect.
    pub fn add(&mut self, new: NewEffect) -> EffectId {
        self.next_id += 1;
        let id = EffectId(self.next_id);
        self.entries.insert(
            id,
            RegisteredEffect {
                id,
                effect: new.effect,
                source: new.source,
                source_zone_change_counter: new.source_zone_change_counter,
                source_ability: new.source_ability,
                controller: new.controller,
                timestamp: 0,
                status: EntryStatus::Pending,
                from_static: new.from_static,
            },
        );
        id
    }

    /// Move a pending entry to active with the given timestamp.
    pub fn activate(&mut self, id: EffectId, timestamp: u64) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.status == EntryStatus::Pending => {
                entry.status = EntryStatus::Active;
                entry.timestamp = timestamp;
                true
            }
            _ => false,
        }
    }

    /// Expire an entry. Returns false if it was unknown or already expired.
    pub fn discard(&mut self, id: EffectId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.status != EntryStatus::Expired => {
                entry.status = EntryStatus::Expired;
                debug!(effect = %id, source = %entry.source, "discarded continuous effect");
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&RegisteredEffect> {
        self.entries.get(&id)
    }

    /// Active entries in id order.
    pub fn active(&self) -> impl Iterator<Item = &RegisteredEffect> {
        self.entries.values().filter(|e| e.is_active())
    }

    /// All entries in id order, any status.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredEffect> {
        self.entries.values()
    }

    /// Expire every live entry with the given duration.
    pub fn expire_duration(&mut self, duration: Duration) -> Vec<EffectId> {
        self.expire_where(|e| e.effect.duration == duration)
    }

    /// Expire the effects of a source's static abilities.
    pub fn expire_static_from(&mut self, source: ObjectId) -> Vec<EffectId> {
        self.expire_where(|e| e.from_static && e.source == source)
    }

    /// Expire every live entry matching `predicate`.
    pub fn expire_where(&mut self, predicate: impl Fn(&RegisteredEffect) -> bool) -> Vec<EffectId> {
        let ids: Vec<EffectId> = self
            .entries
            .values()
            .filter(|e| e.status != EntryStatus::Expired && predicate(e))
            .map(|e| e.id)
            .collect();
        for id in &ids {
            self.discard(*id);
        }
        ids
    }

    /// Remove expired entries. Returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let expired: Vec<EffectId> = self
            .entries
            .values()
            .filter(|e| e.status == EntryStatus::Expired)
            .map(|e| e.id)
            .collect();
        for id in &expired {
            self.entries.remove(id);
        }
        expired.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Keyword;
    use crate::effects::Affected;

    fn new_effect(duration: Duration, from_static: bool) -> NewEffect {
        NewEffect {
            effect: ContinuousEffect::grant(Keyword::Flying, Affected::Source, duration),
            source: ObjectId(1),
            source_zone_change_counter: 1,
            source_ability: AbilityId(1),
            controller: PlayerId(0),
            from_static,
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut registry = ContinuousEffects::new();
        let id = registry.add(new_effect(Duration::EndOfTurn, false));

        assert_eq!(registry.get(id).unwrap().status, EntryStatus::Pending);
        assert_eq!(registry.active().count(), 0);

        assert!(registry.activate(id, 7));
        assert!(!registry.activate(id, 8));
        assert_eq!(registry.get(id).unwrap().timestamp, 7);
        assert_eq!(registry.active().count(), 1);

        assert!(registry.discard(id));
        assert!(!registry.discard(id));
        assert_eq!(registry.purge_expired(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expire_end_of_turn_only() {
        let mut registry = ContinuousEffects::new();
        let eot = registry.add(new_effect(Duration::EndOfTurn, false));
        let game = registry.add(new_effect(Duration::EndOfGame, false));
        registry.activate(eot, 1);
        registry.activate(game, 2);

        assert_eq!(registry.expire_duration(Duration::EndOfTurn), vec![eot]);
        registry.purge_expired();
        assert!(registry.get(eot).is_none());
        assert!(registry.get(game).is_some());
    }

    #[test]
    fn test_expire_static_from_source() {
        let mut registry = ContinuousEffects::new();
        let stat = registry.add(new_effect(Duration::WhileOnBattlefield, true));
        let resolved = registry.add(new_effect(Duration::WhileOnBattlefield, false));

        assert_eq!(registry.expire_static_from(ObjectId(1)), vec![stat]);
        assert_eq!(registry.get(resolved).unwrap().status, EntryStatus::Pending);
    }

    #[test]
    fn test_snapshot_isolation() {
        let mut registry = ContinuousEffects::new();
        let id = registry.add(new_effect(Duration::EndOfTurn, false));
        let snapshot = registry.clone();

        registry.activate(id, 3);
        assert_eq!(snapshot.get(id).unwrap().status, EntryStatus::Pending);
    }
}
