//! The stack and priority passing.
//!
//! Spells and abilities are pushed onto the stack and resolve in LIFO order.
//! Players pass priority in seat order; when every remaining player has
//! passed in succession, the top of the stack resolves.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::abilities::Ability;
use crate::core::{AbilityId, ObjectId, PlayerId, StackEntryId};
use crate::effects::Target;
use crate::triggers::GameEvent;

/// What a stack entry is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackItem {
    /// A spell: the card itself is in the stack zone.
    Spell { object: ObjectId },

    /// An activated or triggered ability.
    ///
    /// The ability is copied onto the stack so it resolves even if its source
    /// leaves play.
    Ability {
        ability: Ability,
        source: ObjectId,
        /// The event that triggered it, if any.
        event: Option<GameEvent>,
    },
}

/// An entry on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackObject {
    pub id: StackEntryId,
    pub controller: PlayerId,
    pub item: StackItem,
    pub targets: Vec<Target>,
}

impl StackObject {
    /// Id of the ability, for ability entries.
    #[must_use]
    pub fn ability_id(&self) -> Option<AbilityId> {
        match &self.item {
            StackItem::Ability { ability, .. } => Some(ability.id),
            StackItem::Spell { .. } => None,
        }
    }

    /// The spell card or the ability's source.
    #[must_use]
    pub fn source(&self) -> ObjectId {
        match &self.item {
            StackItem::Spell { object } => *object,
            StackItem::Ability { source, .. } => *source,
        }
    }
}

/// LIFO stack with priority tracking.
///
/// ## N-Player Support
///
/// Priority passes in seat order among the players still in the game. All of
/// them must pass consecutively for the top entry to resolve.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    /// Index 0 = bottom, last = top.
    entries: Vector<StackObject>,
    priority: Option<PlayerId>,
    consecutive_passes: usize,
    next_id: u32,
}

impl Stack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an entry. Its controller receives priority.
    pub fn push(&mut self, controller: PlayerId, item: StackItem, targets: Vec<Target>) -> StackEntryId {
        self.next_id += 1;
        let id = StackEntryId(self.next_id);
        self.entries.push_back(StackObject {
            id,
            controller,
            item,
            targets,
        });
        self.consecutive_passes = 0;
        self.priority = Some(controller);
        id
    }

    /// Remove and return the top entry.
    pub fn pop(&mut self) -> Option<StackObject> {
        let top = self.entries.pop_back();
        self.consecutive_passes = 0;
        top
    }

    /// Remove an entry wherever it is (countered, for instance).
    pub fn remove(&mut self, id: StackEntryId) -> Option<StackObject> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    #[must_use]
    pub fn top(&self) -> Option<&StackObject> {
        self.entries.last()
    }

    #[must_use]
    pub fn get(&self, id: StackEntryId) -> Option<&StackObject> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &StackObject> {
        self.entries.iter()
    }

    /// Whether an instance of the ability is waiting to resolve.
    #[must_use]
    pub fn contains_ability(&self, ability: AbilityId) -> bool {
        self.entries.iter().any(|e| e.ability_id() == Some(ability))
    }

    /// Player who currently has priority.
    #[must_use]
    pub fn priority_player(&self) -> Option<PlayerId> {
        self.priority
    }

    /// Give priority to a player and restart the pass count.
    pub fn set_priority(&mut self, player: PlayerId) {
        self.priority = Some(player);
        self.consecutive_passes = 0;
    }

    /// `player` passes priority. `players` are the players still in the game,
    /// in seat order.
    ///
    /// Returns `true` once all of them have passed in succession.
    pub fn pass(&mut self, player: PlayerId, players: &[PlayerId]) -> bool {
        if self.priority != Some(player) {
            return false;
        }
        self.consecutive_passes += 1;
        if self.consecutive_passes >= players.len() {
            return true;
        }
        let next = players
            .iter()
            .position(|p| *p == player)
            .map_or(0, |i| (i + 1) % players.len());
        self.priority = players.get(next).copied();
        false
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.priority = None;
        self.consecutive_passes = 0;
    }
}
