//! Game events.
//!
//! Events are immutable records of something that happened. They are
//! published on the `EventBus` and matched against triggered abilities;
//! nothing downstream mutates them.

use serde::{Deserialize, Serialize};

use crate::cards::CounterType;
use crate::core::{ObjectId, PlayerId, Step};
use crate::zones::Zone;

/// Kind of event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// An object moved between zones. `from`/`to` are set.
    ZoneChanged,
    /// A permanent entered the battlefield. Published after `ZoneChanged`.
    EnteredBattlefield,
    SpellCast,
    AbilityActivated,
    DamagedPlayer,
    CountersAdded,
    GainedLife,
    LostLife,
    DrewCard,
    StepBegan,
    AttackerDeclared,
    ControlChanged,
    /// A player announced a value (e.g. X) as public information.
    ValueAnnounced,
    /// A state trigger's condition holds. Carried by the pending trigger,
    /// never published.
    StateCondition,
}

/// A game event with its payload.
///
/// `source` is the object that caused the event, `target` the object it
/// happened to, `player` the player it happened to (or who acted).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub event_type: EventType,
    pub source: Option<ObjectId>,
    pub target: Option<ObjectId>,
    pub player: Option<PlayerId>,
    /// Damage dealt, life gained, counters added, value announced...
    pub amount: i64,
    /// Damage was combat damage.
    pub combat: bool,
    pub from: Option<Zone>,
    pub to: Option<Zone>,
    pub step: Option<Step>,
    pub counter: Option<CounterType>,
    /// Free text for announcements.
    pub note: Option<String>,
}

impl GameEvent {
    #[must_use]
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            source: None,
            target: None,
            player: None,
            amount: 0,
            combat: false,
            from: None,
            to: None,
            step: None,
            counter: None,
            note: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ObjectId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Object moved from one zone to another.
    #[must_use]
    pub fn zone_change(object: ObjectId, from: Option<Zone>, to: Zone) -> Self {
        Self {
            from,
            to: Some(to),
            ..Self::new(EventType::ZoneChanged).with_source(object)
        }
    }

    #[must_use]
    pub fn entered_battlefield(object: ObjectId, controller: PlayerId) -> Self {
        Self {
            to: Some(Zone::Battlefield),
            ..Self::new(EventType::EnteredBattlefield)
                .with_source(object)
                .with_player(controller)
        }
    }

    #[must_use]
    pub fn state_condition(source: ObjectId, controller: PlayerId) -> Self {
        Self::new(EventType::StateCondition)
            .with_source(source)
            .with_player(controller)
    }

    #[must_use]
    pub fn spell_cast(spell: ObjectId, caster: PlayerId) -> Self {
        Self::new(EventType::SpellCast).with_source(spell).with_player(caster)
    }

    #[must_use]
    pub fn ability_activated(source: ObjectId, player: PlayerId) -> Self {
        Self::new(EventType::AbilityActivated)
            .with_source(source)
            .with_player(player)
    }

    /// `source` dealt `amount` damage to `player`.
    #[must_use]
    pub fn damaged_player(source: ObjectId, player: PlayerId, amount: i64, combat: bool) -> Self {
        Self {
            combat,
            ..Self::new(EventType::DamagedPlayer)
                .with_source(source)
                .with_player(player)
                .with_amount(amount)
        }
    }

    #[must_use]
    pub fn counters_added(object: ObjectId, counter: CounterType, amount: u32) -> Self {
        Self {
            counter: Some(counter),
            ..Self::new(EventType::CountersAdded)
                .with_target(object)
                .with_amount(i64::from(amount))
        }
    }

    #[must_use]
    pub fn life_changed(player: PlayerId, amount: i64) -> Self {
        let event_type = if amount >= 0 {
            EventType::GainedLife
        } else {
            EventType::LostLife
        };
        Self::new(event_type).with_player(player).with_amount(amount.abs())
    }

    #[must_use]
    pub fn drew_card(player: PlayerId, card: ObjectId) -> Self {
        Self::new(EventType::DrewCard).with_player(player).with_target(card)
    }

    /// A step began; `player` is the active player.
    #[must_use]
    pub fn step_began(step: Step, active: PlayerId) -> Self {
        Self {
            step: Some(step),
            ..Self::new(EventType::StepBegan).with_player(active)
        }
    }

    #[must_use]
    pub fn attacker_declared(attacker: ObjectId, controller: PlayerId) -> Self {
        Self::new(EventType::AttackerDeclared)
            .with_source(attacker)
            .with_player(controller)
    }

    #[must_use]
    pub fn control_changed(object: ObjectId, controller: PlayerId) -> Self {
        Self::new(EventType::ControlChanged)
            .with_target(object)
            .with_player(controller)
    }

    /// `player` announced `value` for `source`.
    #[must_use]
    pub fn value_announced(source: ObjectId, player: PlayerId, value: i64, note: impl Into<String>) -> Self {
        Self::new(EventType::ValueAnnounced)
            .with_source(source)
            .with_player(player)
            .with_amount(value)
            .with_note(note)
    }
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.event_type)?;
        if let Some(source) = self.source {
            write!(f, " source={}", source)?;
        }
        if let Some(target) = self.target {
            write!(f, " target={}", target)?;
        }
        if let Some(player) = self.player {
            write!(f, " player={}", player)?;
        }
        if self.amount != 0 {
            write!(f, " amount={}", self.amount)?;
        }
        Ok(())
    }
}
