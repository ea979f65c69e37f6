//! Object filters.
//!
//! An `ObjectFilter` is an immutable description of a set of objects ("green
//! spells", "attacking creatures you control", "another artifact"). Filters are
//! plain values built per card; nothing is shared between cards.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardType, Color, ColorSet, CounterType};
use crate::core::{ObjectId, PlayerId};
use crate::layers::ObjectView;
use crate::zones::Zone;

/// Who must control a matching object, relative to the filter's user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerFilter {
    #[default]
    Any,
    You,
    Opponent,
}

impl ControllerFilter {
    #[must_use]
    pub fn allows(self, controller: PlayerId, you: PlayerId) -> bool {
        match self {
            ControllerFilter::Any => true,
            ControllerFilter::You => controller == you,
            ControllerFilter::Opponent => controller != you,
        }
    }
}

/// Perspective a filter is evaluated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterContext {
    /// Object owning the ability that uses the filter.
    pub source: ObjectId,
    /// Controller of that ability.
    pub controller: PlayerId,
}

impl FilterContext {
    #[must_use]
    pub fn new(source: ObjectId, controller: PlayerId) -> Self {
        Self { source, controller }
    }
}

/// Description of a set of objects.
///
/// ```
/// use mtg_engine::cards::CardType;
/// use mtg_engine::effects::ObjectFilter;
///
/// let filter = ObjectFilter::creature().you_control().attacking();
/// assert!(filter.card_types.contains(&CardType::Creature));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectFilter {
    /// Zone the object must be in; `None` matches every zone.
    pub zone: Option<Zone>,
    /// Every listed type is required.
    pub card_types: SmallVec<[CardType; 2]>,
    /// At least one listed subtype is required (if any are listed).
    pub subtypes: SmallVec<[String; 1]>,
    /// At least one listed color is required (if any are listed).
    pub colors: ColorSet,
    pub controller: ControllerFilter,
    pub attacking: Option<bool>,
    pub tapped: Option<bool>,
    pub with_counter: Option<CounterType>,
    /// Excludes the filter's own source.
    pub another: bool,
}

impl Default for ObjectFilter {
    fn default() -> Self {
        Self::permanent()
    }
}

impl ObjectFilter {
    /// Any permanent.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            zone: Some(Zone::Battlefield),
            card_types: SmallVec::new(),
            subtypes: SmallVec::new(),
            colors: ColorSet::empty(),
            controller: ControllerFilter::Any,
            attacking: None,
            tapped: None,
            with_counter: None,
            another: false,
        }
    }

    /// Any creature on the battlefield.
    #[must_use]
    pub fn creature() -> Self {
        Self::permanent().with_type(CardType::Creature)
    }

    /// Any spell on the stack.
    #[must_use]
    pub fn spell() -> Self {
        Self {
            zone: Some(Zone::Stack),
            ..Self::permanent()
        }
    }

    /// Objects in any zone.
    #[must_use]
    pub fn any_zone() -> Self {
        Self {
            zone: None,
            ..Self::permanent()
        }
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.card_types.push(card_type);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.colors |= ColorSet::from(color);
        self
    }

    #[must_use]
    pub fn you_control(mut self) -> Self {
        self.controller = ControllerFilter::You;
        self
    }

    #[must_use]
    pub fn opponent_controls(mut self) -> Self {
        self.controller = ControllerFilter::Opponent;
        self
    }

    #[must_use]
    pub fn attacking(mut self) -> Self {
        self.attacking = Some(true);
        self
    }

    #[must_use]
    pub fn untapped(mut self) -> Self {
        self.tapped = Some(false);
        self
    }

    #[must_use]
    pub fn with_counter(mut self, counter: CounterType) -> Self {
        self.with_counter = Some(counter);
        self
    }

    #[must_use]
    pub fn another(mut self) -> Self {
        self.another = true;
        self
    }

    /// Check a view against this filter.
    #[must_use]
    pub fn matches(&self, view: &ObjectView, ctx: &FilterContext) -> bool {
        let chars = &view.characteristics;

        if self.zone.is_some_and(|z| z != view.zone) {
            return false;
        }
        if self.another && view.id == ctx.source {
            return false;
        }
        if !self.card_types.iter().all(|t| chars.has_type(*t)) {
            return false;
        }
        if !self.subtypes.is_empty() && !self.subtypes.iter().any(|s| chars.has_subtype(s)) {
            return false;
        }
        if !self.colors.is_empty() && !self.colors.intersects(chars.colors) {
            return false;
        }
        if !self.controller.allows(view.controller, ctx.controller) {
            return false;
        }
        if self.attacking.is_some_and(|a| a != view.attacking) {
            return false;
        }
        if self.tapped.is_some_and(|t| t != view.tapped) {
            return false;
        }
        if self.with_counter.is_some_and(|c| view.counters.get(c) == 0) {
            return false;
        }
        true
    }
}
