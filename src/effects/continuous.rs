//! Continuous effects.
//!
//! A `ContinuousEffect` is a modification of characteristics that lasts for a
//! duration. It is a plain value: the layer engine decides which objects it
//! affects and in what order it applies.
//!
//! ## Layers
//!
//! Modifications are applied in layer order (`Layer`), and inside the
//! power/toughness layer in sublayer order (`SubLayer`): characteristic
//! defining abilities, setting effects, counters, modifications, switching.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::effect::Condition;
use super::filter::ObjectFilter;
use crate::abilities::Ability;
use crate::cards::{CardType, ColorSet, Keyword};
use crate::core::{ObjectId, PlayerId};

/// The layers of the characteristic computation, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Copy,
    Control,
    Text,
    Type,
    Color,
    Ability,
    PowerToughness,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Copy,
        Layer::Control,
        Layer::Text,
        Layer::Type,
        Layer::Color,
        Layer::Ability,
        Layer::PowerToughness,
    ];
}

/// Sublayers; only the power/toughness layer uses anything but `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubLayer {
    None,
    CharacteristicDefining,
    SetPowerToughness,
    /// Counters are applied by the engine, no effect lives here.
    Counters,
    ModifyPowerToughness,
    SwitchPowerToughness,
}

impl SubLayer {
    pub const POWER_TOUGHNESS: [SubLayer; 5] = [
        SubLayer::CharacteristicDefining,
        SubLayer::SetPowerToughness,
        SubLayer::Counters,
        SubLayer::ModifyPowerToughness,
        SubLayer::SwitchPowerToughness,
    ];
}

/// How long a registered effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    /// While the source stays on the battlefield as the same object.
    WhileOnBattlefield,
    EndOfTurn,
    /// Until the untap step of the effect controller's next turn.
    UntilYourNextTurn,
    EndOfGame,
    /// Until the effect discards itself.
    Custom,
}

/// Intended consequence, used by decision makers to judge a prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Benefit,
    Detriment,
    GainControl,
    BoostCreature,
    UnboostCreature,
    AddAbility,
    LoseAbility,
    Neutral,
}

/// Who gains control in a control-changing effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlSource {
    Player(PlayerId),
    /// The controller recorded for the effect at registration.
    EffectController,
    /// The player stashed in the side channel by the effect's ability.
    Stashed,
}

/// A number used by characteristic-defining abilities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountValue {
    Fixed(i32),
    /// Number of objects matching the filter, from the effect's perspective.
    CountOf(ObjectFilter),
}

/// What a continuous effect changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modification {
    // === Layer 1 ===
    /// Copiable values become those of another object.
    CopyOf(ObjectId),

    // === Layer 2 ===
    ChangeControl(ControlSource),

    // === Layer 3 ===
    ReplaceSubtype { from: String, to: String },

    // === Layer 4 ===
    AddCardType(CardType),
    AddSubtype(String),

    // === Layer 5 ===
    SetColors(ColorSet),
    AddColors(ColorSet),

    // === Layer 6 ===
    AddKeyword(Keyword),
    RemoveKeyword(Keyword),
    /// Grant a full ability; triggered ones trigger like printed ones.
    AddAbility(Box<Ability>),
    RemoveAllAbilities,
    /// Can't attack or block, and its activated abilities can't be activated.
    Detain,

    // === Layer 7 ===
    DefinePowerToughness { power: CountValue, toughness: CountValue },
    SetPowerToughness { power: i32, toughness: i32 },
    ModifyPowerToughness { power: i32, toughness: i32 },
    SwitchPowerToughness,
}

impl Modification {
    #[must_use]
    pub fn layer(&self) -> Layer {
        match self {
            Modification::CopyOf(_) => Layer::Copy,
            Modification::ChangeControl(_) => Layer::Control,
            Modification::ReplaceSubtype { .. } => Layer::Text,
            Modification::AddCardType(_) | Modification::AddSubtype(_) => Layer::Type,
            Modification::SetColors(_) | Modification::AddColors(_) => Layer::Color,
            Modification::AddKeyword(_)
            | Modification::RemoveKeyword(_)
            | Modification::AddAbility(_)
            | Modification::RemoveAllAbilities
            | Modification::Detain => Layer::Ability,
            Modification::DefinePowerToughness { .. }
            | Modification::SetPowerToughness { .. }
            | Modification::ModifyPowerToughness { .. }
            | Modification::SwitchPowerToughness => Layer::PowerToughness,
        }
    }

    #[must_use]
    pub fn sublayer(&self) -> SubLayer {
        match self {
            Modification::DefinePowerToughness { .. } => SubLayer::CharacteristicDefining,
            Modification::SetPowerToughness { .. } => SubLayer::SetPowerToughness,
            Modification::ModifyPowerToughness { .. } => SubLayer::ModifyPowerToughness,
            Modification::SwitchPowerToughness => SubLayer::SwitchPowerToughness,
            _ => SubLayer::None,
        }
    }

    /// Outcome implied by the modification when none is given.
    #[must_use]
    pub fn default_outcome(&self) -> Outcome {
        match self {
            Modification::ChangeControl(_) => Outcome::GainControl,
            Modification::AddKeyword(_) | Modification::AddAbility(_) => Outcome::AddAbility,
            Modification::RemoveKeyword(_) | Modification::RemoveAllAbilities => Outcome::LoseAbility,
            Modification::Detain => Outcome::Detriment,
            Modification::ModifyPowerToughness { power, toughness } if power + toughness < 0 => {
                Outcome::UnboostCreature
            }
            Modification::ModifyPowerToughness { .. } => Outcome::BoostCreature,
            _ => Outcome::Neutral,
        }
    }
}

/// An object locked into an effect at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockedObject {
    pub id: ObjectId,
    pub zone_change_counter: u32,
}

/// Which objects an effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affected {
    /// The effect's source object, while it remains the same object.
    Source,
    /// Every object matching the filter, re-evaluated on every application.
    Filter(ObjectFilter),
    /// Objects matching the filter when the effect is created; fixed afterwards.
    LockedFilter(ObjectFilter),
    /// The ability's chosen target at this index, fixed at creation.
    Target(usize),
    /// Every object the ability targeted, fixed at creation.
    AllTargets,
    /// An explicit fixed set.
    Objects(SmallVec<[LockedObject; 2]>),
}

impl Affected {
    /// Whether the affected set may change after registration.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Affected::Source | Affected::Filter(_))
    }
}

/// A continuous effect definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuousEffect {
    pub modification: Modification,
    pub affected: Affected,
    pub duration: Duration,
    pub outcome: Outcome,
    /// Applies only while this holds ("as long as ...").
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl ContinuousEffect {
    #[must_use]
    pub fn new(modification: Modification, affected: Affected, duration: Duration) -> Self {
        let outcome = modification.default_outcome();
        Self {
            modification,
            affected,
            duration,
            outcome,
            condition: None,
        }
    }

    /// `+power/+toughness` to the affected objects.
    #[must_use]
    pub fn boost(power: i32, toughness: i32, affected: Affected, duration: Duration) -> Self {
        Self::new(
            Modification::ModifyPowerToughness { power, toughness },
            affected,
            duration,
        )
    }

    /// Grant a keyword to the affected objects.
    #[must_use]
    pub fn grant(keyword: Keyword, affected: Affected, duration: Duration) -> Self {
        Self::new(Modification::AddKeyword(keyword), affected, duration)
    }

    /// Grant an ability to the affected objects.
    #[must_use]
    pub fn grant_ability(ability: Ability, affected: Affected, duration: Duration) -> Self {
        Self::new(Modification::AddAbility(Box::new(ability)), affected, duration)
    }

    /// Apply only while `condition` holds for the effect's source and
    /// controller.
    #[must_use]
    pub fn as_long_as(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    #[must_use]
    pub fn layer(&self) -> Layer {
        self.modification.layer()
    }

    #[must_use]
    pub fn sublayer(&self) -> SubLayer {
        self.modification.sublayer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_assignment() {
        assert_eq!(Modification::CopyOf(ObjectId(1)).layer(), Layer::Copy);
        assert_eq!(
            Modification::ChangeControl(ControlSource::Stashed).layer(),
            Layer::Control
        );
        assert_eq!(Modification::AddKeyword(Keyword::Haste).layer(), Layer::Ability);
        assert_eq!(Modification::SwitchPowerToughness.layer(), Layer::PowerToughness);
        assert_eq!(
            Modification::SetPowerToughness { power: 0, toughness: 1 }.sublayer(),
            SubLayer::SetPowerToughness
        );
        assert_eq!(Modification::AddSubtype("Elf".into()).sublayer(), SubLayer::None);
    }

    #[test]
    fn test_layer_order() {
        assert!(Layer::Copy < Layer::Control);
        assert!(Layer::Ability < Layer::PowerToughness);
        assert!(SubLayer::Counters < SubLayer::ModifyPowerToughness);
        assert!(SubLayer::SetPowerToughness < SubLayer::Counters);
    }

    #[test]
    fn test_default_outcomes() {
        let boost = ContinuousEffect::boost(3, -3, Affected::Target(0), Duration::EndOfTurn);
        assert_eq!(boost.outcome, Outcome::BoostCreature);

        let shrink = ContinuousEffect::boost(-2, -2, Affected::Target(0), Duration::EndOfTurn);
        assert_eq!(shrink.outcome, Outcome::UnboostCreature);

        let control = ContinuousEffect::new(
            Modification::ChangeControl(ControlSource::Stashed),
            Affected::Source,
            Duration::Custom,
        );
        assert_eq!(control.outcome, Outcome::GainControl);
    }

    #[test]
    fn test_dynamic_affected() {
        assert!(Affected::Source.is_dynamic());
        assert!(Affected::Filter(ObjectFilter::creature()).is_dynamic());
        assert!(!Affected::LockedFilter(ObjectFilter::creature()).is_dynamic());
        assert!(!Affected::Target(0).is_dynamic());
        assert!(!Affected::AllTargets.is_dynamic());
    }

    #[test]
    fn test_granted_ability_is_layer_six() {
        let granted = ContinuousEffect::grant_ability(
            Ability::state_triggered(Condition::SourceOnBattlefield, []),
            Affected::Source,
            Duration::WhileOnBattlefield,
        )
        .as_long_as(Condition::ControlsCommander);
        assert_eq!(granted.layer(), Layer::Ability);
        assert_eq!(granted.outcome, Outcome::AddAbility);
        assert_eq!(granted.condition, Some(Condition::ControlsCommander));
        assert_eq!(Modification::Detain.layer(), Layer::Ability);
    }
}
