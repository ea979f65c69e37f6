//! Card characteristics: the values the layer system reads and rewrites.
//!
//! ## Types
//!
//! - `Color` / `ColorSet`: the five colors, as a bitflag set
//! - `CardType`, `Keyword`: closed vocabularies
//! - `CounterType` / `Counters`: counters placed on objects
//! - `Characteristics`: name, cost, colors, types, subtypes, keywords, P/T

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::costs::ManaCost;

/// One of the five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    /// WUBRG order.
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    /// Mana symbol letter.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Color> {
        match symbol.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            _ => None,
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

bitflags::bitflags! {
    /// A set of colors. The empty set is colorless.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ColorSet: u8 {
        const WHITE = 1 << 0;
        const BLUE = 1 << 1;
        const BLACK = 1 << 2;
        const RED = 1 << 3;
        const GREEN = 1 << 4;
    }
}

impl From<Color> for ColorSet {
    fn from(color: Color) -> Self {
        match color {
            Color::White => ColorSet::WHITE,
            Color::Blue => ColorSet::BLUE,
            Color::Black => ColorSet::BLACK,
            Color::Red => ColorSet::RED,
            Color::Green => ColorSet::GREEN,
        }
    }
}

impl ColorSet {
    #[must_use]
    pub fn has(self, color: Color) -> bool {
        self.contains(ColorSet::from(color))
    }

    #[must_use]
    pub fn is_colorless(self) -> bool {
        self.is_empty()
    }
}

/// Card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
    Tribal,
}

impl CardType {
    /// Whether objects of this type enter the battlefield on resolution.
    #[must_use]
    pub fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery | CardType::Tribal)
    }
}

/// Keyword abilities tracked by the layer system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Deathtouch,
    Defender,
    FirstStrike,
    Flying,
    Haste,
    Lifelink,
    Reach,
    Trample,
    Vigilance,
}

/// Kinds of counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterType {
    PlusOnePlusOne,
    MinusOneMinusOne,
    Charge,
    Time,
}

impl std::fmt::Display for CounterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CounterType::PlusOnePlusOne => "+1/+1",
            CounterType::MinusOneMinusOne => "-1/-1",
            CounterType::Charge => "charge",
            CounterType::Time => "time",
        };
        f.write_str(name)
    }
}

/// Counters on an object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters(FxHashMap<CounterType, u32>);

impl Counters {
    #[must_use]
    pub fn get(&self, counter: CounterType) -> u32 {
        self.0.get(&counter).copied().unwrap_or(0)
    }

    pub fn add(&mut self, counter: CounterType, amount: u32) {
        if amount > 0 {
            *self.0.entry(counter).or_insert(0) += amount;
        }
    }

    /// Remove up to `amount` counters; returns how many were removed.
    pub fn remove(&mut self, counter: CounterType, amount: u32) -> u32 {
        let current = self.get(counter);
        let removed = current.min(amount);
        if current == removed {
            self.0.remove(&counter);
        } else {
            self.0.insert(counter, current - removed);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Net P/T change from +1/+1 and -1/-1 counters.
    #[must_use]
    pub fn pt_delta(&self) -> i32 {
        self.get(CounterType::PlusOnePlusOne) as i32 - self.get(CounterType::MinusOneMinusOne) as i32
    }
}

/// The characteristic values of an object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub mana_cost: Option<ManaCost>,
    pub colors: ColorSet,
    pub card_types: SmallVec<[CardType; 2]>,
    pub subtypes: SmallVec<[String; 2]>,
    pub keywords: SmallVec<[Keyword; 4]>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
}

impl Characteristics {
    /// Characteristics with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s == subtype)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.card_types.iter().any(|t| t.is_permanent())
    }

    pub fn add_type(&mut self, card_type: CardType) {
        if !self.has_type(card_type) {
            self.card_types.push(card_type);
        }
    }

    pub fn add_subtype(&mut self, subtype: &str) {
        if !self.has_subtype(subtype) {
            self.subtypes.push(subtype.to_string());
        }
    }

    pub fn add_keyword(&mut self, keyword: Keyword) {
        if !self.has_keyword(keyword) {
            self.keywords.push(keyword);
        }
    }

    pub fn remove_keyword(&mut self, keyword: Keyword) {
        self.keywords.retain(|k| *k != keyword);
    }
}
