//! Mana costs and mana pools.
//!
//! Costs are parsed from the usual brace notation (`{2}{G}{G}`, `{X}{R}`,
//! `{C}`). A pool pays colored symbols from matching mana first, then
//! colorless symbols, then generic from whatever is left.

use serde::{Deserialize, Serialize};

use crate::cards::{Color, ColorSet};
use crate::error::{EngineError, Result};

/// A type of mana in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManaType {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl ManaType {
    pub const ALL: [ManaType; 6] = [
        ManaType::White,
        ManaType::Blue,
        ManaType::Black,
        ManaType::Red,
        ManaType::Green,
        ManaType::Colorless,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl From<Color> for ManaType {
    fn from(color: Color) -> Self {
        match color {
            Color::White => ManaType::White,
            Color::Blue => ManaType::Blue,
            Color::Black => ManaType::Black,
            Color::Red => ManaType::Red,
            Color::Green => ManaType::Green,
        }
    }
}

/// A mana cost.
///
/// ```
/// use mtg_engine::costs::ManaCost;
///
/// let cost = ManaCost::parse("{2}{G}").unwrap();
/// assert_eq!(cost.mana_value(), 3);
/// assert_eq!(cost.to_string(), "{2}{G}");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    /// Colored symbols in WUBRG order.
    pub colored: [u32; 5],
    /// `{C}` symbols.
    pub colorless: u32,
    /// Number of `{X}` symbols.
    pub x_count: u32,
    /// Smallest value that may be announced for X.
    #[serde(default)]
    pub min_x: u32,
}

impl ManaCost {
    /// Parse brace notation. The empty string is the zero cost.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cost = ManaCost::default();
        let mut rest = text.trim();

        while !rest.is_empty() {
            let Some(stripped) = rest.strip_prefix('{') else {
                return Err(EngineError::InvalidManaCost(text.to_string()));
            };
            let Some(end) = stripped.find('}') else {
                return Err(EngineError::InvalidManaCost(text.to_string()));
            };
            let symbol = &stripped[..end];
            rest = &stripped[end + 1..];

            if let Ok(n) = symbol.parse::<u32>() {
                cost.generic = cost.generic.saturating_add(n);
                continue;
            }
            match symbol {
                "X" | "x" => cost.x_count += 1,
                "C" | "c" => cost.colorless += 1,
                _ => {
                    let mut chars = symbol.chars();
                    match (chars.next().and_then(Color::from_symbol), chars.next()) {
                        (Some(color), None) => cost.colored[color.index()] += 1,
                        _ => return Err(EngineError::InvalidManaCost(text.to_string())),
                    }
                }
            }
        }

        Ok(cost)
    }

    /// Generic-only cost.
    #[must_use]
    pub fn generic(amount: u32) -> Self {
        Self {
            generic: amount,
            ..Self::default()
        }
    }

    /// Require X to be at least `min`.
    #[must_use]
    pub fn with_min_x(mut self, min: u32) -> Self {
        self.min_x = min;
        self
    }

    /// Total mana value with X counted as zero.
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.colored
            .iter()
            .fold(self.generic.saturating_add(self.colorless), |total, n| total.saturating_add(*n))
    }

    #[must_use]
    pub fn has_x(&self) -> bool {
        self.x_count > 0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mana_value() == 0 && self.x_count == 0
    }

    /// Colors of the colored symbols.
    #[must_use]
    pub fn colors(&self) -> ColorSet {
        Color::ALL
            .iter()
            .filter(|c| self.colored[c.index()] > 0)
            .fold(ColorSet::empty(), |set, c| set | ColorSet::from(*c))
    }

    /// Add another cost's symbols to this one.
    ///
    /// Amounts saturate at `u32::MAX`; no pool can pay a saturated cost.
    pub fn add(&mut self, other: &ManaCost) {
        self.generic = self.generic.saturating_add(other.generic);
        for (mine, theirs) in self.colored.iter_mut().zip(other.colored.iter()) {
            *mine = mine.saturating_add(*theirs);
        }
        self.colorless = self.colorless.saturating_add(other.colorless);
        self.x_count = self.x_count.saturating_add(other.x_count);
        self.min_x = self.min_x.max(other.min_x);
    }

    /// This cost with every `{X}` replaced by `x` generic mana.
    #[must_use]
    pub fn with_x(&self, x: u32) -> ManaCost {
        ManaCost {
            generic: self.generic.saturating_add(x.saturating_mul(self.x_count)),
            x_count: 0,
            min_x: 0,
            ..self.clone()
        }
    }

    /// Values X may take when `available` mana is left to pay this cost.
    ///
    /// The upper bound is the largest X the rest of the cost leaves room
    /// for, never below `min_x`.
    #[must_use]
    pub fn x_range(&self, available: u32) -> (u32, u32) {
        let room = available.saturating_sub(self.mana_value());
        let max = room.checked_div(self.x_count).unwrap_or(self.min_x);
        (self.min_x, max.max(self.min_x))
    }
}

impl std::str::FromStr for ManaCost {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.x_count {
            f.write_str("{X}")?;
        }
        if self.generic > 0 || self.is_zero() {
            write!(f, "{{{}}}", self.generic)?;
        }
        for _ in 0..self.colorless {
            f.write_str("{C}")?;
        }
        for color in Color::ALL {
            for _ in 0..self.colored[color.index()] {
                write!(f, "{{{}}}", color.symbol())?;
            }
        }
        Ok(())
    }
}

/// Mana available to a player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    amounts: [u32; 6],
}

impl ManaPool {
    pub fn add(&mut self, mana: ManaType, amount: u32) {
        let slot = &mut self.amounts[mana.index()];
        *slot = slot.saturating_add(amount);
    }

    #[must_use]
    pub fn get(&self, mana: ManaType) -> u32 {
        self.amounts[mana.index()]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.amounts.iter().fold(0, |total, n| total.saturating_add(*n))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn empty(&mut self) {
        self.amounts = [0; 6];
    }

    /// Whether the pool covers `cost` (unannounced X counts as zero).
    #[must_use]
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        self.after_paying(cost).is_some()
    }

    /// Remove `cost` from the pool. The pool is unchanged on failure.
    pub fn pay(&mut self, cost: &ManaCost) -> bool {
        match self.after_paying(cost) {
            Some(amounts) => {
                self.amounts = amounts;
                true
            }
            None => false,
        }
    }

    fn after_paying(&self, cost: &ManaCost) -> Option<[u32; 6]> {
        let mut left = self.amounts;

        for color in Color::ALL {
            let slot = &mut left[ManaType::from(color).index()];
            *slot = slot.checked_sub(cost.colored[color.index()])?;
        }
        let colorless = &mut left[ManaType::Colorless.index()];
        *colorless = colorless.checked_sub(cost.colorless)?;

        let mut generic = cost.generic;
        for mana in [
            ManaType::Colorless,
            ManaType::White,
            ManaType::Blue,
            ManaType::Black,
            ManaType::Red,
            ManaType::Green,
        ] {
            let take = left[mana.index()].min(generic);
            left[mana.index()] -= take;
            generic -= take;
        }

        (generic == 0).then_some(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let cost = ManaCost::parse("{2}{G}{G}").unwrap();
        assert_eq!(cost.generic, 2);
        assert_eq!(cost.colored[Color::Green.index()], 2);
        assert_eq!(cost.mana_value(), 4);
        assert_eq!(cost.to_string(), "{2}{G}{G}");
        assert_eq!(cost.colors(), ColorSet::GREEN);
    }

    #[test]
    fn test_parse_x_and_colorless() {
        let cost = ManaCost::parse("{X}{C}{R}").unwrap();
        assert!(cost.has_x());
        assert_eq!(cost.colorless, 1);
        assert_eq!(cost.to_string(), "{X}{C}{R}");
        assert_eq!(cost.with_x(3).generic, 3);
        assert!(!cost.with_x(3).has_x());
    }

    #[test]
    fn test_parse_errors() {
        assert!(ManaCost::parse("2G").is_err());
        assert!(ManaCost::parse("{2").is_err());
        assert!(ManaCost::parse("{Q}").is_err());
        assert!(ManaCost::parse("").unwrap().is_zero());
        assert_eq!(ManaCost::parse("").unwrap().to_string(), "{0}");
    }

    #[test]
    fn test_add_costs() {
        let mut cost = ManaCost::parse("{1}{U}").unwrap();
        cost.add(&ManaCost::parse("{2}{G}").unwrap());
        assert_eq!(cost.to_string(), "{3}{U}{G}");
    }

    #[test]
    fn test_huge_x_saturates_instead_of_wrapping() {
        let cost = ManaCost::parse("{X}{X}{1}{G}").unwrap();
        let paid = cost.with_x(u32::MAX);
        assert_eq!(paid.generic, u32::MAX);
        assert_eq!(paid.mana_value(), u32::MAX);

        let mut total = ManaCost::parse("{2}{G}").unwrap();
        total.add(&paid);
        assert_eq!(total.generic, u32::MAX);

        let mut pool = ManaPool::default();
        pool.add(ManaType::Green, 5);
        assert!(!pool.can_pay(&total));
    }

    #[test]
    fn test_x_range() {
        let cost = ManaCost::parse("{X}{G}").unwrap();
        assert_eq!(cost.x_range(5), (0, 4));
        assert_eq!(cost.x_range(0), (0, 0));

        let double = ManaCost::parse("{X}{X}{R}").unwrap().with_min_x(1);
        assert_eq!(double.x_range(6), (1, 2));
        // Not enough for the minimum: the range collapses onto it.
        assert_eq!(double.x_range(2), (1, 1));
        assert_eq!(ManaCost::generic(2).x_range(9), (0, 0));
    }

    #[test]
    fn test_pool_pays_colored_first() {
        let mut pool = ManaPool::default();
        pool.add(ManaType::Green, 2);
        pool.add(ManaType::Colorless, 1);

        let cost = ManaCost::parse("{1}{G}").unwrap();
        assert!(pool.pay(&cost));
        assert_eq!(pool.get(ManaType::Green), 1);
        assert_eq!(pool.get(ManaType::Colorless), 0);
    }

    #[test]
    fn test_pool_failure_leaves_pool_untouched() {
        let mut pool = ManaPool::default();
        pool.add(ManaType::Red, 3);

        let cost = ManaCost::parse("{G}").unwrap();
        assert!(!pool.can_pay(&cost));
        assert!(!pool.pay(&cost));
        assert_eq!(pool.total(), 3);
    }

    #[test]
    fn test_pool_generic_from_any() {
        let mut pool = ManaPool::default();
        pool.add(ManaType::Red, 2);
        pool.add(ManaType::Blue, 1);

        assert!(pool.can_pay(&ManaCost::generic(3)));
        assert!(!pool.can_pay(&ManaCost::generic(4)));
    }
}
