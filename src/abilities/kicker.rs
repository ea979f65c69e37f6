//! Kicker and multikicker.
//!
//! A `KickerAbility` is a static ability of a spell. While the spell is being
//! cast it offers each of its optional additional costs to the caster, as
//! many times as the cost allows and the caster can afford. Accepted costs
//! are merged into the spell's costs.
//!
//! The kicked status belongs to one cast. The ability remembers the
//! zone-change counter of its source at the first activation; the status
//! survives the move from the stack to the battlefield (one zone change) and
//! is gone after any further move.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::spell::SpellAbility;
use crate::costs::{Cost, ManaCost, OptionalAdditionalCost};
use crate::core::{GameState, ObjectId};
use crate::decisions::{DecisionMaker, PlayerLeft};
use crate::effects::Outcome;
use crate::error::{EngineError, Result};
use crate::triggers::GameEvent;

const KICKER: &str = "Kicker";
const MULTIKICKER: &str = "Multikicker";
const REMINDER_MANA: &str = "(You may pay an additional {cost} as you cast this spell.)";
const REMINDER_COST: &str = "(You may {cost} in addition to any other costs as you cast this spell.)";
const REMINDER_MULTI: &str = "(You may pay an additional {cost} any number of times as you cast this spell.)";

/// Optional additional costs of a spell and their state for the current cast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickerAbility {
    keyword: String,
    reminder: String,
    costs: Vec<OptionalAdditionalCost>,
    x_value: u32,
    /// Zone-change counter of the source at first activation; 0 if none.
    zone_change_counter: u32,
}

impl KickerAbility {
    /// Keyword with no costs yet.
    pub fn keyword(keyword: impl Into<String>, reminder: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            reminder: reminder.into(),
            costs: Vec::new(),
            x_value: 0,
            zone_change_counter: 0,
        }
    }

    /// `Kicker {2}{G}`.
    pub fn new(mana: &str) -> Result<Self> {
        Self::keyword(KICKER, REMINDER_MANA).and_kicker(mana)
    }

    /// Kicker with an already built mana cost, e.g. one with a minimum X.
    #[must_use]
    pub fn with_mana(mana: ManaCost) -> Self {
        Self::keyword(KICKER, REMINDER_MANA).and_kicker_mana(mana)
    }

    /// Kicker with a non-mana cost, e.g. `Kicker-Pay 3 life`.
    #[must_use]
    pub fn with_cost(cost: Cost) -> Self {
        let mut kicker = Self::keyword(KICKER, REMINDER_COST);
        kicker.costs.push(OptionalAdditionalCost::new(KICKER, REMINDER_COST, vec![cost]).with_delimiter("-"));
        kicker
    }

    /// `Multikicker {2}`.
    pub fn multikicker(mana: &str) -> Result<Self> {
        let mut kicker = Self::keyword(MULTIKICKER, REMINDER_MULTI);
        kicker
            .costs
            .push(OptionalAdditionalCost::new(MULTIKICKER, REMINDER_MULTI, vec![Cost::mana(mana)?]).repeatable());
        Ok(kicker)
    }

    /// Add another mana kicker cost ("kicker A and/or B").
    pub fn and_kicker(self, mana: &str) -> Result<Self> {
        Ok(self.and_kicker_mana(ManaCost::parse(mana)?))
    }

    #[must_use]
    pub fn and_kicker_mana(mut self, mana: ManaCost) -> Self {
        self.costs.push(OptionalAdditionalCost::new(
            self.keyword.clone(),
            self.reminder.clone(),
            vec![Cost::Mana(mana)],
        ));
        self
    }

    #[must_use]
    pub fn costs(&self) -> &[OptionalAdditionalCost] {
        &self.costs
    }

    /// Value announced for a kicker `{X}`.
    #[must_use]
    pub fn x_value(&self) -> u32 {
        self.x_value
    }

    /// Forget everything paid for the previous cast.
    pub fn reset(&mut self) {
        for cost in &mut self.costs {
            cost.reset();
        }
        self.zone_change_counter = 0;
        self.x_value = 0;
    }

    /// Whether the source, now at `current_zcc`, is still the kicked instance.
    #[must_use]
    pub fn is_kicked(&self, current_zcc: Option<u32>) -> bool {
        current_zcc.is_some_and(|zcc| zcc <= self.zone_change_counter + 1)
            && self.costs.iter().any(OptionalAdditionalCost::is_activated)
    }

    /// Reset if the source moved on since it was kicked.
    pub fn refresh(&mut self, current_zcc: Option<u32>) {
        if !self.is_kicked(current_zcc) && self.costs.iter().any(OptionalAdditionalCost::is_activated) {
            debug!(recorded = self.zone_change_counter, ?current_zcc, "kicked status expired");
            self.reset();
        }
    }

    /// Total activations across all costs, or 0 if not kicked.
    #[must_use]
    pub fn kicked_count(&self, current_zcc: Option<u32>) -> u32 {
        if self.is_kicked(current_zcc) {
            self.costs.iter().map(OptionalAdditionalCost::activation_count).sum()
        } else {
            0
        }
    }

    /// Offer every optional cost to the caster and merge the accepted ones
    /// into `spell`.
    ///
    /// Called once while the spell is cast. A caster who leaves the game
    /// mid-way declines the rest.
    pub fn add_optional_additional_costs(
        &mut self,
        spell: &mut SpellAbility,
        state: &mut GameState,
        decider: &mut dyn DecisionMaker,
    ) -> Result<()> {
        self.reset();
        let player = spell.controller;

        for index in 0..self.costs.len() {
            let mut again = true;
            while again && state.is_in_game(player) {
                let cost = &self.costs[index];
                let times = if cost.is_repeatable() {
                    let count = cost.activation_count();
                    format!("{} {}", count + 1, if count == 0 { "time " } else { "times " })
                } else {
                    String::new()
                };

                if !Self::can_pay(cost, spell, state) {
                    break;
                }
                let prompt = format!("Pay {}{} ?", times, cost.text(false));
                let accepted = match decider.choose_use(Outcome::Benefit, &prompt, state) {
                    Ok(accepted) => accepted,
                    Err(PlayerLeft) => {
                        state.leave_game(player)?;
                        false
                    }
                };
                if !accepted {
                    break;
                }

                self.activate(index, state, spell.source)?;
                let cost = &self.costs[index];
                for part in cost.costs() {
                    match part {
                        Cost::Mana(mana) if mana.has_x() => {
                            let available = state
                                .player(player)
                                .map_or(0, |p| p.mana_pool.total())
                                .saturating_sub(spell.mana_to_pay.mana_value());
                            let (min, max) = mana.x_range(available);
                            let prompt = format!("Announce kicker value for {}", "{X}");
                            let x = match decider.announce_x_mana(min, max, &prompt, state, spell.source) {
                                Ok(x) => x.clamp(min, max),
                                Err(PlayerLeft) => {
                                    state.leave_game(player)?;
                                    min
                                }
                            };
                            self.x_value = x;
                            info!(%player, x, source = %spell.source, "announced kicker X");
                            if state.config.announce_values {
                                state.emit(GameEvent::value_announced(
                                    spell.source,
                                    player,
                                    i64::from(x),
                                    format!("{} announced a value of {} for kicker X", player, x),
                                ));
                            }
                            spell.mana_to_pay.add(&mana.with_x(x));
                        }
                        Cost::Mana(mana) => spell.mana_to_pay.add(mana),
                        other => spell.costs.push(other.clone()),
                    }
                }
                again = cost.is_repeatable();
            }
        }
        Ok(())
    }

    /// Rules text: first cost with keyword, further costs joined by
    /// " and/or ", reminder text only for a single cost.
    #[must_use]
    pub fn rule_text(&self) -> String {
        let mut text = String::new();
        for (i, cost) in self.costs.iter().enumerate() {
            if i == 0 {
                text.push_str(&cost.text(false));
            } else {
                text.push_str(" and/or ");
                text.push_str(&cost.text(true));
            }
        }
        if let [only] = self.costs.as_slice() {
            text.push(' ');
            text.push_str(&only.reminder_text());
        }
        text
    }

    /// Appended to "X casts Y" for the paid costs.
    #[must_use]
    pub fn cast_message_suffix(&self) -> String {
        self.costs
            .iter()
            .filter(|c| c.is_activated())
            .enumerate()
            .map(|(position, cost)| cost.cast_suffix(position))
            .collect()
    }

    fn activate(&mut self, index: usize, state: &GameState, source: ObjectId) -> Result<()> {
        self.costs[index].activate();
        if self.zone_change_counter == 0 {
            self.zone_change_counter = state
                .zone_change_counter(source)
                .ok_or(EngineError::KickerSourceMissing(source))?;
        }
        Ok(())
    }

    /// Affordable on top of what the spell already costs.
    fn can_pay(cost: &OptionalAdditionalCost, spell: &SpellAbility, state: &GameState) -> bool {
        let Some(player) = state.player(spell.controller) else {
            return false;
        };

        let mut mana: ManaCost = spell.mana_to_pay.clone();
        let mut life: u32 = spell
            .costs
            .iter()
            .filter_map(|c| match c {
                Cost::PayLife(n) => Some(*n),
                _ => None,
            })
            .sum();

        for part in cost.costs() {
            match part {
                Cost::Mana(m) => mana.add(&m.with_x(m.min_x)),
                Cost::PayLife(n) => life += n,
                other => {
                    if !other.can_pay(state, spell.source, spell.controller) {
                        return false;
                    }
                }
            }
        }
        player.mana_pool.can_pay(&mana) && player.life >= i64::from(life)
    }
}
