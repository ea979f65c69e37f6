//! Optional additional costs (kicker, multikicker).
//!
//! An `OptionalAdditionalCost` is one cost line of a keyword like kicker. It
//! counts how many times it was paid for the current cast.

use serde::{Deserialize, Serialize};

use super::Cost;

/// One optional additional cost with its activation count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalAdditionalCost {
    name: String,
    delimiter: String,
    reminder: String,
    costs: Vec<Cost>,
    repeatable: bool,
    activations: u32,
}

impl OptionalAdditionalCost {
    /// `reminder` may contain `{cost}`, replaced by the cost text.
    pub fn new(name: impl Into<String>, reminder: impl Into<String>, costs: Vec<Cost>) -> Self {
        Self {
            name: name.into(),
            delimiter: " ".to_string(),
            reminder: reminder.into(),
            costs,
            repeatable: false,
            activations: 0,
        }
    }

    /// Separator between keyword and cost text (`"Kicker-Pay 3 life"`).
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// May be paid any number of times.
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn costs(&self) -> &[Cost] {
        &self.costs
    }

    #[must_use]
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn activate(&mut self) {
        self.activations += 1;
    }

    pub fn reset(&mut self) {
        self.activations = 0;
    }

    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.activations > 0
    }

    #[must_use]
    pub fn activation_count(&self) -> u32 {
        self.activations
    }

    fn cost_text(&self) -> String {
        self.costs.iter().map(Cost::text).collect::<Vec<_>>().join(", ")
    }

    /// Rules text; `only_cost` drops the keyword.
    #[must_use]
    pub fn text(&self, only_cost: bool) -> String {
        if only_cost {
            self.cost_text()
        } else {
            format!("{}{}{}", self.name, self.delimiter, self.cost_text())
        }
    }

    #[must_use]
    pub fn reminder_text(&self) -> String {
        let cost = self.cost_text();
        let cost = if self.costs.iter().all(|c| c.as_mana().is_some()) {
            cost
        } else {
            cost.to_lowercase()
        };
        self.reminder.replace("{cost}", &cost)
    }

    /// Fragment appended to the cast announcement when this cost was paid.
    ///
    /// `position` is the index among the paid costs of the same keyword.
    #[must_use]
    pub fn cast_suffix(&self, position: usize) -> String {
        if !self.is_activated() {
            return String::new();
        }
        let mut suffix = String::new();
        if position > 0 {
            suffix.push_str(" and");
        }
        suffix.push_str(" with ");
        if self.repeatable {
            let plural = if self.activations > 1 { "times" } else { "time" };
            suffix.push_str(&format!("{} {} ", self.activations, plural));
        }
        suffix.push_str(&self.name);
        suffix
    }
}
