//! Player decisions.
//!
//! The engine asks players questions through the [`DecisionMaker`] trait:
//! whether to pay an optional cost, what value to announce for X, which
//! target to pick, in which order to put simultaneous triggers on the stack.
//! Every call is synchronous and returns a definite answer or
//! `Err(PlayerLeft)` when the player is gone. The engine then treats the
//! player as having left the game and takes the declining answer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::{GameState, ObjectId};
use crate::effects::{Outcome, Target, TargetSpec};
use crate::triggers::PendingTrigger;

/// The player is no longer able to answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("player left the game")]
pub struct PlayerLeft;

/// Answer of a decision call.
pub type Decision<T> = std::result::Result<T, PlayerLeft>;

/// Something that can make a player's decisions.
///
/// Default implementations give the minimal answer: decline, minimum value,
/// first legal target, keep the given order.
pub trait DecisionMaker {
    /// Yes/no question, e.g. "Pay {2}{G} ?".
    fn choose_use(&mut self, _outcome: Outcome, _prompt: &str, _state: &GameState) -> Decision<bool> {
        Ok(false)
    }

    /// Announce a value for X in `min..=max`. The engine clamps answers
    /// outside the range.
    fn announce_x_mana(
        &mut self,
        min: u32,
        _max: u32,
        _prompt: &str,
        _state: &GameState,
        _source: ObjectId,
    ) -> Decision<u32> {
        Ok(min)
    }

    /// Pick one target among the legal candidates. `None` declines.
    fn choose_target(
        &mut self,
        _spec: &TargetSpec,
        candidates: &[Target],
        _state: &GameState,
    ) -> Decision<Option<Target>> {
        Ok(candidates.first().copied())
    }

    /// Pick one object among `candidates`, e.g. a permanent to sacrifice.
    /// `None` is treated as the first candidate where a choice is mandatory.
    fn choose_object(
        &mut self,
        _prompt: &str,
        candidates: &[ObjectId],
        _state: &GameState,
    ) -> Decision<Option<ObjectId>> {
        Ok(candidates.first().copied())
    }

    /// Order simultaneous triggers controlled by the same player.
    ///
    /// Returns indices into `triggers`; the first is put on the stack first.
    fn order_triggers(&mut self, triggers: &[PendingTrigger], _state: &GameState) -> Decision<Vec<usize>> {
        Ok((0..triggers.len()).collect())
    }
}

/// Declines everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclineAll;

impl DecisionMaker for DeclineAll {}

/// Shared log of the prompts a scripted player was asked.
pub type PromptLog = Rc<RefCell<Vec<String>>>;

/// Answers from queues, for tests and replays.
///
/// An exhausted queue falls back to the declining answer. Every yes/no, X
/// and object prompt is recorded in the shared [`PromptLog`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedDecisions {
    uses: VecDeque<bool>,
    x_values: VecDeque<u32>,
    targets: VecDeque<usize>,
    picks: VecDeque<usize>,
    orders: VecDeque<Vec<usize>>,
    /// Answer this many more calls, then leave the game.
    leave_after: Option<usize>,
    prompts: PromptLog,
}

impl ScriptedDecisions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue yes/no answers.
    #[must_use]
    pub fn answer(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.uses.extend(answers);
        self
    }

    /// Queue X announcements. They are replayed as given, even outside the
    /// offered range.
    #[must_use]
    pub fn announce(mut self, value: u32) -> Self {
        self.x_values.push_back(value);
        self
    }

    /// Queue a target choice by candidate index.
    #[must_use]
    pub fn target(mut self, index: usize) -> Self {
        self.targets.push_back(index);
        self
    }

    /// Queue an object choice by candidate index.
    #[must_use]
    pub fn pick(mut self, index: usize) -> Self {
        self.picks.push_back(index);
        self
    }

    /// Queue a trigger order.
    #[must_use]
    pub fn order(mut self, order: Vec<usize>) -> Self {
        self.orders.push_back(order);
        self
    }

    /// Leave the game after answering `calls` more decisions.
    #[must_use]
    pub fn leave_after(mut self, calls: usize) -> Self {
        self.leave_after = Some(calls);
        self
    }

    /// Handle on the prompt log; stays valid after the decider is boxed.
    #[must_use]
    pub fn prompts(&self) -> PromptLog {
        Rc::clone(&self.prompts)
    }

    fn tick(&mut self) -> Decision<()> {
        match self.leave_after.as_mut() {
            Some(0) => Err(PlayerLeft),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl DecisionMaker for ScriptedDecisions {
    fn choose_use(&mut self, _outcome: Outcome, prompt: &str, _state: &GameState) -> Decision<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.tick()?;
        Ok(self.uses.pop_front().unwrap_or(false))
    }

    fn announce_x_mana(
        &mut self,
        min: u32,
        _max: u32,
        prompt: &str,
        _state: &GameState,
        _source: ObjectId,
    ) -> Decision<u32> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.tick()?;
        Ok(self.x_values.pop_front().unwrap_or(min))
    }

    fn choose_target(
        &mut self,
        _spec: &TargetSpec,
        candidates: &[Target],
        _state: &GameState,
    ) -> Decision<Option<Target>> {
        self.tick()?;
        let index = self.targets.pop_front().unwrap_or(0);
        Ok(candidates.get(index).copied())
    }

    fn choose_object(
        &mut self,
        prompt: &str,
        candidates: &[ObjectId],
        _state: &GameState,
    ) -> Decision<Option<ObjectId>> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.tick()?;
        let index = self.picks.pop_front().unwrap_or(0);
        Ok(candidates.get(index).copied())
    }

    fn order_triggers(&mut self, triggers: &[PendingTrigger], _state: &GameState) -> Decision<Vec<usize>> {
        self.tick()?;
        Ok(self
            .orders
            .pop_front()
            .unwrap_or_else(|| (0..triggers.len()).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, PlayerId};

    #[test]
    fn test_decline_all() {
        let state = GameState::new(&GameConfig::default());
        let mut decider = DeclineAll;
        assert_eq!(decider.choose_use(Outcome::Benefit, "Pay {2} ?", &state), Ok(false));
        assert_eq!(decider.announce_x_mana(1, 10, "X", &state, ObjectId(1)), Ok(1));
        let candidates = [Target::Player(PlayerId(1))];
        assert_eq!(
            decider.choose_target(&TargetSpec::player(), &candidates, &state),
            Ok(Some(Target::Player(PlayerId(1))))
        );
    }

    #[test]
    fn test_scripted_answers_and_log() {
        let state = GameState::new(&GameConfig::default());
        let mut decider = ScriptedDecisions::new().answer([true, false]).announce(3);
        let log = decider.prompts();

        assert_eq!(decider.choose_use(Outcome::Benefit, "first", &state), Ok(true));
        assert_eq!(decider.choose_use(Outcome::Benefit, "second", &state), Ok(false));
        assert_eq!(decider.choose_use(Outcome::Benefit, "third", &state), Ok(false));
        assert_eq!(decider.announce_x_mana(0, u32::MAX, "X?", &state, ObjectId(1)), Ok(3));

        assert_eq!(*log.borrow(), vec!["first", "second", "third", "X?"]);
    }

    #[test]
    fn test_scripted_object_picks() {
        let state = GameState::new(&GameConfig::default());
        let mut decider = ScriptedDecisions::new().pick(1);
        let log = decider.prompts();
        let candidates = [ObjectId(4), ObjectId(7)];

        assert_eq!(decider.choose_object("Sacrifice", &candidates, &state), Ok(Some(ObjectId(7))));
        assert_eq!(decider.choose_object("Sacrifice", &candidates, &state), Ok(Some(ObjectId(4))));
        assert_eq!(DeclineAll.choose_object("Search", &candidates, &state), Ok(Some(ObjectId(4))));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_leave_after() {
        let state = GameState::new(&GameConfig::default());
        let mut decider = ScriptedDecisions::new().answer([true, true]).leave_after(1);
        assert_eq!(decider.choose_use(Outcome::Benefit, "a", &state), Ok(true));
        assert_eq!(decider.choose_use(Outcome::Benefit, "b", &state), Err(PlayerLeft));
        assert_eq!(decider.announce_x_mana(0, 5, "c", &state, ObjectId(1)), Err(PlayerLeft));
    }
}
