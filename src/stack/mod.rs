//! The stack.
//!
//! Spells and abilities queue on a LIFO stack. Players pass priority in seat
//! order; when all remaining players pass in succession the top entry
//! resolves. Resolution itself is driven by [`Game`](crate::game::Game),
//! which owns the decision makers the resolving ability may need.

mod priority;

pub use priority::{Stack, StackItem, StackObject};
