//! Event bus.
//!
//! Observers subscribe either to every event or to a single event type.
//! Delivery is synchronous and in publication order; within one event,
//! subscribers run in subscription order.

use std::fmt;

use super::event::{EventType, GameEvent};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

struct Subscription {
    id: SubscriptionId,
    topic: Option<EventType>,
    handler: Box<dyn FnMut(&GameEvent)>,
}

/// Synchronous publish/subscribe for game events.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u32,
    published: usize,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus({} subscribers, {} published)", self.subscriptions.len(), self.published)
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event.
    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.add(None, Box::new(handler))
    }

    /// Receive events of one type only.
    pub fn subscribe_to(&mut self, topic: EventType, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.add(Some(topic), Box::new(handler))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver an event to every interested subscriber.
    pub fn publish(&mut self, event: &GameEvent) {
        self.published += 1;
        tracing::debug!(%event, "published event");
        for subscription in &mut self.subscriptions {
            if subscription.topic.is_none_or(|t| t == event.event_type) {
                (subscription.handler)(event);
            }
        }
    }

    /// Number of events published so far.
    #[must_use]
    pub fn published(&self) -> usize {
        self.published
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn add(&mut self, topic: Option<EventType>, handler: Box<dyn FnMut(&GameEvent)>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, topic, handler });
        id
    }
}
