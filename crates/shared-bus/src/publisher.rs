//! # Publishing
//!
//! The sending half of the bus plus the concrete in-memory bus.

use crate::events::{BusEvent, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Live subscription counts, keyed by [`filter_key`].
pub(crate) type SubscriptionRegistry = Arc<RwLock<HashMap<String, usize>>>;

/// Anything events can be pushed into.
///
/// `publish` never blocks. A subscriber that falls more than the channel
/// capacity behind loses its oldest events instead.
pub trait EventPublisher<E: BusEvent>: Send + Sync {
    /// Push `event` to every current subscriber and return how many there were.
    fn publish(&self, event: E) -> usize;

    /// Events pushed since construction, delivered or not.
    fn events_published(&self) -> u64;
}

/// Broadcast bus living in this process.
///
/// Backed by `tokio::sync::broadcast`, so each subscriber sees every event
/// in publish order.
pub struct InMemoryEventBus<E: BusEvent> {
    sender: broadcast::Sender<E>,
    registry: SubscriptionRegistry,
    published: AtomicU64,
    capacity: usize,
}

pub(crate) fn filter_key(filter: &EventFilter) -> String {
    format!("{:?}/{:?}", filter.topics, filter.sources)
}

impl<E: BusEvent> InMemoryEventBus<E> {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per subscriber (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            sender: broadcast::channel(capacity).0,
            registry: SubscriptionRegistry::default(),
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Start receiving events that pass `filter`.
    ///
    /// Only events published after this call are seen.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription<E> {
        let key = filter_key(&filter);
        {
            let mut registry = self.registry.write();
            *registry.entry(key.clone()).or_default() += 1;
        }
        debug!(topics = ?filter.topics, sources = ?filter.sources, "Subscribed");
        Subscription::new(
            self.sender.subscribe(),
            filter,
            Arc::clone(&self.registry),
            key,
        )
    }

    /// Like [`subscribe`](Self::subscribe), wrapped as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream<E> {
        EventStream::new(self.subscribe(filter))
    }

    /// Receivers currently attached, whatever their filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Live subscriptions created with exactly `filter`.
    #[must_use]
    pub fn subscriptions_for(&self, filter: &EventFilter) -> usize {
        self.registry
            .read()
            .get(&filter_key(filter))
            .copied()
            .unwrap_or_default()
    }

    /// Per-subscriber buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<E: BusEvent> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> EventPublisher<E> for InMemoryEventBus<E> {
    fn publish(&self, event: E) -> usize {
        let (topic, source) = (event.topic(), event.source());
        self.published.fetch_add(1, Ordering::Relaxed);

        // send only fails when nobody is listening.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(topic, source, receivers, "Published");
        receivers
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl<E: BusEvent, P: EventPublisher<E> + ?Sized> EventPublisher<E> for Arc<P> {
    fn publish(&self, event: E) -> usize {
        P::publish(self, event)
    }

    fn events_published(&self) -> u64 {
        P::events_published(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::tests::TestEvent;

    #[test]
    fn test_publish_without_listeners_still_counts() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.publish(TestEvent::Created(1)), 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[test]
    fn test_publish_reaches_subscriber() {
        let bus = InMemoryEventBus::new();
        let _sub = bus.subscribe(EventFilter::all());

        assert_eq!(bus.publish(TestEvent::Created(1)), 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_every_receiver_counted_regardless_of_filter() {
        let bus = InMemoryEventBus::new();
        let _everything = bus.subscribe(EventFilter::all());
        let _also_everything = bus.subscribe(EventFilter::all());
        let _scores = bus.subscribe(EventFilter::topics(["score.updated"]));

        assert_eq!(bus.publish(TestEvent::Created(1)), 3);
        assert_eq!(bus.subscriptions_for(&EventFilter::all()), 2);
        assert_eq!(
            bus.subscriptions_for(&EventFilter::topics(["score.updated"])),
            1
        );
    }

    #[test]
    fn test_capacity_floor() {
        assert_eq!(InMemoryEventBus::<TestEvent>::with_capacity(100).capacity(), 100);
        assert_eq!(InMemoryEventBus::<TestEvent>::with_capacity(0).capacity(), 1);
        assert_eq!(
            InMemoryEventBus::<TestEvent>::default().capacity(),
            DEFAULT_CHANNEL_CAPACITY
        );
    }

    #[test]
    fn test_publish_through_trait_object() {
        let bus = Arc::new(InMemoryEventBus::new());
        let publisher: Arc<dyn EventPublisher<TestEvent>> = bus.clone();
        publisher.publish(TestEvent::Paused(3));
        assert_eq!(bus.events_published(), 1);
    }
}
