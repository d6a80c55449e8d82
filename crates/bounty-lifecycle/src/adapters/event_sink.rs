//! Event sink adapters.

use crate::events::BountyEvent;
use crate::ports::outbound::{EventSink, PublishError};
use parking_lot::Mutex;
use shared_bus::EventPublisher;
use std::sync::Arc;
use tracing::debug;

/// Publishes lifecycle events on the shared bus.
///
/// Having no subscribers is not an error; the event is simply dropped by
/// the bus.
pub struct BusEventSink {
    bus: Arc<dyn EventPublisher<BountyEvent>>,
}

impl BusEventSink {
    /// Sink publishing on `bus`.
    #[must_use]
    pub fn new(bus: Arc<dyn EventPublisher<BountyEvent>>) -> Self {
        Self { bus }
    }
}

impl EventSink for BusEventSink {
    fn emit(&self, event: &BountyEvent) -> Result<(), PublishError> {
        let receivers = self.bus.publish(event.clone());
        debug!(topic = event.topic_name(), receivers, "Lifecycle event published");
        Ok(())
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn emit(&self, _event: &BountyEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BountyEvent>>,
}

impl RecordingSink {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<BountyEvent> {
        self.events.lock().clone()
    }

    /// Remove and return every recorded event.
    pub fn take(&self) -> Vec<BountyEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &BountyEvent) -> Result<(), PublishError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Address;
    use shared_bus::{EventFilter, InMemoryEventBus};

    fn created(id: u64) -> BountyEvent {
        BountyEvent::BountyCreated {
            id,
            creator: Address::new([1; 20]),
            title: "Audit".into(),
        }
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.emit(&created(0)).unwrap();
        sink.emit(&created(1)).unwrap();
        assert_eq!(sink.events(), vec![created(0), created(1)]);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_bus_sink_publishes() {
        let bus = Arc::new(InMemoryEventBus::<BountyEvent>::new());
        let mut sub = bus.subscribe(EventFilter::topics([crate::events::topics::BOUNTY_CREATED]));
        let sink = BusEventSink::new(bus.clone());

        sink.emit(&created(7)).unwrap();

        assert_eq!(sub.recv().await, Some(created(7)));
        assert_eq!(bus.events_published(), 1);
    }

    #[test]
    fn test_bus_sink_without_subscribers() {
        let bus = Arc::new(InMemoryEventBus::<BountyEvent>::new());
        let sink = BusEventSink::new(bus);
        assert!(sink.emit(&created(0)).is_ok());
    }
}
