//! # Subscribing
//!
//! Receiving handles for the bus. Each handle applies its own filter and
//! unregisters itself on drop.

use crate::events::{BusEvent, EventFilter};
use crate::publisher::SubscriptionRegistry;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Failure reading from a subscription.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every sender is gone and the buffer is empty.
    #[error("event bus closed")]
    Closed,
}

/// Receiving handle returned by `InMemoryEventBus::subscribe`.
pub struct Subscription<E: BusEvent> {
    receiver: Receiver<E>,
    filter: EventFilter,
    registry: SubscriptionRegistry,
    key: String,
    lagged: u64,
}

impl<E: BusEvent> Subscription<E> {
    pub(crate) fn new(
        receiver: Receiver<E>,
        filter: EventFilter,
        registry: SubscriptionRegistry,
        key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            registry,
            key,
            lagged: 0,
        }
    }

    fn note_lag(&mut self, missed: u64) {
        self.lagged += missed;
        warn!(missed, total = self.lagged, "Subscriber fell behind; events dropped");
    }

    /// Wait for the next event passing the filter.
    ///
    /// Resolves to `None` once the bus is dropped and drained.
    pub async fn recv(&mut self) -> Option<E> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => self.note_lag(missed),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered event passing the filter, without waiting.
    ///
    /// # Errors
    ///
    /// `SubscriptionError::Closed` once the bus is dropped and drained.
    pub fn try_recv(&mut self) -> Result<Option<E>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(missed)) => self.note_lag(missed),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Everything currently buffered that passes the filter, oldest first.
    pub fn drain(&mut self) -> Vec<E> {
        std::iter::from_fn(|| self.try_recv().ok().flatten()).collect()
    }

    /// Events skipped so far because this handle fell behind.
    #[must_use]
    pub fn lagged(&self) -> u64 {
        self.lagged
    }

    /// The filter this handle was created with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl<E: BusEvent> Drop for Subscription<E> {
    fn drop(&mut self) {
        let mut registry = self.registry.write();
        let remaining = registry.get_mut(&self.key).map(|count| {
            *count = count.saturating_sub(1);
            *count
        });
        if remaining == Some(0) {
            registry.remove(&self.key);
        }
        debug!(key = %self.key, "Unsubscribed");
    }
}

/// [`Subscription`] as a `tokio_stream::Stream`.
pub struct EventStream<E: BusEvent> {
    inner: Subscription<E>,
}

impl<E: BusEvent> EventStream<E> {
    /// Wrap an existing subscription.
    #[must_use]
    pub fn new(inner: Subscription<E>) -> Self {
        Self { inner }
    }

    /// The filter of the wrapped subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.inner.filter()
    }
}

impl<E: BusEvent> Stream for EventStream<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        match self.inner.try_recv() {
            Ok(Some(event)) => Poll::Ready(Some(event)),
            Err(SubscriptionError::Closed) => Poll::Ready(None),
            Ok(None) => {
                // broadcast has no poll API; re-schedule and check again.
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
}
