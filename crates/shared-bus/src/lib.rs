//! # Shared Bus
//!
//! In-process broadcast of committed state changes. Producers publish,
//! observers (loggers, indexers, notifiers) subscribe with a topic filter,
//! and neither side holds a reference to the other.
//!
//! ```text
//!   producer ──publish()──▶ ┌───────────┐ ──▶ subscription (filter A)
//!                           │ event bus │ ──▶ subscription (filter B)
//!                           └───────────┘ ──▶ event stream (filter C)
//! ```
//!
//! The bus is generic over any [`BusEvent`]. Filtering happens on the
//! receiving side, so every subscriber sees its events in publish order.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{BusEvent, EventFilter, ALL_TOPICS};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Events buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
