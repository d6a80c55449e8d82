//! Adapters layer for the bounty lifecycle.
//!
//! Concrete implementations of the outbound ports: clocks, a hash-binding
//! cryptographic collaborator, event sinks (shared bus, recording, no-op)
//! and file snapshots.

pub mod clock;
pub mod crypto;
pub mod event_sink;
pub mod snapshot;

pub use clock::{ManualClock, SystemTimeSource};
pub use crypto::HashBindingCompute;
pub use event_sink::{BusEventSink, NoOpSink, RecordingSink};
pub use snapshot::FileSnapshotStore;
