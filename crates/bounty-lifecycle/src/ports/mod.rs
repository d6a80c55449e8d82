//! Ports layer for the bounty lifecycle.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) port: the board API exposed to UIs and tools
//! - Outbound (Driven) ports: cryptography, event notification, time and
//!   snapshot persistence

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
