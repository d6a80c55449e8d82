//! # Bounty Node
//!
//! Command-line host for the confidential bounty board.
//!
//! ## Modules
//!
//! - `commands/` - JSON-lines command and response types
//! - `runner/` - engine wiring, command processing, event logging

#![warn(missing_docs)]

pub mod commands;
pub mod runner;

pub use commands::{Command, CommandError, ErrorBody, Response, WireInput};
pub use runner::{spawn_event_logger, Node, RunSummary};
