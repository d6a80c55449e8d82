//! # Bounty Lifecycle - Confidential Bounty Board Engine
//!
//! Bounties with encrypted rewards, applications with encrypted experience
//! and time estimates, work submissions with encrypted quality scores,
//! verifier judgement and encrypted reputation. Plaintext values never
//! enter this crate; every encrypted field is an opaque ciphertext whose
//! proof is checked by a [`ports::ConfidentialCompute`] collaborator.
//!
//! ## Lifecycle
//!
//! ```text
//! Bounty:       Active ──pause──► Paused
//!                  └──── pass ───► Completed
//! Application:  Submitted ─accept─► Accepted ─work─► WorkSubmitted ─pass─► Completed
//! Submission:   Pending ─verdict─► VerifiedPass | VerifiedFail
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Ids are sequential from 0, never reused | `domain/store.rs` - `Table::insert_with()` |
//! | Deadline strictly after creation | `domain/invariants.rs` - `check_deadline()` |
//! | Completed bounty is inactive with a winner | `domain/invariants.rs` - `check_bounty_invariant()` |
//! | Verdict written once | `service/lifecycle.rs` - `verify_submission_impl()` |
//! | Failed operations change nothing | `service/mod.rs` - `BountyBoardService::execute()` |
//! | One profile per identity | `service/lifecycle.rs` - `create_profile_impl()` |
//!
//! ## Authorization
//!
//! | Operation | Caller |
//! |-----------|--------|
//! | `create_bounty`, `submit_application`, profiles | Anyone |
//! | `accept_application` | Bounty creator |
//! | `submit_work` | Applicant |
//! | `verify_submission`, `update_reputation` | Verifier |
//! | `pause_bounty` | Owner or creator |
//! | `verify_user` | Owner or verifier |
//! | `set_verifier` | Owner |
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose | Adapters |
//! |------|---------|----------|
//! | `ConfidentialCompute` | Proof checks, reputation accrual | `HashBindingCompute` |
//! | `EventSink` | Post-commit notifications | `BusEventSink`, `RecordingSink`, `NoOpSink` |
//! | `TimeSource` | Timestamps | `SystemTimeSource`, `ManualClock` |
//! | `SnapshotStore` | Persistence | `FileSnapshotStore` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use bounty_lifecycle::prelude::*;
//!
//! let board = BountyBoardService::new(config, compute, sink, clock)?;
//! let bounty = board.create_bounty(creator, new_bounty)?;
//! let app = board.submit_application(applicant, application)?;
//! board.accept_application(creator, app)?;
//! let sub = board.submit_work(applicant, work)?;
//! let outcome = board.verify_submission(verifier, sub, true, None)?;
//! assert_eq!(outcome.completed_bounty, Some(bounty));
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Application, ApplicationStatus, Bounty, BountyStatus, NewApplication, NewBounty,
        NewSubmission, ProfileInput, ReputationRecord, ReputationSource, Submission,
        SubmissionStatus, UserProfile,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        keccak256, Address, ApplicationId, BountyId, Category, Difficulty, DifficultyBand,
        EncryptedInput, EncryptedValue, Hash, ProfileId, Proof, SubmissionId, Timestamp,
    };

    // Access & invariants
    pub use crate::domain::access::{authorize, Operation, Roles};
    pub use crate::domain::invariants::{limits, PayloadLimits};

    // Ports
    pub use crate::ports::inbound::{
        ApplicationInfo, BountyBoardApi, BountyFilter, BountyInfo, ProfileInfo, ReputationInfo,
        SubmissionInfo, VerificationOutcome,
    };
    pub use crate::ports::outbound::{
        ConfidentialCompute, CryptoError, EventSink, PublishError, SnapshotStore, TimeSource,
    };

    // Events
    pub use crate::events::{topics, BountyEvent};

    // Errors & config
    pub use crate::config::{ApplicationPolicy, ConfigError, EngineConfig};
    pub use crate::errors::{BountyError, ErrorKind, SnapshotError};

    // Adapters
    pub use crate::adapters::{
        BusEventSink, FileSnapshotStore, HashBindingCompute, ManualClock, NoOpSink,
        RecordingSink, SystemTimeSource,
    };

    // Service
    pub use crate::service::{BoardSnapshot, BountyBoardService, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Event source name on the shared bus.
pub const SUBSYSTEM_NAME: &str = "bounty-lifecycle";

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports() {
        use prelude::*;
        let _ = PayloadLimits::default();
        let _ = Address::ZERO;
        assert_eq!(Category::ALL.len(), 8);
    }

    #[test]
    fn test_version_present() {
        assert!(!VERSION.is_empty());
    }
}
