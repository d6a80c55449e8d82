//! # Lifecycle Events
//!
//! One event per committed transition, emitted after commit in commit
//! order. Encrypted fields appear only as handles.
//!
//! | Event | Emitted by |
//! |-------|-----------|
//! | `BountyCreated` | `create_bounty` |
//! | `ApplicationSubmitted` | `submit_application` |
//! | `ApplicationAccepted` | `accept_application` |
//! | `SubmissionSubmitted` | `submit_work` |
//! | `SubmissionVerified` | `verify_submission` |
//! | `BountyCompleted` | `verify_submission` (pass) |
//! | `ReputationUpdated` | `verify_submission` (pass), `update_reputation` |
//! | `BountyPaused` | `pause_bounty` |
//! | `ProfileCreated` / `ProfileUpdated` | `create_profile` / `update_profile` |
//! | `UserVerified` | `verify_user` |
//! | `VerifierChanged` | `set_verifier` |

use crate::domain::value_objects::{
    Address, ApplicationId, BountyId, Hash, ProfileId, SubmissionId,
};
use serde::{Deserialize, Serialize};
use shared_bus::BusEvent;

/// A committed lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BountyEvent {
    /// New bounty posted.
    BountyCreated {
        /// Bounty id.
        id: BountyId,
        /// Creator identity.
        creator: Address,
        /// Bounty title.
        title: String,
    },
    /// New application.
    ApplicationSubmitted {
        /// Application id.
        id: ApplicationId,
        /// Target bounty.
        bounty_id: BountyId,
        /// Applicant identity.
        applicant: Address,
    },
    /// Creator accepted an application.
    ApplicationAccepted {
        /// Application id.
        id: ApplicationId,
        /// Applicant identity.
        applicant: Address,
    },
    /// Work delivered.
    SubmissionSubmitted {
        /// Submission id.
        id: SubmissionId,
        /// Application the work is for.
        application_id: ApplicationId,
        /// Submitter identity.
        submitter: Address,
    },
    /// Verifier recorded a verdict.
    SubmissionVerified {
        /// Submission id.
        id: SubmissionId,
        /// Verdict.
        passed: bool,
    },
    /// Passing verdict closed the bounty.
    BountyCompleted {
        /// Bounty id.
        bounty_id: BountyId,
        /// Winning applicant.
        applicant: Address,
        /// Handle of the encrypted reward amount.
        reward_handle: Hash,
    },
    /// Encrypted reputation replaced.
    ReputationUpdated {
        /// Identity whose reputation changed.
        identity: Address,
        /// Handle of the new encrypted value.
        handle: Hash,
    },
    /// Bounty paused.
    BountyPaused {
        /// Bounty id.
        id: BountyId,
        /// Identity that paused it.
        by: Address,
    },
    /// Profile registered.
    ProfileCreated {
        /// Profile id.
        id: ProfileId,
        /// Owning identity.
        identity: Address,
    },
    /// Profile replaced by its owner.
    ProfileUpdated {
        /// Profile id.
        id: ProfileId,
        /// Owning identity.
        identity: Address,
    },
    /// Profile verification granted or revoked.
    UserVerified {
        /// Profile identity.
        identity: Address,
        /// New verification flag.
        verified: bool,
        /// Owner or verifier that changed it.
        by: Address,
    },
    /// Verifier role reassigned.
    VerifierChanged {
        /// Previous verifier.
        previous: Address,
        /// New verifier.
        current: Address,
    },
}

impl BountyEvent {
    /// Bus topic for this event.
    #[must_use]
    pub const fn topic_name(&self) -> &'static str {
        match self {
            Self::BountyCreated { .. } => topics::BOUNTY_CREATED,
            Self::ApplicationSubmitted { .. } => topics::APPLICATION_SUBMITTED,
            Self::ApplicationAccepted { .. } => topics::APPLICATION_ACCEPTED,
            Self::SubmissionSubmitted { .. } => topics::SUBMISSION_SUBMITTED,
            Self::SubmissionVerified { .. } => topics::SUBMISSION_VERIFIED,
            Self::BountyCompleted { .. } => topics::BOUNTY_COMPLETED,
            Self::ReputationUpdated { .. } => topics::REPUTATION_UPDATED,
            Self::BountyPaused { .. } => topics::BOUNTY_PAUSED,
            Self::ProfileCreated { .. } => topics::PROFILE_CREATED,
            Self::ProfileUpdated { .. } => topics::PROFILE_UPDATED,
            Self::UserVerified { .. } => topics::USER_VERIFIED,
            Self::VerifierChanged { .. } => topics::VERIFIER_CHANGED,
        }
    }
}

impl BusEvent for BountyEvent {
    fn topic(&self) -> &'static str {
        self.topic_name()
    }

    fn source(&self) -> &'static str {
        crate::SUBSYSTEM_NAME
    }
}

// =============================================================================
// EVENT BUS TOPICS
// =============================================================================

/// Event topics for the bounty lifecycle.
///
/// Subscribe to `"bounty.*"`-style prefixes with [`shared_bus::EventFilter`].
pub mod topics {
    /// Bounty posted.
    pub const BOUNTY_CREATED: &str = "bounty.created";

    /// Bounty paused.
    pub const BOUNTY_PAUSED: &str = "bounty.paused";

    /// Bounty completed.
    pub const BOUNTY_COMPLETED: &str = "bounty.completed";

    /// Application submitted.
    pub const APPLICATION_SUBMITTED: &str = "application.submitted";

    /// Application accepted.
    pub const APPLICATION_ACCEPTED: &str = "application.accepted";

    /// Work submitted.
    pub const SUBMISSION_SUBMITTED: &str = "submission.submitted";

    /// Verdict recorded.
    pub const SUBMISSION_VERIFIED: &str = "submission.verified";

    /// Reputation replaced.
    pub const REPUTATION_UPDATED: &str = "reputation.updated";

    /// Profile registered.
    pub const PROFILE_CREATED: &str = "profile.created";

    /// Profile replaced.
    pub const PROFILE_UPDATED: &str = "profile.updated";

    /// Profile vouched for.
    pub const USER_VERIFIED: &str = "profile.verified";

    /// Verifier reassigned.
    pub const VERIFIER_CHANGED: &str = "roles.verifier_changed";
}
