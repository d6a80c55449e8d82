//! # Error Types
//!
//! All error types for the bounty lifecycle.

use crate::domain::value_objects::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ERROR KIND
// =============================================================================

/// Coarse classification of a lifecycle failure.
///
/// Callers that only need to branch on the class of failure (UI messages,
/// metric labels) match on this instead of the precise [`BountyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required text or payload field was empty.
    EmptyField,
    /// A field was present but out of range or too long.
    InvalidField,
    /// A deadline was not strictly in the future.
    DeadlineInPast,
    /// The referenced record does not exist.
    NotFound,
    /// The caller lacks the role required for the operation.
    Unauthorized,
    /// The target record is not in a state that allows the transition.
    InvalidState,
    /// The target record was already finalized.
    AlreadyFinalized,
    /// An encrypted input or its proof was rejected.
    ProofInvalid,
    /// The cryptographic collaborator failed.
    Crypto,
}

impl ErrorKind {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyField => "empty_field",
            Self::InvalidField => "invalid_field",
            Self::DeadlineInPast => "deadline_in_past",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::InvalidState => "invalid_state",
            Self::AlreadyFinalized => "already_finalized",
            Self::ProofInvalid => "proof_invalid",
            Self::Crypto => "crypto",
        }
    }
}

// =============================================================================
// BOUNTY ERRORS
// =============================================================================

/// Errors returned by lifecycle operations.
///
/// Every error is terminal for the attempted operation and leaves the
/// store untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BountyError {
    /// A required field was empty.
    #[error("{field} cannot be empty")]
    EmptyField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// A field failed range or length validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Deadline not strictly after the current time.
    #[error("Deadline must be in the future (deadline {deadline}, now {now})")]
    DeadlineInPast {
        /// Requested deadline.
        deadline: Timestamp,
        /// Time of the attempt.
        now: Timestamp,
    },

    /// Bounty does not exist.
    #[error("bounty {0} not found")]
    BountyNotFound(u64),

    /// Application does not exist.
    #[error("application {0} not found")]
    ApplicationNotFound(u64),

    /// Submission does not exist.
    #[error("submission {0} not found")]
    SubmissionNotFound(u64),

    /// No profile registered for the identity.
    #[error("profile not found for {0}")]
    ProfileNotFound(Address),

    /// No profile stored under the id.
    #[error("profile {0} not found")]
    ProfileIdNotFound(u64),

    /// Caller lacks the required role.
    #[error("{caller} is not authorized to {operation}")]
    Unauthorized {
        /// Identity that attempted the operation.
        caller: Address,
        /// Operation label.
        operation: &'static str,
    },

    /// Bounty is paused or completed.
    #[error("bounty {0} is not active")]
    BountyInactive(u64),

    /// Bounty deadline has passed.
    #[error("bounty {id} expired at {deadline}")]
    BountyExpired {
        /// Bounty id.
        id: u64,
        /// Deadline that has passed.
        deadline: Timestamp,
    },

    /// Applicant already applied and duplicates are disabled.
    #[error("{applicant} already applied to bounty {bounty_id}")]
    DuplicateApplication {
        /// Bounty id.
        bounty_id: u64,
        /// Applicant identity.
        applicant: Address,
    },

    /// Transition not allowed from the record's current state.
    #[error("{entity} {id}: {reason}")]
    InvalidState {
        /// Entity kind.
        entity: &'static str,
        /// Entity id.
        id: u64,
        /// Why the transition is not allowed.
        reason: &'static str,
    },

    /// Submission already carries a verdict.
    #[error("submission {0} already verified")]
    SubmissionAlreadyVerified(u64),

    /// A profile already exists for the identity.
    #[error("Profile already exists")]
    ProfileAlreadyExists(Address),

    /// Encrypted input or proof failed validation.
    #[error("invalid proof: {reason}")]
    ProofInvalid {
        /// What the check rejected.
        reason: String,
    },

    /// Cryptographic collaborator failure.
    #[error("confidential compute failed: {0}")]
    Crypto(String),
}

impl BountyError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyField { .. } => ErrorKind::EmptyField,
            Self::InvalidField { .. } => ErrorKind::InvalidField,
            Self::DeadlineInPast { .. } => ErrorKind::DeadlineInPast,
            Self::BountyNotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::SubmissionNotFound(_)
            | Self::ProfileNotFound(_)
            | Self::ProfileIdNotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::BountyInactive(_)
            | Self::BountyExpired { .. }
            | Self::DuplicateApplication { .. }
            | Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::SubmissionAlreadyVerified(_) | Self::ProfileAlreadyExists(_) => {
                ErrorKind::AlreadyFinalized
            }
            Self::ProofInvalid { .. } => ErrorKind::ProofInvalid,
            Self::Crypto(_) => ErrorKind::Crypto,
        }
    }

    /// Shorthand for [`BountyError::ProofInvalid`].
    #[must_use]
    pub fn proof(reason: impl Into<String>) -> Self {
        Self::ProofInvalid {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`BountyError::InvalidField`].
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Entity kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Bounty records.
    Bounty,
    /// Application records.
    Application,
    /// Submission records.
    Submission,
    /// User profiles.
    Profile,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bounty => "bounty",
            Self::Application => "application",
            Self::Submission => "submission",
            Self::Profile => "profile",
        })
    }
}

/// Errors from the entity store.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Table that was searched.
        kind: EntityKind,
        /// Missing id.
        id: u64,
    },
}

impl From<StoreError> for BountyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => match kind {
                EntityKind::Bounty => Self::BountyNotFound(id),
                EntityKind::Application => Self::ApplicationNotFound(id),
                EntityKind::Submission => Self::SubmissionNotFound(id),
                EntityKind::Profile => Self::ProfileIdNotFound(id),
            },
        }
    }
}

// =============================================================================
// SNAPSHOT ERRORS
// =============================================================================

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header did not match.
    #[error("not a bounty board snapshot (bad magic)")]
    BadMagic,

    /// Snapshot written by an unsupported format version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version read from the file.
        found: u8,
        /// Version this build writes.
        expected: u8,
    },

    /// Payload could not be encoded or decoded.
    #[error("snapshot codec error: {0}")]
    Codec(String),

    /// Decoded snapshot violates a store invariant.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(BountyError::BountyNotFound(3).kind(), ErrorKind::NotFound);
        assert_eq!(
            BountyError::SubmissionAlreadyVerified(0).kind(),
            ErrorKind::AlreadyFinalized
        );
        assert_eq!(
            BountyError::BountyExpired { id: 1, deadline: 5 }.kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(BountyError::proof("empty").kind(), ErrorKind::ProofInvalid);
    }

    #[test]
    fn test_profile_exists_message() {
        let err = BountyError::ProfileAlreadyExists(Address::ZERO);
        assert_eq!(err.to_string(), "Profile already exists");
        assert_eq!(err.kind(), ErrorKind::AlreadyFinalized);
    }

    #[test]
    fn test_empty_field_message() {
        let err = BountyError::EmptyField { field: "Bounty title" };
        assert_eq!(err.to_string(), "Bounty title cannot be empty");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: BountyError = StoreError::NotFound {
            kind: EntityKind::Application,
            id: 9,
        }
        .into();
        assert_eq!(err, BountyError::ApplicationNotFound(9));
    }

    #[test]
    fn test_missing_profile_id_is_not_found() {
        let err: BountyError = StoreError::NotFound {
            kind: EntityKind::Profile,
            id: 4,
        }
        .into();
        assert_eq!(err, BountyError::ProfileIdNotFound(4));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
