//! Outbound (Driven) ports for the bounty lifecycle.
//!
//! These traits define what the engine needs from the outside world. None
//! of them are consulted while a transition is half-applied: every call
//! happens either before the commit (validation, reputation accrual) or
//! after it (event emission).

use crate::domain::entities::ReputationRecord;
use crate::domain::value_objects::{Address, EncryptedInput, EncryptedValue, Proof, Timestamp};
use crate::errors::{BountyError, SnapshotError};
use crate::events::BountyEvent;
use crate::service::BoardSnapshot;
use thiserror::Error;

// =============================================================================
// CONFIDENTIAL COMPUTE
// =============================================================================

/// Failures reported by the cryptographic collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The proof does not validate the ciphertexts for this submitter.
    #[error("proof rejected: {0}")]
    ProofRejected(String),

    /// The collaborator could not perform the operation.
    #[error("compute unavailable: {0}")]
    Unavailable(String),
}

impl From<CryptoError> for BountyError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::ProofRejected(reason) => Self::ProofInvalid { reason },
            CryptoError::Unavailable(reason) => Self::Crypto(reason),
        }
    }
}

/// Homomorphic-encryption and proof operations, opaque to the engine.
///
/// The engine performs structural checks itself (value count, non-empty,
/// size bounds) and delegates everything cryptographic here.
pub trait ConfidentialCompute: Send + Sync {
    /// Verify that `input.proof` attests to `input.values` as submitted
    /// by `submitter`.
    ///
    /// # Errors
    ///
    /// `ProofRejected` for an invalid proof, `Unavailable` on failure.
    fn verify_input(&self, submitter: &Address, input: &EncryptedInput) -> Result<(), CryptoError>;

    /// Fold a verified submission's encrypted quality score into the
    /// submitter's encrypted reputation, returning the new value and proof.
    ///
    /// # Errors
    ///
    /// `Unavailable` if the computation fails. The verification that asked
    /// for the accrual is then aborted without any state change.
    fn accrue_reputation(
        &self,
        current: Option<&ReputationRecord>,
        quality: &EncryptedValue,
    ) -> Result<(EncryptedValue, Proof), CryptoError>;
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Errors from publishing events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The sink is closed.
    #[error("event sink closed")]
    Closed,

    /// The sink refused the event.
    #[error("event rejected: {0}")]
    Rejected(String),
}

/// Receives one event per committed transition.
///
/// Failures are logged by the engine and never roll back the transition.
pub trait EventSink: Send + Sync {
    /// Deliver an event.
    ///
    /// # Errors
    ///
    /// `PublishError` if delivery failed.
    fn emit(&self, event: &BountyEvent) -> Result<(), PublishError>;
}

// =============================================================================
// TIME
// =============================================================================

/// Time source for creation timestamps and deadline checks.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// Durable storage for full-board snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `SnapshotError` on I/O or encoding failure.
    fn save(&self, snapshot: &BoardSnapshot) -> Result<(), SnapshotError>;

    /// Load the last saved snapshot, if any.
    ///
    /// # Errors
    ///
    /// `SnapshotError` on I/O failure or a corrupt snapshot.
    fn load(&self) -> Result<Option<BoardSnapshot>, SnapshotError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_crypto_error_mapping() {
        let rejected: BountyError = CryptoError::ProofRejected("bad binding".into()).into();
        assert_eq!(rejected.kind(), ErrorKind::ProofInvalid);

        let down: BountyError = CryptoError::Unavailable("timeout".into()).into();
        assert_eq!(down.kind(), ErrorKind::Crypto);
    }
}
