//! # Domain Invariants
//!
//! Field-level checks run before any record is written, plus record-level
//! invariants that must hold for every stored entity.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Required text is non-blank and bounded | [`check_text`] |
//! | Deadline strictly after creation | [`check_deadline`], [`check_bounty_invariant`] |
//! | Encrypted input matches the operation's shape | [`check_encrypted_input`] |
//! | Completed bounties are inactive | [`check_bounty_invariant`] |
//! | Completed applications were accepted | [`check_application_invariant`] |

use super::entities::{Application, ApplicationStatus, Bounty, BountyStatus};
use super::value_objects::{Category, Difficulty, EncryptedInput, Timestamp};
use crate::errors::BountyError;
use serde::{Deserialize, Serialize};

// =============================================================================
// PAYLOAD LIMITS
// =============================================================================

/// Upper bounds on caller-supplied payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadLimits {
    /// Largest accepted ciphertext, in bytes.
    pub max_ciphertext_bytes: usize,
    /// Largest accepted proof, in bytes.
    pub max_proof_bytes: usize,
    /// Longest accepted text field, in bytes.
    pub max_text_bytes: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            max_ciphertext_bytes: limits::DEFAULT_MAX_CIPHERTEXT_BYTES,
            max_proof_bytes: limits::DEFAULT_MAX_PROOF_BYTES,
            max_text_bytes: limits::DEFAULT_MAX_TEXT_BYTES,
        }
    }
}

// =============================================================================
// FIELD CHECKS
// =============================================================================

/// Required text: non-blank and at most `max_bytes` long.
///
/// # Errors
///
/// `EmptyField` for blank text, `InvalidField` when too long.
pub fn check_text(field: &'static str, value: &str, max_bytes: usize) -> Result<(), BountyError> {
    if value.trim().is_empty() {
        return Err(BountyError::EmptyField { field });
    }
    if value.len() > max_bytes {
        return Err(BountyError::invalid(
            field,
            format!("{} bytes exceeds limit of {max_bytes}", value.len()),
        ));
    }
    Ok(())
}

/// Deadline strictly in the future.
///
/// # Errors
///
/// `DeadlineInPast` when `deadline <= now`.
pub fn check_deadline(deadline: Timestamp, now: Timestamp) -> Result<(), BountyError> {
    if deadline <= now {
        return Err(BountyError::DeadlineInPast { deadline, now });
    }
    Ok(())
}

/// Structural check of an encrypted input: exact value count, no empty
/// ciphertext or proof, everything within limits.
///
/// # Errors
///
/// `ProofInvalid` describing the first mismatch.
pub fn check_encrypted_input(
    input: &EncryptedInput,
    expected_values: usize,
    limits: &PayloadLimits,
) -> Result<(), BountyError> {
    if input.values.len() != expected_values {
        return Err(BountyError::proof(format!(
            "expected {expected_values} encrypted values, got {}",
            input.values.len()
        )));
    }
    for (index, value) in input.values.iter().enumerate() {
        if value.is_empty() {
            return Err(BountyError::proof(format!("encrypted value {index} is empty")));
        }
        if value.len() > limits.max_ciphertext_bytes {
            return Err(BountyError::proof(format!(
                "encrypted value {index} is {} bytes, limit {}",
                value.len(),
                limits.max_ciphertext_bytes
            )));
        }
    }
    if input.proof.is_empty() {
        return Err(BountyError::proof("proof is empty"));
    }
    if input.proof.len() > limits.max_proof_bytes {
        return Err(BountyError::proof(format!(
            "proof is {} bytes, limit {}",
            input.proof.len(),
            limits.max_proof_bytes
        )));
    }
    Ok(())
}

/// Validate a raw difficulty code.
///
/// # Errors
///
/// `InvalidField` outside `1..=10`.
pub fn parse_difficulty(level: u8) -> Result<Difficulty, BountyError> {
    Difficulty::try_from(level).map_err(|reason| BountyError::invalid("difficulty", reason))
}

/// Validate a raw category code.
///
/// # Errors
///
/// `InvalidField` outside `0..=7`.
pub fn parse_category(code: u8) -> Result<Category, BountyError> {
    Category::try_from(code).map_err(|reason| BountyError::invalid("category", reason))
}

// =============================================================================
// RECORD INVARIANTS
// =============================================================================

/// Holds for every stored bounty.
#[must_use]
pub fn check_bounty_invariant(bounty: &Bounty) -> bool {
    let deadline_ok = bounty.deadline > bounty.created_at;
    let title_ok = !bounty.title.trim().is_empty();
    let status_ok = match bounty.status {
        BountyStatus::Active => bounty.completed_at.is_none() && bounty.paused_at.is_none(),
        BountyStatus::Paused => bounty.paused_at.is_some() && bounty.completed_at.is_none(),
        BountyStatus::Completed => {
            bounty.completed_at.is_some() && bounty.winning_application.is_some()
        }
    };
    deadline_ok && title_ok && status_ok
}

/// Holds for every stored application.
#[must_use]
pub fn check_application_invariant(application: &Application) -> bool {
    match application.status {
        ApplicationStatus::Submitted => application.accepted_at.is_none(),
        ApplicationStatus::Accepted | ApplicationStatus::WorkSubmitted => {
            application.accepted_at.is_some() && application.completed_at.is_none()
        }
        ApplicationStatus::Completed => {
            application.accepted_at.is_some() && application.completed_at.is_some()
        }
    }
}

/// Engine limits and encrypted-field counts.
pub mod limits {
    /// Default ciphertext bound (8 KiB).
    pub const DEFAULT_MAX_CIPHERTEXT_BYTES: usize = 8 * 1024;

    /// Default proof bound (64 KiB).
    pub const DEFAULT_MAX_PROOF_BYTES: usize = 64 * 1024;

    /// Default text field bound (4 KiB).
    pub const DEFAULT_MAX_TEXT_BYTES: usize = 4 * 1024;

    /// Encrypted values in a bounty: reward.
    pub const BOUNTY_FIELDS: usize = 1;

    /// Encrypted values in an application: experience, estimated time.
    pub const APPLICATION_FIELDS: usize = 2;

    /// Encrypted values in a submission: quality score.
    pub const SUBMISSION_FIELDS: usize = 1;

    /// Encrypted values in a profile: skill level.
    pub const PROFILE_FIELDS: usize = 1;

    /// Encrypted values in a reputation update.
    pub const REPUTATION_FIELDS: usize = 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{EncryptedValue, Proof};
    use crate::errors::ErrorKind;

    fn input(values: &[&[u8]], proof: &[u8]) -> EncryptedInput {
        EncryptedInput::new(
            values.iter().map(|v| EncryptedValue::new(v.to_vec())).collect(),
            Proof::new(proof.to_vec()),
        )
    }

    #[test]
    fn test_blank_text_is_empty_field() {
        assert_eq!(
            check_text("Bounty title", "   ", 10),
            Err(BountyError::EmptyField {
                field: "Bounty title"
            })
        );
        assert!(check_text("Bounty title", "Audit", 10).is_ok());
    }

    #[test]
    fn test_long_text_is_invalid_field() {
        let err = check_text("proposal", "abcdef", 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
    }

    #[test]
    fn test_deadline_must_be_strictly_future() {
        assert!(check_deadline(101, 100).is_ok());
        assert!(matches!(
            check_deadline(100, 100),
            Err(BountyError::DeadlineInPast { .. })
        ));
        assert!(check_deadline(5, 100).is_err());
    }

    #[test]
    fn test_encrypted_input_shape() {
        let limits = PayloadLimits::default();
        assert!(check_encrypted_input(&input(&[b"a", b"b"], b"p"), 2, &limits).is_ok());

        let wrong_count = check_encrypted_input(&input(&[b"a"], b"p"), 2, &limits);
        assert_eq!(wrong_count.unwrap_err().kind(), ErrorKind::ProofInvalid);

        let empty_value = check_encrypted_input(&input(&[b""], b"p"), 1, &limits);
        assert!(empty_value.is_err());

        let empty_proof = check_encrypted_input(&input(&[b"a"], b""), 1, &limits);
        assert!(empty_proof.is_err());
    }

    #[test]
    fn test_encrypted_input_limits() {
        let limits = PayloadLimits {
            max_ciphertext_bytes: 2,
            max_proof_bytes: 2,
            max_text_bytes: 10,
        };
        assert!(check_encrypted_input(&input(&[b"abc"], b"p"), 1, &limits).is_err());
        assert!(check_encrypted_input(&input(&[b"ab"], b"ppp"), 1, &limits).is_err());
        assert!(check_encrypted_input(&input(&[b"ab"], b"pp"), 1, &limits).is_ok());
    }

    #[test]
    fn test_code_parsing() {
        assert!(parse_difficulty(0).is_err());
        assert_eq!(parse_difficulty(10).unwrap().level(), 10);
        assert_eq!(parse_category(5).unwrap(), Category::Cryptography);
        assert_eq!(
            parse_category(8).unwrap_err().kind(),
            ErrorKind::InvalidField
        );
    }
}
