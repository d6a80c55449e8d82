//! # Domain Entities
//!
//! Records owned by the entity store. Cross-entity links are by id only.
//! Nothing is ever deleted; records move through their status enums.

use super::value_objects::{
    Address, ApplicationId, BountyId, Category, Difficulty, EncryptedInput, EncryptedValue,
    ProfileId, Proof, SubmissionId, Timestamp,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// BOUNTY
// =============================================================================

/// Lifecycle state of a bounty.
///
/// `Paused` and `Completed` are terminal; nothing returns a bounty to
/// `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BountyStatus {
    /// Open for applications and acceptance.
    Active,
    /// Stopped by the owner or creator.
    Paused,
    /// Closed by a passing verification.
    Completed,
}

/// A posted task with an encrypted reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    /// Sequential id.
    pub id: BountyId,
    /// Short title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Acceptance criteria.
    pub requirements: String,
    /// Encrypted reward amount.
    pub reward: EncryptedValue,
    /// Proof accompanying the reward ciphertext.
    pub reward_proof: Proof,
    /// Unix deadline, strictly after `created_at`.
    pub deadline: Timestamp,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Category.
    pub category: Category,
    /// Identity that posted the bounty.
    pub creator: Address,
    /// Current state.
    pub status: BountyStatus,
    /// Creation time.
    pub created_at: Timestamp,
    /// When the bounty was paused.
    pub paused_at: Option<Timestamp>,
    /// When the bounty was completed.
    pub completed_at: Option<Timestamp>,
    /// Application whose work completed the bounty.
    pub winning_application: Option<ApplicationId>,
}

impl Bounty {
    /// Accepting applications and acceptances.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BountyStatus::Active
    }

    /// Closed by a passing verification. Implies `!is_active()`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == BountyStatus::Completed
    }

    /// Whether `now` is past the deadline.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.deadline
    }
}

/// Caller-supplied fields for a new bounty.
///
/// Difficulty and category arrive as raw codes and are validated by the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBounty {
    /// Short title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Acceptance criteria.
    pub requirements: String,
    /// Unix deadline.
    pub deadline: Timestamp,
    /// Difficulty level, 1..=10.
    pub difficulty: u8,
    /// Category code, 0..=7.
    pub category: u8,
    /// Encrypted reward (one value) and its proof.
    pub reward: EncryptedInput,
}

// =============================================================================
// APPLICATION
// =============================================================================

/// Lifecycle state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// Waiting for the creator.
    Submitted,
    /// Accepted by the creator.
    Accepted,
    /// At least one submission references it.
    WorkSubmitted,
    /// A submission passed verification.
    Completed,
}

/// A candidate's proposal for a bounty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Sequential id.
    pub id: ApplicationId,
    /// Target bounty.
    pub bounty_id: BountyId,
    /// Applicant identity.
    pub applicant: Address,
    /// Proposal text.
    pub proposal: String,
    /// Encrypted experience level.
    pub experience: EncryptedValue,
    /// Encrypted time estimate.
    pub estimated_time: EncryptedValue,
    /// Proof covering both ciphertexts.
    pub proof: Proof,
    /// Current state.
    pub status: ApplicationStatus,
    /// Submission time.
    pub submitted_at: Timestamp,
    /// Acceptance time.
    pub accepted_at: Option<Timestamp>,
    /// Completion time.
    pub completed_at: Option<Timestamp>,
}

impl Application {
    /// Accepted at some point (any state past `Submitted`).
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.status != ApplicationStatus::Submitted
    }

    /// Completed through a passing verification.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ApplicationStatus::Completed
    }
}

/// Caller-supplied fields for a new application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    /// Target bounty.
    pub bounty_id: BountyId,
    /// Proposal text.
    pub proposal: String,
    /// Encrypted `[experience, estimated_time]` and their proof.
    pub encrypted: EncryptedInput,
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// Verification state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// No verdict yet.
    Pending,
    /// Verifier accepted the work.
    VerifiedPass,
    /// Verifier rejected the work.
    VerifiedFail,
}

/// Delivered work for an accepted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Sequential id.
    pub id: SubmissionId,
    /// Application the work is for.
    pub application_id: ApplicationId,
    /// Submitting identity, always the application's applicant.
    pub submitter: Address,
    /// Content reference to the off-chain artifact.
    pub submission_hash: String,
    /// Encrypted quality score.
    pub quality: EncryptedValue,
    /// Proof covering the quality ciphertext.
    pub proof: Proof,
    /// Verdict, written exactly once.
    pub verdict: Option<bool>,
    /// Verifier's note.
    pub feedback: Option<String>,
    /// Submission time.
    pub submitted_at: Timestamp,
    /// Verdict time.
    pub verified_at: Option<Timestamp>,
}

impl Submission {
    /// Derived status.
    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        match self.verdict {
            None => SubmissionStatus::Pending,
            Some(true) => SubmissionStatus::VerifiedPass,
            Some(false) => SubmissionStatus::VerifiedFail,
        }
    }
}

/// Caller-supplied fields for a work submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    /// Accepted application the work is for.
    pub application_id: ApplicationId,
    /// Content reference to the off-chain artifact.
    pub submission_hash: String,
    /// Encrypted quality score (one value) and its proof.
    pub encrypted: EncryptedInput,
}

// =============================================================================
// PROFILE & REPUTATION
// =============================================================================

/// Per-identity profile with an encrypted skill level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Sequential id.
    pub id: ProfileId,
    /// Owning identity.
    pub identity: Address,
    /// Off-chain profile reference.
    pub profile_hash: String,
    /// Encrypted skill level.
    pub skill: EncryptedValue,
    /// Proof covering the skill ciphertext.
    pub proof: Proof,
    /// Vouched for by the owner or verifier.
    pub is_verified: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

/// Caller-supplied profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    /// Off-chain profile reference.
    pub profile_hash: String,
    /// Encrypted skill level (one value) and its proof.
    pub encrypted: EncryptedInput,
}

/// Where a reputation value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationSource {
    /// Written directly by the verifier.
    Verifier,
    /// Accrued by a passing verification.
    Accrued {
        /// Submission that triggered the accrual.
        submission_id: SubmissionId,
    },
}

/// Encrypted reputation of one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationRecord {
    /// Encrypted score.
    pub value: EncryptedValue,
    /// Proof for the score.
    pub proof: Proof,
    /// Last write time.
    pub updated_at: Timestamp,
    /// Origin of the last write.
    pub source: ReputationSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(verdict: Option<bool>) -> Submission {
        Submission {
            id: 0,
            application_id: 0,
            submitter: Address::ZERO,
            submission_hash: "hash".into(),
            quality: EncryptedValue::new(vec![1]),
            proof: Proof::new(vec![1]),
            verdict,
            feedback: None,
            submitted_at: 0,
            verified_at: None,
        }
    }

    #[test]
    fn test_submission_status_from_verdict() {
        assert_eq!(submission(None).status(), SubmissionStatus::Pending);
        assert_eq!(submission(Some(true)).status(), SubmissionStatus::VerifiedPass);
        assert_eq!(submission(Some(false)).status(), SubmissionStatus::VerifiedFail);
    }

    #[test]
    fn test_bounty_flags_follow_status() {
        let mut bounty = Bounty {
            id: 0,
            title: "Audit".into(),
            description: "d".into(),
            requirements: "r".into(),
            reward: EncryptedValue::new(vec![1]),
            reward_proof: Proof::new(vec![1]),
            deadline: 100,
            difficulty: Difficulty::new(5).unwrap(),
            category: Category::SecurityAuditing,
            creator: Address::ZERO,
            status: BountyStatus::Active,
            created_at: 10,
            paused_at: None,
            completed_at: None,
            winning_application: None,
        };
        assert!(bounty.is_active());
        assert!(!bounty.is_expired(99));
        assert!(bounty.is_expired(100));

        bounty.status = BountyStatus::Completed;
        assert!(bounty.is_completed());
        assert!(!bounty.is_active());
    }
}
