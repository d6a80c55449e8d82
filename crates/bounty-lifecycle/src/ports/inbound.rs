//! # Inbound Port - BountyBoardApi
//!
//! Primary driving port exposing the bounty board.
//!
//! ## Authorization
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `create_bounty`, `submit_application` | Anyone |
//! | `create_profile`, `update_profile` | Anyone (acts on own profile) |
//! | `accept_application` | Bounty creator |
//! | `submit_work` | Applicant of the accepted application |
//! | `verify_submission`, `update_reputation` | Verifier |
//! | `pause_bounty` | Owner or bounty creator |
//! | `verify_user` | Owner or verifier |
//! | `set_verifier` | Owner |
//!
//! Queries are unauthenticated and expose encrypted fields only as handles.

use crate::domain::access::Roles;
use crate::domain::entities::{
    Application, ApplicationStatus, Bounty, BountyStatus, NewApplication, NewBounty,
    NewSubmission, ProfileInput, ReputationRecord, ReputationSource, Submission,
    SubmissionStatus, UserProfile,
};
use crate::domain::value_objects::{
    Address, ApplicationId, BountyId, Category, DifficultyBand, EncryptedInput, Hash, ProfileId,
    SubmissionId, Timestamp,
};
use crate::errors::BountyError;
use serde::{Deserialize, Serialize};

// =============================================================================
// VIEWS
// =============================================================================

/// Public view of a bounty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyInfo {
    /// Bounty id.
    pub id: BountyId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Acceptance criteria.
    pub requirements: String,
    /// Handle of the encrypted reward.
    pub reward_handle: Hash,
    /// Unix deadline.
    pub deadline: Timestamp,
    /// Difficulty level, 1..=10.
    pub difficulty: u8,
    /// Difficulty band.
    pub difficulty_band: DifficultyBand,
    /// Category.
    pub category: Category,
    /// Creator identity.
    pub creator: Address,
    /// Lifecycle state.
    pub status: BountyStatus,
    /// Accepting applications.
    pub is_active: bool,
    /// Closed by a passing verification.
    pub is_completed: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Completion time.
    pub completed_at: Option<Timestamp>,
    /// Application that completed the bounty.
    pub winning_application: Option<ApplicationId>,
}

impl From<&Bounty> for BountyInfo {
    fn from(b: &Bounty) -> Self {
        Self {
            id: b.id,
            title: b.title.clone(),
            description: b.description.clone(),
            requirements: b.requirements.clone(),
            reward_handle: b.reward.handle(),
            deadline: b.deadline,
            difficulty: b.difficulty.level(),
            difficulty_band: b.difficulty.band(),
            category: b.category,
            creator: b.creator,
            status: b.status,
            is_active: b.is_active(),
            is_completed: b.is_completed(),
            created_at: b.created_at,
            completed_at: b.completed_at,
            winning_application: b.winning_application,
        }
    }
}

/// Public view of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    /// Application id.
    pub id: ApplicationId,
    /// Target bounty.
    pub bounty_id: BountyId,
    /// Applicant identity.
    pub applicant: Address,
    /// Proposal text.
    pub proposal: String,
    /// Handle of the encrypted experience level.
    pub experience_handle: Hash,
    /// Handle of the encrypted time estimate.
    pub estimated_time_handle: Hash,
    /// Lifecycle state.
    pub status: ApplicationStatus,
    /// Accepted by the creator.
    pub is_accepted: bool,
    /// Completed through a passing verification.
    pub is_completed: bool,
    /// Submission time.
    pub submitted_at: Timestamp,
}

impl From<&Application> for ApplicationInfo {
    fn from(a: &Application) -> Self {
        Self {
            id: a.id,
            bounty_id: a.bounty_id,
            applicant: a.applicant,
            proposal: a.proposal.clone(),
            experience_handle: a.experience.handle(),
            estimated_time_handle: a.estimated_time.handle(),
            status: a.status,
            is_accepted: a.is_accepted(),
            is_completed: a.is_completed(),
            submitted_at: a.submitted_at,
        }
    }
}

/// Public view of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionInfo {
    /// Submission id.
    pub id: SubmissionId,
    /// Application the work is for.
    pub application_id: ApplicationId,
    /// Submitter identity.
    pub submitter: Address,
    /// Content reference.
    pub submission_hash: String,
    /// Handle of the encrypted quality score.
    pub quality_handle: Hash,
    /// Verification state.
    pub status: SubmissionStatus,
    /// Verdict, once recorded.
    pub is_verified: Option<bool>,
    /// Verifier's note.
    pub feedback: Option<String>,
    /// Submission time.
    pub submitted_at: Timestamp,
    /// Verdict time.
    pub verified_at: Option<Timestamp>,
}

impl From<&Submission> for SubmissionInfo {
    fn from(s: &Submission) -> Self {
        Self {
            id: s.id,
            application_id: s.application_id,
            submitter: s.submitter,
            submission_hash: s.submission_hash.clone(),
            quality_handle: s.quality.handle(),
            status: s.status(),
            is_verified: s.verdict,
            feedback: s.feedback.clone(),
            submitted_at: s.submitted_at,
            verified_at: s.verified_at,
        }
    }
}

/// Public view of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    /// Profile id.
    pub id: ProfileId,
    /// Owning identity.
    pub identity: Address,
    /// Off-chain profile reference.
    pub profile_hash: String,
    /// Handle of the encrypted skill level.
    pub skill_handle: Hash,
    /// Vouched for by owner or verifier.
    pub is_verified: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

impl From<&UserProfile> for ProfileInfo {
    fn from(p: &UserProfile) -> Self {
        Self {
            id: p.id,
            identity: p.identity,
            profile_hash: p.profile_hash.clone(),
            skill_handle: p.skill.handle(),
            is_verified: p.is_verified,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Public view of a reputation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationInfo {
    /// Identity.
    pub identity: Address,
    /// Handle of the encrypted score.
    pub handle: Hash,
    /// Last write time.
    pub updated_at: Timestamp,
    /// Origin of the last write.
    pub source: ReputationSource,
}

impl ReputationInfo {
    /// View of `record` for `identity`.
    #[must_use]
    pub fn new(identity: Address, record: &ReputationRecord) -> Self {
        Self {
            identity,
            handle: record.value.handle(),
            updated_at: record.updated_at,
            source: record.source,
        }
    }
}

/// Result of a verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Verified submission.
    pub submission_id: SubmissionId,
    /// Verdict.
    pub passed: bool,
    /// Bounty closed by this verdict.
    pub completed_bounty: Option<BountyId>,
    /// Handle of the submitter's new reputation.
    pub reputation_handle: Option<Hash>,
}

/// Selection for [`BountyBoardApi::list_bounties`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "value", rename_all = "snake_case")]
pub enum BountyFilter {
    /// Every bounty.
    #[default]
    All,
    /// Only `Active` bounties.
    Active,
    /// Bounties posted by one creator.
    Creator(Address),
}

impl BountyFilter {
    /// Whether `bounty` is selected.
    #[must_use]
    pub fn matches(&self, bounty: &Bounty) -> bool {
        match self {
            Self::All => true,
            Self::Active => bounty.is_active(),
            Self::Creator(creator) => bounty.creator == *creator,
        }
    }
}

// =============================================================================
// API
// =============================================================================

/// Primary API of the bounty board.
///
/// Every mutating method is atomic: it either commits fully and emits its
/// events, or returns an error and changes nothing.
///
/// # Example
///
/// ```rust,ignore
/// let id = board.create_bounty(creator, new_bounty)?;
/// let app = board.submit_application(applicant, application_for(id))?;
/// board.accept_application(creator, app)?;
/// let sub = board.submit_work(applicant, work_for(app))?;
/// let outcome = board.verify_submission(verifier, sub, true, None)?;
/// assert_eq!(outcome.completed_bounty, Some(id));
/// ```
pub trait BountyBoardApi: Send + Sync {
    /// Post a bounty.
    ///
    /// # Errors
    /// - `EmptyField`: blank title, description or requirements
    /// - `InvalidField`: text too long, difficulty or category out of range
    /// - `DeadlineInPast`: deadline not after now
    /// - `ProofInvalid`: reward input is not exactly one valid ciphertext
    fn create_bounty(&self, caller: Address, bounty: NewBounty) -> Result<BountyId, BountyError>;

    /// Apply to a bounty.
    ///
    /// # Errors
    /// - `BountyNotFound`, `BountyInactive`, `BountyExpired`
    /// - `DuplicateApplication`: when duplicates are disabled
    /// - `EmptyField`: blank proposal
    /// - `ProofInvalid`: input is not exactly two valid ciphertexts
    fn submit_application(
        &self,
        caller: Address,
        application: NewApplication,
    ) -> Result<ApplicationId, BountyError>;

    /// Accept an application.
    ///
    /// # Errors
    /// - `ApplicationNotFound`
    /// - `Unauthorized`: caller is not the bounty's creator
    /// - `InvalidState`: bounty not active, or application already accepted
    fn accept_application(
        &self,
        caller: Address,
        application_id: ApplicationId,
    ) -> Result<(), BountyError>;

    /// Deliver work for an accepted application.
    ///
    /// # Errors
    /// - `ApplicationNotFound`
    /// - `Unauthorized`: caller is not the applicant
    /// - `InvalidState`: not accepted, already completed, or bounty completed
    /// - `EmptyField`: blank submission hash
    /// - `ProofInvalid`: input is not exactly one valid ciphertext
    fn submit_work(
        &self,
        caller: Address,
        submission: NewSubmission,
    ) -> Result<SubmissionId, BountyError>;

    /// Record the verdict on a submission. A pass completes the
    /// application and bounty and accrues the submitter's reputation.
    ///
    /// # Errors
    /// - `SubmissionNotFound`
    /// - `Unauthorized`: caller is not the verifier
    /// - `SubmissionAlreadyVerified`
    /// - `InvalidState`: passing verdict on a paused or completed bounty
    /// - `Crypto`: reputation accrual failed
    fn verify_submission(
        &self,
        caller: Address,
        submission_id: SubmissionId,
        passed: bool,
        feedback: Option<String>,
    ) -> Result<VerificationOutcome, BountyError>;

    /// Replace an identity's encrypted reputation.
    ///
    /// # Errors
    /// - `Unauthorized`: caller is not the verifier
    /// - `ProofInvalid`: input is not exactly one valid ciphertext
    fn update_reputation(
        &self,
        caller: Address,
        identity: Address,
        value: EncryptedInput,
    ) -> Result<(), BountyError>;

    /// Pause a bounty.
    ///
    /// # Errors
    /// - `BountyNotFound`
    /// - `Unauthorized`: caller is neither owner nor creator
    /// - `InvalidState`: already paused or completed
    fn pause_bounty(&self, caller: Address, bounty_id: BountyId) -> Result<(), BountyError>;

    /// Register the caller's profile.
    ///
    /// # Errors
    /// - `ProfileAlreadyExists`
    /// - `EmptyField`: blank profile hash
    /// - `ProofInvalid`: input is not exactly one valid ciphertext
    fn create_profile(&self, caller: Address, profile: ProfileInput)
        -> Result<ProfileId, BountyError>;

    /// Replace the caller's profile. Clears its verified flag.
    ///
    /// # Errors
    /// - `ProfileNotFound`
    /// - `EmptyField`, `ProofInvalid` as for `create_profile`
    fn update_profile(&self, caller: Address, profile: ProfileInput) -> Result<(), BountyError>;

    /// Grant or revoke a profile's verification. Returns `false` when the
    /// flag already had the requested value.
    ///
    /// # Errors
    /// - `Unauthorized`: caller is neither owner nor verifier
    /// - `ProfileNotFound`
    fn verify_user(
        &self,
        caller: Address,
        identity: Address,
        verified: bool,
    ) -> Result<bool, BountyError>;

    /// Reassign the verifier role.
    ///
    /// # Errors
    /// - `Unauthorized`: caller is not the owner
    /// - `InvalidField`: new verifier is the zero address
    fn set_verifier(&self, caller: Address, verifier: Address) -> Result<(), BountyError>;

    /// Bounty by id.
    ///
    /// # Errors
    /// - `BountyNotFound`
    fn get_bounty_info(&self, id: BountyId) -> Result<BountyInfo, BountyError>;

    /// Application by id.
    ///
    /// # Errors
    /// - `ApplicationNotFound`
    fn get_application_info(&self, id: ApplicationId) -> Result<ApplicationInfo, BountyError>;

    /// Submission by id.
    ///
    /// # Errors
    /// - `SubmissionNotFound`
    fn get_submission_info(&self, id: SubmissionId) -> Result<SubmissionInfo, BountyError>;

    /// Profile of an identity.
    ///
    /// # Errors
    /// - `ProfileNotFound`
    fn get_user_profile(&self, identity: Address) -> Result<ProfileInfo, BountyError>;

    /// Reputation of an identity, if any has been written.
    fn get_user_reputation(&self, identity: Address) -> Option<ReputationInfo>;

    /// Bounties selected by `filter`, in id order.
    fn list_bounties(&self, filter: BountyFilter) -> Vec<BountyInfo>;

    /// Applications to a bounty, in id order.
    ///
    /// # Errors
    /// - `BountyNotFound`
    fn applications_for_bounty(
        &self,
        bounty_id: BountyId,
    ) -> Result<Vec<ApplicationInfo>, BountyError>;

    /// Applications by one applicant, in id order.
    fn applications_by_applicant(&self, applicant: Address) -> Vec<ApplicationInfo>;

    /// Submissions for an application, in id order.
    ///
    /// # Errors
    /// - `ApplicationNotFound`
    fn submissions_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<SubmissionInfo>, BountyError>;

    /// Current owner and verifier.
    fn roles(&self) -> Roles;
}
