//! # Access Control Policy
//!
//! Pure role resolution. Every mutating operation asks [`authorize`] before
//! touching the store. There is no role hierarchy: the owner only gains the
//! permissions explicitly listed for it.

use super::value_objects::Address;
use serde::{Deserialize, Serialize};

/// Board-wide roles, fixed per engine instance except for the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    /// Deployer identity.
    pub owner: Address,
    /// Sole identity allowed to judge submissions and write reputation.
    pub verifier: Address,
}

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Post a bounty.
    CreateBounty,
    /// Apply to a bounty.
    SubmitApplication,
    /// Accept an application.
    AcceptApplication,
    /// Deliver work.
    SubmitWork,
    /// Record a verdict.
    VerifySubmission,
    /// Write a reputation value.
    UpdateReputation,
    /// Pause a bounty.
    PauseBounty,
    /// Register a profile.
    CreateProfile,
    /// Replace own profile.
    UpdateProfile,
    /// Vouch for a profile.
    VerifyUser,
    /// Reassign the verifier.
    SetVerifier,
}

impl Operation {
    /// Stable label for errors, logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateBounty => "create_bounty",
            Self::SubmitApplication => "submit_application",
            Self::AcceptApplication => "accept_application",
            Self::SubmitWork => "submit_work",
            Self::VerifySubmission => "verify_submission",
            Self::UpdateReputation => "update_reputation",
            Self::PauseBounty => "pause_bounty",
            Self::CreateProfile => "create_profile",
            Self::UpdateProfile => "update_profile",
            Self::VerifyUser => "verify_user",
            Self::SetVerifier => "set_verifier",
        }
    }
}

/// Entity-specific facts needed to resolve per-record roles.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    /// Board roles.
    pub roles: &'a Roles,
    /// Creator of the targeted bounty, if any.
    pub creator: Option<Address>,
    /// Applicant of the targeted application, if any.
    pub applicant: Option<Address>,
}

impl<'a> AccessContext<'a> {
    /// Context with no per-record roles.
    #[must_use]
    pub fn board(roles: &'a Roles) -> Self {
        Self {
            roles,
            creator: None,
            applicant: None,
        }
    }

    /// Context for an operation on a bounty.
    #[must_use]
    pub fn bounty(roles: &'a Roles, creator: Address) -> Self {
        Self {
            creator: Some(creator),
            ..Self::board(roles)
        }
    }

    /// Context for an operation on an application.
    #[must_use]
    pub fn application(roles: &'a Roles, creator: Address, applicant: Address) -> Self {
        Self {
            roles,
            creator: Some(creator),
            applicant: Some(applicant),
        }
    }
}

/// Whether `caller` may perform `operation` in `ctx`.
#[must_use]
pub fn authorize(caller: &Address, operation: Operation, ctx: &AccessContext<'_>) -> bool {
    let is_owner = *caller == ctx.roles.owner;
    let is_verifier = *caller == ctx.roles.verifier;
    let is_creator = ctx.creator.as_ref() == Some(caller);
    let is_applicant = ctx.applicant.as_ref() == Some(caller);

    match operation {
        // Open to any identity; profile ops act on the caller's own record.
        Operation::CreateBounty
        | Operation::SubmitApplication
        | Operation::CreateProfile
        | Operation::UpdateProfile => true,
        Operation::AcceptApplication => is_creator,
        Operation::SubmitWork => is_applicant,
        Operation::VerifySubmission | Operation::UpdateReputation => is_verifier,
        Operation::PauseBounty => is_owner || is_creator,
        Operation::VerifyUser => is_owner || is_verifier,
        Operation::SetVerifier => is_owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::new([1; 20]);
    const VERIFIER: Address = Address::new([2; 20]);
    const CREATOR: Address = Address::new([3; 20]);
    const APPLICANT: Address = Address::new([4; 20]);
    const STRANGER: Address = Address::new([5; 20]);

    fn roles() -> Roles {
        Roles {
            owner: OWNER,
            verifier: VERIFIER,
        }
    }

    #[test]
    fn test_only_verifier_verifies() {
        let roles = roles();
        let ctx = AccessContext::application(&roles, CREATOR, APPLICANT);
        assert!(authorize(&VERIFIER, Operation::VerifySubmission, &ctx));
        for caller in [OWNER, CREATOR, APPLICANT, STRANGER] {
            assert!(!authorize(&caller, Operation::VerifySubmission, &ctx));
            assert!(!authorize(&caller, Operation::UpdateReputation, &ctx));
        }
    }

    #[test]
    fn test_accept_requires_creator() {
        let roles = roles();
        let ctx = AccessContext::application(&roles, CREATOR, APPLICANT);
        assert!(authorize(&CREATOR, Operation::AcceptApplication, &ctx));
        assert!(!authorize(&OWNER, Operation::AcceptApplication, &ctx));
        assert!(!authorize(&APPLICANT, Operation::AcceptApplication, &ctx));
    }

    #[test]
    fn test_submit_work_requires_applicant() {
        let roles = roles();
        let ctx = AccessContext::application(&roles, CREATOR, APPLICANT);
        assert!(authorize(&APPLICANT, Operation::SubmitWork, &ctx));
        assert!(!authorize(&CREATOR, Operation::SubmitWork, &ctx));
    }

    #[test]
    fn test_pause_owner_or_creator() {
        let roles = roles();
        let ctx = AccessContext::bounty(&roles, CREATOR);
        assert!(authorize(&OWNER, Operation::PauseBounty, &ctx));
        assert!(authorize(&CREATOR, Operation::PauseBounty, &ctx));
        assert!(!authorize(&VERIFIER, Operation::PauseBounty, &ctx));
        assert!(!authorize(&STRANGER, Operation::PauseBounty, &ctx));
    }

    #[test]
    fn test_board_level_roles() {
        let roles = roles();
        let ctx = AccessContext::board(&roles);
        assert!(authorize(&OWNER, Operation::SetVerifier, &ctx));
        assert!(!authorize(&VERIFIER, Operation::SetVerifier, &ctx));
        assert!(authorize(&OWNER, Operation::VerifyUser, &ctx));
        assert!(authorize(&VERIFIER, Operation::VerifyUser, &ctx));
        assert!(!authorize(&STRANGER, Operation::VerifyUser, &ctx));
        assert!(authorize(&STRANGER, Operation::CreateBounty, &ctx));
    }

    #[test]
    fn test_same_identity_holding_two_roles() {
        let roles = Roles {
            owner: OWNER,
            verifier: OWNER,
        };
        let ctx = AccessContext::board(&roles);
        assert!(authorize(&OWNER, Operation::UpdateReputation, &ctx));
        assert!(authorize(&OWNER, Operation::SetVerifier, &ctx));
    }
}
