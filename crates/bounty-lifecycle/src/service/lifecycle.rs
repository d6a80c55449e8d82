//! Mutating transitions.
//!
//! Each transition checks, in order: existence, authorization, state,
//! field validity, encrypted-input structure, then proof verification.
//! Writes start only after the last check.

use super::{require, BountyBoardService, Committed};
use crate::domain::access::{AccessContext, Operation};
use crate::domain::entities::{
    Application, ApplicationStatus, Bounty, BountyStatus, NewApplication, NewBounty,
    NewSubmission, ProfileInput, ReputationRecord, ReputationSource, Submission, UserProfile,
};
use crate::domain::invariants::{
    check_deadline, check_encrypted_input, check_text, limits, parse_category, parse_difficulty,
};
use crate::domain::value_objects::{
    Address, ApplicationId, BountyId, EncryptedInput, EncryptedValue, ProfileId, SubmissionId,
};
use crate::errors::BountyError;
use crate::events::BountyEvent;
use crate::ports::inbound::VerificationOutcome;
use tracing::{debug, info, instrument};

/// Unpack exactly `N` ciphertexts.
fn take_values<const N: usize>(values: Vec<EncryptedValue>) -> Result<[EncryptedValue; N], BountyError> {
    values.try_into().map_err(|values: Vec<EncryptedValue>| {
        BountyError::proof(format!("expected {N} encrypted values, got {}", values.len()))
    })
}

impl BountyBoardService {
    /// Shared front half of every encrypted write: shape, then proof.
    fn check_input(
        &self,
        caller: &Address,
        input: &EncryptedInput,
        expected_values: usize,
    ) -> Result<(), BountyError> {
        check_encrypted_input(input, expected_values, &self.limits)?;
        self.compute.verify_input(caller, input)?;
        Ok(())
    }

    // =========================================================================
    // BOUNTIES
    // =========================================================================

    #[instrument(skip(self, bounty), fields(caller = %caller.short(), title = %bounty.title))]
    pub(super) fn create_bounty_impl(
        &self,
        caller: Address,
        bounty: NewBounty,
    ) -> Result<BountyId, BountyError> {
        self.execute(Operation::CreateBounty, |state, now| {
            require(&caller, Operation::CreateBounty, &AccessContext::board(&state.roles))?;

            let max = self.limits.max_text_bytes;
            check_text("Bounty title", &bounty.title, max)?;
            check_text("Bounty description", &bounty.description, max)?;
            check_text("Bounty requirements", &bounty.requirements, max)?;
            check_deadline(bounty.deadline, now)?;
            let difficulty = parse_difficulty(bounty.difficulty)?;
            let category = parse_category(bounty.category)?;
            self.check_input(&caller, &bounty.reward, limits::BOUNTY_FIELDS)?;

            let NewBounty {
                title,
                description,
                requirements,
                deadline,
                reward,
                ..
            } = bounty;
            let [reward_value] = take_values::<1>(reward.values)?;
            let event_title = title.clone();

            let id = state.store.bounties.insert_with(|id| Bounty {
                id,
                title,
                description,
                requirements,
                reward: reward_value,
                reward_proof: reward.proof,
                deadline,
                difficulty,
                category,
                creator: caller,
                status: BountyStatus::Active,
                created_at: now,
                paused_at: None,
                completed_at: None,
                winning_application: None,
            });
            self.stats.lock().bounties_created += 1;
            info!(bounty_id = id, deadline, %category, "Bounty created");

            Ok(Committed::new(
                id,
                vec![BountyEvent::BountyCreated {
                    id,
                    creator: caller,
                    title: event_title,
                }],
            ))
        })
    }

    #[instrument(skip(self), fields(caller = %caller.short()))]
    pub(super) fn pause_bounty_impl(
        &self,
        caller: Address,
        bounty_id: BountyId,
    ) -> Result<(), BountyError> {
        self.execute(Operation::PauseBounty, |state, now| {
            let bounty = state.store.bounties.fetch(bounty_id)?;
            require(
                &caller,
                Operation::PauseBounty,
                &AccessContext::bounty(&state.roles, bounty.creator),
            )?;
            match bounty.status {
                BountyStatus::Active => {}
                BountyStatus::Paused => {
                    return Err(BountyError::InvalidState {
                        entity: "bounty",
                        id: bounty_id,
                        reason: "already paused",
                    })
                }
                BountyStatus::Completed => {
                    return Err(BountyError::InvalidState {
                        entity: "bounty",
                        id: bounty_id,
                        reason: "already completed",
                    })
                }
            }

            state.store.bounties.update(bounty_id, |b| {
                b.status = BountyStatus::Paused;
                b.paused_at = Some(now);
            })?;
            info!(bounty_id, "Bounty paused");

            Ok(Committed::new(
                (),
                vec![BountyEvent::BountyPaused {
                    id: bounty_id,
                    by: caller,
                }],
            ))
        })
    }

    // =========================================================================
    // APPLICATIONS
    // =========================================================================

    #[instrument(skip(self, application), fields(caller = %caller.short(), bounty_id = application.bounty_id))]
    pub(super) fn submit_application_impl(
        &self,
        caller: Address,
        application: NewApplication,
    ) -> Result<ApplicationId, BountyError> {
        self.execute(Operation::SubmitApplication, |state, now| {
            let bounty_id = application.bounty_id;
            let bounty = state.store.bounties.fetch(bounty_id)?;
            require(
                &caller,
                Operation::SubmitApplication,
                &AccessContext::bounty(&state.roles, bounty.creator),
            )?;
            if !bounty.is_active() {
                return Err(BountyError::BountyInactive(bounty_id));
            }
            if bounty.is_expired(now) {
                return Err(BountyError::BountyExpired {
                    id: bounty_id,
                    deadline: bounty.deadline,
                });
            }
            if !self.policy.allow_duplicate_applications
                && state
                    .store
                    .applications
                    .iter()
                    .any(|a| a.bounty_id == bounty_id && a.applicant == caller)
            {
                return Err(BountyError::DuplicateApplication {
                    bounty_id,
                    applicant: caller,
                });
            }
            check_text("Proposal", &application.proposal, self.limits.max_text_bytes)?;
            self.check_input(&caller, &application.encrypted, limits::APPLICATION_FIELDS)?;

            let NewApplication {
                proposal,
                encrypted,
                ..
            } = application;
            let [experience, estimated_time] = take_values::<2>(encrypted.values)?;

            let id = state.store.applications.insert_with(|id| Application {
                id,
                bounty_id,
                applicant: caller,
                proposal,
                experience,
                estimated_time,
                proof: encrypted.proof,
                status: ApplicationStatus::Submitted,
                submitted_at: now,
                accepted_at: None,
                completed_at: None,
            });
            self.stats.lock().applications_submitted += 1;
            info!(application_id = id, bounty_id, "Application submitted");

            Ok(Committed::new(
                id,
                vec![BountyEvent::ApplicationSubmitted {
                    id,
                    bounty_id,
                    applicant: caller,
                }],
            ))
        })
    }

    #[instrument(skip(self), fields(caller = %caller.short()))]
    pub(super) fn accept_application_impl(
        &self,
        caller: Address,
        application_id: ApplicationId,
    ) -> Result<(), BountyError> {
        self.execute(Operation::AcceptApplication, |state, now| {
            let application = state.store.applications.fetch(application_id)?;
            let bounty = state.store.bounties.fetch(application.bounty_id)?;
            require(
                &caller,
                Operation::AcceptApplication,
                &AccessContext::application(&state.roles, bounty.creator, application.applicant),
            )?;
            if !bounty.is_active() {
                return Err(BountyError::InvalidState {
                    entity: "bounty",
                    id: bounty.id,
                    reason: "bounty is not active",
                });
            }
            if application.is_accepted() {
                return Err(BountyError::InvalidState {
                    entity: "application",
                    id: application_id,
                    reason: "already accepted",
                });
            }
            let applicant = application.applicant;

            state.store.applications.update(application_id, |a| {
                a.status = ApplicationStatus::Accepted;
                a.accepted_at = Some(now);
            })?;
            info!(application_id, applicant = %applicant.short(), "Application accepted");

            Ok(Committed::new(
                (),
                vec![BountyEvent::ApplicationAccepted {
                    id: application_id,
                    applicant,
                }],
            ))
        })
    }

    // =========================================================================
    // SUBMISSIONS
    // =========================================================================

    #[instrument(skip(self, submission), fields(caller = %caller.short(), application_id = submission.application_id))]
    pub(super) fn submit_work_impl(
        &self,
        caller: Address,
        submission: NewSubmission,
    ) -> Result<SubmissionId, BountyError> {
        self.execute(Operation::SubmitWork, |state, now| {
            let application_id = submission.application_id;
            let application = state.store.applications.fetch(application_id)?;
            let bounty = state.store.bounties.fetch(application.bounty_id)?;
            require(
                &caller,
                Operation::SubmitWork,
                &AccessContext::application(&state.roles, bounty.creator, application.applicant),
            )?;
            if !application.is_accepted() {
                return Err(BountyError::InvalidState {
                    entity: "application",
                    id: application_id,
                    reason: "application not accepted",
                });
            }
            if application.is_completed() {
                return Err(BountyError::InvalidState {
                    entity: "application",
                    id: application_id,
                    reason: "application already completed",
                });
            }
            if bounty.is_completed() {
                return Err(BountyError::InvalidState {
                    entity: "bounty",
                    id: bounty.id,
                    reason: "bounty already completed",
                });
            }
            check_text(
                "Submission hash",
                &submission.submission_hash,
                self.limits.max_text_bytes,
            )?;
            self.check_input(&caller, &submission.encrypted, limits::SUBMISSION_FIELDS)?;

            let NewSubmission {
                submission_hash,
                encrypted,
                ..
            } = submission;
            let [quality] = take_values::<1>(encrypted.values)?;

            let id = state.store.submissions.insert_with(|id| Submission {
                id,
                application_id,
                submitter: caller,
                submission_hash,
                quality,
                proof: encrypted.proof,
                verdict: None,
                feedback: None,
                submitted_at: now,
                verified_at: None,
            });
            state.store.applications.update(application_id, |a| {
                a.status = ApplicationStatus::WorkSubmitted;
            })?;
            self.stats.lock().submissions_received += 1;
            info!(submission_id = id, application_id, "Work submitted");

            Ok(Committed::new(
                id,
                vec![BountyEvent::SubmissionSubmitted {
                    id,
                    application_id,
                    submitter: caller,
                }],
            ))
        })
    }

    #[instrument(skip(self, feedback), fields(caller = %caller.short()))]
    pub(super) fn verify_submission_impl(
        &self,
        caller: Address,
        submission_id: SubmissionId,
        passed: bool,
        feedback: Option<String>,
    ) -> Result<VerificationOutcome, BountyError> {
        self.execute(Operation::VerifySubmission, |state, now| {
            let submission = state.store.submissions.fetch(submission_id)?;
            require(
                &caller,
                Operation::VerifySubmission,
                &AccessContext::board(&state.roles),
            )?;
            if submission.verdict.is_some() {
                return Err(BountyError::SubmissionAlreadyVerified(submission_id));
            }
            let feedback = match feedback {
                Some(text) if text.trim().is_empty() => None,
                Some(text) if text.len() > self.limits.max_text_bytes => {
                    return Err(BountyError::invalid(
                        "feedback",
                        format!(
                            "{} bytes exceeds limit of {}",
                            text.len(),
                            self.limits.max_text_bytes
                        ),
                    ))
                }
                other => other,
            };

            let application = state.store.applications.fetch(submission.application_id)?;
            let bounty = state.store.bounties.fetch(application.bounty_id)?;
            let submitter = submission.submitter;
            let application_id = application.id;
            let bounty_id = bounty.id;

            // A pass closes the bounty, so it needs an open one and a fresh
            // reputation value before anything is written.
            let accrued = if passed {
                if !bounty.is_active() {
                    return Err(BountyError::InvalidState {
                        entity: "bounty",
                        id: bounty_id,
                        reason: "only an active bounty can be completed",
                    });
                }
                let (value, proof) = self
                    .compute
                    .accrue_reputation(state.ledger.get(&submitter), &submission.quality)?;
                Some((value, proof, bounty.reward.handle()))
            } else {
                None
            };

            state.store.submissions.update(submission_id, |s| {
                s.verdict = Some(passed);
                s.feedback = feedback;
                s.verified_at = Some(now);
            })?;
            let mut events = vec![BountyEvent::SubmissionVerified {
                id: submission_id,
                passed,
            }];

            let outcome = match accrued {
                Some((value, proof, reward_handle)) => {
                    state.store.applications.update(application_id, |a| {
                        a.status = ApplicationStatus::Completed;
                        a.completed_at = Some(now);
                    })?;
                    state.store.bounties.update(bounty_id, |b| {
                        b.status = BountyStatus::Completed;
                        b.completed_at = Some(now);
                        b.winning_application = Some(application_id);
                    })?;
                    let handle = value.handle();
                    state.ledger.upsert(
                        submitter,
                        ReputationRecord {
                            value,
                            proof,
                            updated_at: now,
                            source: ReputationSource::Accrued { submission_id },
                        },
                    );
                    self.stats.lock().verifications_passed += 1;
                    info!(submission_id, bounty_id, application_id, "Submission passed; bounty completed");

                    events.push(BountyEvent::BountyCompleted {
                        bounty_id,
                        applicant: submitter,
                        reward_handle,
                    });
                    events.push(BountyEvent::ReputationUpdated {
                        identity: submitter,
                        handle,
                    });
                    VerificationOutcome {
                        submission_id,
                        passed,
                        completed_bounty: Some(bounty_id),
                        reputation_handle: Some(handle),
                    }
                }
                None => {
                    self.stats.lock().verifications_failed += 1;
                    info!(submission_id, application_id, "Submission failed verification");
                    VerificationOutcome {
                        submission_id,
                        passed,
                        completed_bounty: None,
                        reputation_handle: None,
                    }
                }
            };

            Ok(Committed::new(outcome, events))
        })
    }

    // =========================================================================
    // REPUTATION
    // =========================================================================

    #[instrument(skip(self, value), fields(caller = %caller.short(), identity = %identity.short()))]
    pub(super) fn update_reputation_impl(
        &self,
        caller: Address,
        identity: Address,
        value: EncryptedInput,
    ) -> Result<(), BountyError> {
        self.execute(Operation::UpdateReputation, |state, now| {
            require(
                &caller,
                Operation::UpdateReputation,
                &AccessContext::board(&state.roles),
            )?;
            if identity.is_zero() {
                return Err(BountyError::invalid("identity", "zero address"));
            }
            self.check_input(&caller, &value, limits::REPUTATION_FIELDS)?;

            let EncryptedInput { values, proof } = value;
            let [score] = take_values::<1>(values)?;
            let handle = score.handle();
            let replaced = state
                .ledger
                .upsert(
                    identity,
                    ReputationRecord {
                        value: score,
                        proof,
                        updated_at: now,
                        source: ReputationSource::Verifier,
                    },
                )
                .is_some();
            debug!(replaced, "Reputation record written");
            info!(identity = %identity.short(), "Reputation updated");

            Ok(Committed::new(
                (),
                vec![BountyEvent::ReputationUpdated { identity, handle }],
            ))
        })
    }

    // =========================================================================
    // PROFILES & ROLES
    // =========================================================================

    #[instrument(skip(self, profile), fields(caller = %caller.short()))]
    pub(super) fn create_profile_impl(
        &self,
        caller: Address,
        profile: ProfileInput,
    ) -> Result<ProfileId, BountyError> {
        self.execute(Operation::CreateProfile, |state, now| {
            require(&caller, Operation::CreateProfile, &AccessContext::board(&state.roles))?;
            if state.store.profile_id(&caller).is_some() {
                return Err(BountyError::ProfileAlreadyExists(caller));
            }
            check_text("Profile hash", &profile.profile_hash, self.limits.max_text_bytes)?;
            self.check_input(&caller, &profile.encrypted, limits::PROFILE_FIELDS)?;

            let ProfileInput {
                profile_hash,
                encrypted,
            } = profile;
            let [skill] = take_values::<1>(encrypted.values)?;

            let id = state.store.insert_profile(|id| UserProfile {
                id,
                identity: caller,
                profile_hash,
                skill,
                proof: encrypted.proof,
                is_verified: false,
                created_at: now,
                updated_at: now,
            });
            info!(profile_id = id, "Profile created");

            Ok(Committed::new(
                id,
                vec![BountyEvent::ProfileCreated {
                    id,
                    identity: caller,
                }],
            ))
        })
    }

    #[instrument(skip(self, profile), fields(caller = %caller.short()))]
    pub(super) fn update_profile_impl(
        &self,
        caller: Address,
        profile: ProfileInput,
    ) -> Result<(), BountyError> {
        self.execute(Operation::UpdateProfile, |state, now| {
            let id = state
                .store
                .profile_id(&caller)
                .ok_or(BountyError::ProfileNotFound(caller))?;
            require(&caller, Operation::UpdateProfile, &AccessContext::board(&state.roles))?;
            check_text("Profile hash", &profile.profile_hash, self.limits.max_text_bytes)?;
            self.check_input(&caller, &profile.encrypted, limits::PROFILE_FIELDS)?;

            let ProfileInput {
                profile_hash,
                encrypted,
            } = profile;
            let [skill] = take_values::<1>(encrypted.values)?;

            // New content has not been vouched for.
            state.store.profiles.update(id, |p| {
                p.profile_hash = profile_hash;
                p.skill = skill;
                p.proof = encrypted.proof;
                p.is_verified = false;
                p.updated_at = now;
            })?;
            info!(profile_id = id, "Profile updated");

            Ok(Committed::new(
                (),
                vec![BountyEvent::ProfileUpdated {
                    id,
                    identity: caller,
                }],
            ))
        })
    }

    #[instrument(skip(self), fields(caller = %caller.short(), identity = %identity.short()))]
    pub(super) fn verify_user_impl(
        &self,
        caller: Address,
        identity: Address,
        verified: bool,
    ) -> Result<bool, BountyError> {
        self.execute(Operation::VerifyUser, |state, _now| {
            require(&caller, Operation::VerifyUser, &AccessContext::board(&state.roles))?;
            let profile = state
                .store
                .profile(&identity)
                .ok_or(BountyError::ProfileNotFound(identity))?;
            if profile.is_verified == verified {
                debug!(verified, "Profile verification unchanged");
                return Ok(Committed::new(false, Vec::new()));
            }
            let id = profile.id;

            state.store.profiles.update(id, |p| p.is_verified = verified)?;
            info!(profile_id = id, verified, "User verification changed");

            Ok(Committed::new(
                true,
                vec![BountyEvent::UserVerified {
                    identity,
                    verified,
                    by: caller,
                }],
            ))
        })
    }

    #[instrument(skip(self), fields(caller = %caller.short(), verifier = %verifier.short()))]
    pub(super) fn set_verifier_impl(
        &self,
        caller: Address,
        verifier: Address,
    ) -> Result<(), BountyError> {
        self.execute(Operation::SetVerifier, |state, _now| {
            require(&caller, Operation::SetVerifier, &AccessContext::board(&state.roles))?;
            if verifier.is_zero() {
                return Err(BountyError::invalid("verifier", "zero address"));
            }
            let previous = state.roles.verifier;
            state.roles.verifier = verifier;
            info!(previous = %previous, current = %verifier, "Verifier changed");

            Ok(Committed::new(
                (),
                vec![BountyEvent::VerifierChanged {
                    previous,
                    current: verifier,
                }],
            ))
        })
    }
}
