//! # Bounty Board Service
//!
//! The lifecycle engine. Implements [`BountyBoardApi`] over the entity
//! store, consulting the access policy and the outbound ports.
//!
//! ## Atomicity
//!
//! All board state sits behind one `RwLock`. A mutating operation takes the
//! write guard, runs every check (including calls to the cryptographic
//! collaborator), and only then writes. Rejected operations return before
//! the first write, so no partial state is ever visible. Events are emitted
//! after the write, in commit order, before the guard is released.
//!
//! ## Flow
//!
//! ```text
//! caller ──► BountyBoardApi ──► authorize + validate ──► EntityStore
//!                                                           │ commit
//!                                                           ▼
//!                                                       EventSink
//! ```

mod lifecycle;
mod queries;

use crate::config::{ApplicationPolicy, ConfigError, EngineConfig};
use crate::domain::access::{authorize, AccessContext, Operation, Roles};
use crate::domain::entities::{NewApplication, NewBounty, NewSubmission, ProfileInput};
use crate::domain::invariants::{
    check_application_invariant, check_bounty_invariant, PayloadLimits,
};
use crate::domain::store::{EntityStore, ReputationLedger};
use crate::domain::value_objects::{
    Address, ApplicationId, BountyId, EncryptedInput, ProfileId, SubmissionId, Timestamp,
};
use crate::errors::BountyError;
use crate::events::BountyEvent;
use crate::ports::inbound::{
    ApplicationInfo, BountyBoardApi, BountyFilter, BountyInfo, ProfileInfo, ReputationInfo,
    SubmissionInfo, VerificationOutcome,
};
use crate::ports::outbound::{ConfidentialCompute, EventSink, TimeSource};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// =============================================================================
// STATE & SNAPSHOTS
// =============================================================================

/// Everything a transition may touch.
#[derive(Debug)]
struct BoardState {
    roles: Roles,
    store: EntityStore,
    ledger: ReputationLedger,
}

/// Complete copy of board state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Owner and current verifier.
    pub roles: Roles,
    /// All entity tables.
    pub store: EntityStore,
    /// Reputation records.
    pub ledger: ReputationLedger,
    /// When the snapshot was taken.
    pub taken_at: Timestamp,
}

impl BoardSnapshot {
    /// Check every invariant a live engine maintains.
    ///
    /// # Errors
    ///
    /// Describes the first violation.
    pub fn check(&self) -> Result<(), String> {
        if self.roles.owner.is_zero() || self.roles.verifier.is_zero() {
            return Err("roles must not be the zero address".into());
        }
        self.store.check_integrity()?;
        if let Some(b) = self.store.bounties.iter().find(|b| !check_bounty_invariant(b)) {
            return Err(format!("bounty {} violates its invariants", b.id));
        }
        if let Some(a) = self
            .store
            .applications
            .iter()
            .find(|a| !check_application_invariant(a))
        {
            return Err(format!("application {} violates its invariants", a.id));
        }
        Ok(())
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Counters kept by the service.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    /// Operations that committed.
    pub operations_committed: u64,
    /// Operations rejected with an error.
    pub operations_rejected: u64,
    /// Bounties created.
    pub bounties_created: u64,
    /// Applications submitted.
    pub applications_submitted: u64,
    /// Submissions received.
    pub submissions_received: u64,
    /// Passing verdicts.
    pub verifications_passed: u64,
    /// Failing verdicts.
    pub verifications_failed: u64,
    /// Events delivered to the sink.
    pub events_emitted: u64,
    /// Events the sink rejected.
    pub event_failures: u64,
}

/// Value produced by a transition together with the events it emits.
struct Committed<T> {
    value: T,
    events: Vec<BountyEvent>,
}

impl<T> Committed<T> {
    fn new(value: T, events: Vec<BountyEvent>) -> Self {
        Self { value, events }
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// The confidential bounty lifecycle engine.
pub struct BountyBoardService {
    limits: PayloadLimits,
    policy: ApplicationPolicy,
    state: RwLock<BoardState>,
    compute: Arc<dyn ConfidentialCompute>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn TimeSource>,
    stats: Mutex<ServiceStats>,
}

impl BountyBoardService {
    /// Engine with an empty store.
    ///
    /// # Errors
    ///
    /// `ConfigError` if `config` does not validate.
    pub fn new(
        config: EngineConfig,
        compute: Arc<dyn ConfidentialCompute>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            owner = %config.roles.owner,
            verifier = %config.roles.verifier,
            "Bounty board initialized"
        );
        Ok(Self::assemble(
            &config,
            BoardState {
                roles: config.roles,
                store: EntityStore::new(),
                ledger: ReputationLedger::default(),
            },
            compute,
            sink,
            clock,
        ))
    }

    /// Engine resuming from `snapshot`.
    ///
    /// Roles come from the snapshot, since the verifier may have been
    /// reassigned after the configuration was written. Limits and policy
    /// come from `config`.
    ///
    /// # Errors
    ///
    /// `ConfigError` if `config` does not validate, or `ConfigError::Invalid`
    /// if the snapshot fails its integrity check.
    pub fn from_snapshot(
        config: EngineConfig,
        snapshot: BoardSnapshot,
        compute: Arc<dyn ConfidentialCompute>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        snapshot.check().map_err(|reason| ConfigError::Invalid {
            key: "snapshot",
            reason,
        })?;
        if snapshot.roles.owner != config.roles.owner {
            warn!(
                configured = %config.roles.owner,
                restored = %snapshot.roles.owner,
                "Snapshot owner differs from configuration; using snapshot"
            );
        }
        info!(
            bounties = snapshot.store.bounties.len(),
            applications = snapshot.store.applications.len(),
            submissions = snapshot.store.submissions.len(),
            taken_at = snapshot.taken_at,
            "Bounty board restored from snapshot"
        );
        let BoardSnapshot {
            roles,
            store,
            ledger,
            ..
        } = snapshot;
        #[cfg(feature = "metrics")]
        reset_active_bounties(&store);
        Ok(Self::assemble(
            &config,
            BoardState {
                roles,
                store,
                ledger,
            },
            compute,
            sink,
            clock,
        ))
    }

    fn assemble(
        config: &EngineConfig,
        state: BoardState,
        compute: Arc<dyn ConfidentialCompute>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            limits: config.limits,
            policy: config.applications,
            state: RwLock::new(state),
            compute,
            sink,
            clock,
            stats: Mutex::new(ServiceStats::default()),
        }
    }

    /// Copy of the full board state.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let state = self.state.read();
        BoardSnapshot {
            roles: state.roles,
            store: state.store.clone(),
            ledger: state.ledger.clone(),
            taken_at: self.clock.now(),
        }
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        self.stats.lock().clone()
    }

    /// Run one mutating operation atomically.
    ///
    /// `transition` must perform every check before its first write.
    fn execute<T>(
        &self,
        operation: Operation,
        transition: impl FnOnce(&mut BoardState, Timestamp) -> Result<Committed<T>, BountyError>,
    ) -> Result<T, BountyError> {
        #[cfg(feature = "metrics")]
        let _timer = bounty_telemetry::OperationTimer::start(operation.as_str());

        let now = self.clock.now();
        let mut state = self.state.write();

        match transition(&mut *state, now) {
            Ok(Committed { value, events }) => {
                self.stats.lock().operations_committed += 1;
                #[cfg(feature = "metrics")]
                bounty_telemetry::metrics::record_transition(operation.as_str());

                for event in &events {
                    self.emit(event);
                }
                drop(state);
                Ok(value)
            }
            Err(err) => {
                drop(state);
                warn!(
                    operation = operation.as_str(),
                    kind = err.kind().as_str(),
                    error = %err,
                    "Operation rejected"
                );
                self.stats.lock().operations_rejected += 1;
                #[cfg(feature = "metrics")]
                bounty_telemetry::metrics::record_rejection(operation.as_str(), err.kind().as_str());
                Err(err)
            }
        }
    }

    fn emit(&self, event: &BountyEvent) {
        #[cfg(feature = "metrics")]
        observe_event(event);

        match self.sink.emit(event) {
            Ok(()) => self.stats.lock().events_emitted += 1,
            Err(err) => {
                warn!(
                    topic = event.topic_name(),
                    error = %err,
                    "Event sink failed; transition stays committed"
                );
                self.stats.lock().event_failures += 1;
                #[cfg(feature = "metrics")]
                bounty_telemetry::metrics::EVENT_SINK_FAILURES.inc();
            }
        }
    }
}

/// Events only move the gauge by one, so a restored board sets it outright.
#[cfg(feature = "metrics")]
#[allow(clippy::cast_precision_loss)]
fn reset_active_bounties(store: &EntityStore) {
    let active = store.bounties.iter().filter(|b| b.is_active()).count();
    bounty_telemetry::metrics::ACTIVE_BOUNTIES.set(active as f64);
}

#[cfg(feature = "metrics")]
fn observe_event(event: &BountyEvent) {
    use bounty_telemetry::metrics::{record_verdict, ACTIVE_BOUNTIES, EVENTS_EMITTED};

    EVENTS_EMITTED.inc();
    match event {
        BountyEvent::BountyCreated { .. } => ACTIVE_BOUNTIES.inc(),
        BountyEvent::BountyPaused { .. } | BountyEvent::BountyCompleted { .. } => {
            ACTIVE_BOUNTIES.dec();
        }
        BountyEvent::SubmissionVerified { passed, .. } => record_verdict(*passed),
        _ => {}
    }
}

/// Fail with `Unauthorized` unless the policy allows `caller`.
fn require(
    caller: &Address,
    operation: Operation,
    ctx: &AccessContext<'_>,
) -> Result<(), BountyError> {
    if authorize(caller, operation, ctx) {
        Ok(())
    } else {
        Err(BountyError::Unauthorized {
            caller: *caller,
            operation: operation.as_str(),
        })
    }
}

// =============================================================================
// API
// =============================================================================

impl BountyBoardApi for BountyBoardService {
    fn create_bounty(&self, caller: Address, bounty: NewBounty) -> Result<BountyId, BountyError> {
        self.create_bounty_impl(caller, bounty)
    }

    fn submit_application(
        &self,
        caller: Address,
        application: NewApplication,
    ) -> Result<ApplicationId, BountyError> {
        self.submit_application_impl(caller, application)
    }

    fn accept_application(
        &self,
        caller: Address,
        application_id: ApplicationId,
    ) -> Result<(), BountyError> {
        self.accept_application_impl(caller, application_id)
    }

    fn submit_work(
        &self,
        caller: Address,
        submission: NewSubmission,
    ) -> Result<SubmissionId, BountyError> {
        self.submit_work_impl(caller, submission)
    }

    fn verify_submission(
        &self,
        caller: Address,
        submission_id: SubmissionId,
        passed: bool,
        feedback: Option<String>,
    ) -> Result<VerificationOutcome, BountyError> {
        self.verify_submission_impl(caller, submission_id, passed, feedback)
    }

    fn update_reputation(
        &self,
        caller: Address,
        identity: Address,
        value: EncryptedInput,
    ) -> Result<(), BountyError> {
        self.update_reputation_impl(caller, identity, value)
    }

    fn pause_bounty(&self, caller: Address, bounty_id: BountyId) -> Result<(), BountyError> {
        self.pause_bounty_impl(caller, bounty_id)
    }

    fn create_profile(
        &self,
        caller: Address,
        profile: ProfileInput,
    ) -> Result<ProfileId, BountyError> {
        self.create_profile_impl(caller, profile)
    }

    fn update_profile(&self, caller: Address, profile: ProfileInput) -> Result<(), BountyError> {
        self.update_profile_impl(caller, profile)
    }

    fn verify_user(
        &self,
        caller: Address,
        identity: Address,
        verified: bool,
    ) -> Result<bool, BountyError> {
        self.verify_user_impl(caller, identity, verified)
    }

    fn set_verifier(&self, caller: Address, verifier: Address) -> Result<(), BountyError> {
        self.set_verifier_impl(caller, verifier)
    }

    fn get_bounty_info(&self, id: BountyId) -> Result<BountyInfo, BountyError> {
        self.bounty_info(id)
    }

    fn get_application_info(&self, id: ApplicationId) -> Result<ApplicationInfo, BountyError> {
        self.application_info(id)
    }

    fn get_submission_info(&self, id: SubmissionId) -> Result<SubmissionInfo, BountyError> {
        self.submission_info(id)
    }

    fn get_user_profile(&self, identity: Address) -> Result<ProfileInfo, BountyError> {
        self.profile_info(identity)
    }

    fn get_user_reputation(&self, identity: Address) -> Option<ReputationInfo> {
        self.reputation_info(identity)
    }

    fn list_bounties(&self, filter: BountyFilter) -> Vec<BountyInfo> {
        self.bounties_matching(filter)
    }

    fn applications_for_bounty(
        &self,
        bounty_id: BountyId,
    ) -> Result<Vec<ApplicationInfo>, BountyError> {
        self.applications_of_bounty(bounty_id)
    }

    fn applications_by_applicant(&self, applicant: Address) -> Vec<ApplicationInfo> {
        self.applications_of_applicant(applicant)
    }

    fn submissions_for_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<SubmissionInfo>, BountyError> {
        self.submissions_of_application(application_id)
    }

    fn roles(&self) -> Roles {
        self.state.read().roles
    }
}
