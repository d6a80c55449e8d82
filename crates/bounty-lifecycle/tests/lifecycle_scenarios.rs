//! # Lifecycle Scenario Tests
//!
//! End-to-end runs through the public API, wired the way a node wires the
//! engine: hash-binding proofs, a manual clock, and events delivered over
//! the shared bus.
//!
//! ## Coverage
//!
//! 1. Happy path from bounty to completion and reputation
//! 2. Authorization failures leave records untouched
//! 3. Duplicate profile registration
//! 4. Bus ordering and topic filtering
//! 5. Snapshot persistence and restore

use std::sync::Arc;
use std::time::Duration;

use bounty_lifecycle::prelude::*;
use shared_bus::{EventFilter, InMemoryEventBus};
use tokio::time::timeout;

const OWNER: Address = Address::new([0xA0; 20]);
const VERIFIER: Address = Address::new([0xB0; 20]);
const CREATOR: Address = Address::new([0xC0; 20]);
const APPLICANT: Address = Address::new([0xD0; 20]);
const OUTSIDER: Address = Address::new([0xE0; 20]);

const NOW: Timestamp = 1_750_000_000;
const DAY: Timestamp = 86_400;

fn sealed(who: &Address, values: &[&[u8]]) -> EncryptedInput {
    HashBindingCompute::seal(
        who,
        values.iter().map(|v| EncryptedValue::new(v.to_vec())).collect(),
    )
}

fn board_with_sink(sink: Arc<dyn EventSink>) -> (BountyBoardService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW));
    let board = BountyBoardService::new(
        EngineConfig::new(OWNER, VERIFIER),
        Arc::new(HashBindingCompute),
        sink,
        clock.clone(),
    )
    .expect("valid config");
    (board, clock)
}

fn audit_bounty() -> NewBounty {
    NewBounty {
        title: "Audit".into(),
        description: "Audit the escrow contract".into(),
        requirements: "Findings report".into(),
        deadline: NOW + DAY,
        difficulty: 6,
        category: 5,
        reward: sealed(&CREATOR, &[b"enc:reward"]),
    }
}

fn application(bounty_id: BountyId) -> NewApplication {
    NewApplication {
        bounty_id,
        proposal: "I have audited three escrow designs".into(),
        encrypted: sealed(&APPLICANT, &[b"enc:exp", b"enc:eta"]),
    }
}

fn work(application_id: ApplicationId) -> NewSubmission {
    NewSubmission {
        application_id,
        submission_hash: "hash123".into(),
        encrypted: sealed(&APPLICANT, &[b"enc:quality"]),
    }
}

#[test]
fn test_scenario_bounty_to_completion() {
    let sink = Arc::new(RecordingSink::new());
    let (board, _clock) = board_with_sink(sink.clone());

    let bounty = board.create_bounty(CREATOR, audit_bounty()).unwrap();
    assert_eq!(bounty, 0);
    assert!(board.get_bounty_info(bounty).unwrap().is_active);

    let app = board.submit_application(APPLICANT, application(bounty)).unwrap();
    assert_eq!(app, 0);

    board.accept_application(CREATOR, app).unwrap();
    assert!(board.get_application_info(app).unwrap().is_accepted);

    let sub = board.submit_work(APPLICANT, work(app)).unwrap();
    assert_eq!(sub, 0);

    board.verify_submission(VERIFIER, sub, true, None).unwrap();

    assert_eq!(
        board.get_submission_info(sub).unwrap().status,
        SubmissionStatus::VerifiedPass
    );
    assert!(board.get_application_info(app).unwrap().is_completed);
    let info = board.get_bounty_info(bounty).unwrap();
    assert!(info.is_completed);
    assert!(!info.is_active);

    let events = sink.events();
    assert_eq!(
        events[0],
        BountyEvent::BountyCreated {
            id: 0,
            creator: CREATOR,
            title: "Audit".into()
        }
    );
    assert_eq!(
        events[1],
        BountyEvent::ApplicationSubmitted {
            id: 0,
            bounty_id: 0,
            applicant: APPLICANT
        }
    );
    assert!(events.contains(&BountyEvent::BountyCompleted {
        bounty_id: 0,
        applicant: APPLICANT,
        reward_handle: info.reward_handle,
    }));
}

#[test]
fn test_scenario_non_verifier_cannot_verify() {
    let (board, _clock) = board_with_sink(Arc::new(NoOpSink));
    let bounty = board.create_bounty(CREATOR, audit_bounty()).unwrap();
    let app = board.submit_application(APPLICANT, application(bounty)).unwrap();
    board.accept_application(CREATOR, app).unwrap();
    let sub = board.submit_work(APPLICANT, work(app)).unwrap();

    let err = board
        .verify_submission(OUTSIDER, sub, true, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(
        board.get_submission_info(sub).unwrap().status,
        SubmissionStatus::Pending
    );

    let err = board
        .update_reputation(OUTSIDER, APPLICANT, sealed(&OUTSIDER, &[b"enc:rep"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(board.get_user_reputation(APPLICANT).is_none());
}

#[test]
fn test_scenario_duplicate_profile() {
    let (board, _clock) = board_with_sink(Arc::new(NoOpSink));
    let input = |who: &Address| ProfileInput {
        profile_hash: "ipfs://profile".into(),
        encrypted: sealed(who, &[b"Rust"]),
    };

    board.create_profile(OUTSIDER, input(&OUTSIDER)).unwrap();
    let err = board.create_profile(OUTSIDER, input(&OUTSIDER)).unwrap_err();
    assert_eq!(err.to_string(), "Profile already exists");
    assert_eq!(err.kind(), ErrorKind::AlreadyFinalized);
}

#[test]
fn test_round_trip_of_bounty_fields() {
    let (board, _clock) = board_with_sink(Arc::new(NoOpSink));
    let supplied = audit_bounty();
    let id = board.create_bounty(CREATOR, supplied.clone()).unwrap();

    let info = board.get_bounty_info(id).unwrap();
    assert_eq!(info.title, supplied.title);
    assert_eq!(info.description, supplied.description);
    assert_eq!(info.requirements, supplied.requirements);
    assert_eq!(info.difficulty, supplied.difficulty);
    assert_eq!(u8::from(info.category), supplied.category);
    assert_eq!(info.creator, CREATOR);
    assert_eq!(info.deadline, supplied.deadline);
    assert!(info.deadline > info.created_at);
    assert_eq!(info.reward_handle, supplied.reward.values[0].handle());
}

#[test]
fn test_deadline_boundary() {
    let (board, clock) = board_with_sink(Arc::new(NoOpSink));
    let mut bounty = audit_bounty();
    bounty.deadline = NOW;
    assert_eq!(
        board.create_bounty(CREATOR, bounty).unwrap_err().kind(),
        ErrorKind::DeadlineInPast
    );

    let id = board.create_bounty(CREATOR, audit_bounty()).unwrap();
    assert_eq!(id, 0);
    clock.advance(DAY - 1);
    assert!(board.submit_application(APPLICANT, application(id)).is_ok());
    clock.advance(1);
    assert!(board.submit_application(APPLICANT, application(id)).is_err());
}

#[tokio::test]
async fn test_events_reach_bus_in_commit_order() {
    // Arrange: subscribe before any transition
    let bus = Arc::new(InMemoryEventBus::<BountyEvent>::new());
    let mut all = bus.subscribe(EventFilter::all());
    let mut completions = bus.subscribe(EventFilter::topics([topics::BOUNTY_COMPLETED]));
    let (board, _clock) = board_with_sink(Arc::new(BusEventSink::new(bus.clone())));

    // Act
    let bounty = board.create_bounty(CREATOR, audit_bounty()).unwrap();
    let app = board.submit_application(APPLICANT, application(bounty)).unwrap();
    board.accept_application(CREATOR, app).unwrap();
    let sub = board.submit_work(APPLICANT, work(app)).unwrap();
    board.verify_submission(VERIFIER, sub, true, None).unwrap();

    // Assert
    let mut topics_seen = Vec::new();
    for _ in 0..7 {
        let event = timeout(Duration::from_millis(100), all.recv())
            .await
            .expect("Should receive within timeout")
            .expect("Should have event");
        topics_seen.push(event.topic_name());
    }
    assert_eq!(
        topics_seen,
        vec![
            topics::BOUNTY_CREATED,
            topics::APPLICATION_SUBMITTED,
            topics::APPLICATION_ACCEPTED,
            topics::SUBMISSION_SUBMITTED,
            topics::SUBMISSION_VERIFIED,
            topics::BOUNTY_COMPLETED,
            topics::REPUTATION_UPDATED,
        ]
    );

    let completed = timeout(Duration::from_millis(100), completions.recv())
        .await
        .expect("Should receive within timeout")
        .expect("Should have event");
    assert!(matches!(
        completed,
        BountyEvent::BountyCompleted { bounty_id: 0, .. }
    ));
    assert!(completions.drain().is_empty());
}

#[tokio::test]
async fn test_rejected_operation_publishes_nothing() {
    let bus = Arc::new(InMemoryEventBus::<BountyEvent>::new());
    let mut subscription = bus.subscribe(EventFilter::all());
    let (board, _clock) = board_with_sink(Arc::new(BusEventSink::new(bus.clone())));

    let mut bounty = audit_bounty();
    bounty.title = String::new();
    assert!(board.create_bounty(CREATOR, bounty).is_err());

    let nothing = timeout(Duration::from_millis(50), subscription.recv()).await;
    assert!(nothing.is_err(), "no event expected for a rejected operation");
}

#[test]
fn test_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path().join("board.snap"));

    let (board, clock) = board_with_sink(Arc::new(NoOpSink));
    let bounty = board.create_bounty(CREATOR, audit_bounty()).unwrap();
    let app = board.submit_application(APPLICANT, application(bounty)).unwrap();
    board.accept_application(CREATOR, app).unwrap();
    store.save(&board.snapshot()).unwrap();
    drop(board);

    let snapshot = store.load().unwrap().expect("snapshot written");
    let restored = BountyBoardService::from_snapshot(
        EngineConfig::new(OWNER, VERIFIER),
        snapshot,
        Arc::new(HashBindingCompute),
        Arc::new(NoOpSink),
        clock,
    )
    .unwrap();

    assert!(restored.get_application_info(app).unwrap().is_accepted);
    let sub = restored.submit_work(APPLICANT, work(app)).unwrap();
    let outcome = restored.verify_submission(VERIFIER, sub, true, None).unwrap();
    assert_eq!(outcome.completed_bounty, Some(bounty));
    assert_eq!(restored.create_bounty(CREATOR, audit_bounty()), Ok(1));
}
