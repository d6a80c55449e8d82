//! # Active Bounties Gauge
//!
//! Runs in its own process so no other test moves the global gauge.

#![cfg(feature = "metrics")]

use std::sync::Arc;

use bounty_lifecycle::prelude::*;
use bounty_telemetry::metrics::ACTIVE_BOUNTIES;

const OWNER: Address = Address::new([0xA0; 20]);
const VERIFIER: Address = Address::new([0xB0; 20]);
const CREATOR: Address = Address::new([0xC0; 20]);

const NOW: Timestamp = 1_750_000_000;

fn bounty(title: &str) -> NewBounty {
    NewBounty {
        title: title.into(),
        description: "Review the vault".into(),
        requirements: "Report".into(),
        deadline: NOW + 86_400,
        difficulty: 4,
        category: 0,
        reward: HashBindingCompute::seal(&CREATOR, vec![EncryptedValue::new(b"reward".to_vec())]),
    }
}

#[test]
fn test_restore_sets_gauge_from_store() {
    // Arrange: two bounties, one paused, captured in a snapshot.
    let clock = Arc::new(ManualClock::new(NOW));
    let config = EngineConfig::new(OWNER, VERIFIER);
    let board = BountyBoardService::new(
        config.clone(),
        Arc::new(HashBindingCompute),
        Arc::new(NoOpSink),
        clock.clone(),
    )
    .unwrap();
    let first = board.create_bounty(CREATOR, bounty("First")).unwrap();
    let second = board.create_bounty(CREATOR, bounty("Second")).unwrap();
    board.pause_bounty(CREATOR, first).unwrap();
    let snapshot = board.snapshot();
    drop(board);

    // A new process starts with the gauge at zero.
    ACTIVE_BOUNTIES.set(0.0);

    // Act
    let restored = BountyBoardService::from_snapshot(
        config,
        snapshot,
        Arc::new(HashBindingCompute),
        Arc::new(NoOpSink),
        clock,
    )
    .unwrap();

    // Assert
    assert_eq!(ACTIVE_BOUNTIES.get(), 1.0);
    restored.pause_bounty(CREATOR, second).unwrap();
    assert_eq!(ACTIVE_BOUNTIES.get(), 0.0);
}
