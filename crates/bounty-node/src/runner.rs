//! # Node Runner
//!
//! Wires one engine to the shared bus and an optional snapshot file, then
//! feeds it a command stream.
//!
//! ## Startup Sequence
//!
//! 1. Load engine configuration from the environment
//! 2. Restore from the snapshot file if one exists
//! 3. Start the event logger on the bus
//! 4. Apply commands, one JSON result line each
//! 5. Save the snapshot and stop the logger

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bounty_lifecycle::prelude::*;
use bounty_telemetry::log_event;
use shared_bus::{EventFilter, InMemoryEventBus, Subscription};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands::{Command, Response};

/// Totals for one command stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands read (blank and comment lines excluded).
    pub commands: usize,
    /// Commands that failed to parse or were rejected.
    pub failures: usize,
}

/// A running board.
pub struct Node {
    board: BountyBoardService,
    bus: Arc<InMemoryEventBus<BountyEvent>>,
    snapshots: Option<FileSnapshotStore>,
}

impl Node {
    /// Build a node, restoring from `snapshot` when the file exists.
    ///
    /// # Errors
    ///
    /// Invalid configuration, or an unreadable or corrupt snapshot.
    pub fn build(config: EngineConfig, snapshot: Option<PathBuf>) -> Result<Self> {
        let bus: Arc<InMemoryEventBus<BountyEvent>> = Arc::new(InMemoryEventBus::new());
        let sink = Arc::new(BusEventSink::new(bus.clone()));
        let compute = Arc::new(HashBindingCompute);
        let clock = Arc::new(SystemTimeSource);
        let snapshots = snapshot.map(FileSnapshotStore::new);

        let restored = match &snapshots {
            Some(store) => store
                .load()
                .with_context(|| format!("Failed to load snapshot {}", store.path().display()))?,
            None => None,
        };

        let board = match restored {
            Some(snapshot) => {
                BountyBoardService::from_snapshot(config, snapshot, compute, sink, clock)
                    .context("Snapshot rejected")?
            }
            None => BountyBoardService::new(config, compute, sink, clock)
                .context("Invalid engine configuration")?,
        };

        Ok(Self {
            board,
            bus,
            snapshots,
        })
    }

    /// The engine.
    #[must_use]
    pub fn board(&self) -> &BountyBoardService {
        &self.board
    }

    /// The bus lifecycle events are published on.
    #[must_use]
    pub fn bus(&self) -> Arc<InMemoryEventBus<BountyEvent>> {
        Arc::clone(&self.bus)
    }

    /// Apply one input line. Blank lines and `#` comments yield nothing.
    #[must_use]
    pub fn handle_line(&self, line_no: usize, line: &str) -> Option<Response> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let command: Command = match serde_json::from_str(trimmed) {
            Ok(command) => command,
            Err(e) => {
                warn!(line = line_no, error = %e, "Unparsable command");
                return Some(Response::unparsable(line_no, e.to_string()));
            }
        };

        let op = command.name();
        debug!(line = line_no, op, "Applying command");
        Some(match command.apply(&self.board) {
            Ok(result) => Response::success(line_no, op, result),
            Err(err) => Response::rejected(line_no, op, &err),
        })
    }

    /// Apply every line of `input`, writing one JSON response per command.
    ///
    /// # Errors
    ///
    /// I/O failures on either stream.
    pub fn process<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for (index, line) in input.lines().enumerate() {
            let line = line.context("Failed to read command")?;
            let Some(response) = self.handle_line(index + 1, &line) else {
                continue;
            };
            summary.commands += 1;
            if !response.ok {
                summary.failures += 1;
            }
            serde_json::to_writer(&mut output, &response)?;
            writeln!(output)?;
        }
        output.flush()?;
        info!(
            commands = summary.commands,
            failures = summary.failures,
            "Command stream finished"
        );
        Ok(summary)
    }

    /// Save state to the snapshot file, if one is configured.
    ///
    /// # Errors
    ///
    /// Encoding or I/O failure.
    pub fn persist(&self) -> Result<()> {
        if let Some(store) = &self.snapshots {
            store
                .save(&self.board.snapshot())
                .with_context(|| format!("Failed to save snapshot {}", store.path().display()))?;
        }
        Ok(())
    }
}

// =============================================================================
// EVENT LOGGER
// =============================================================================

/// Log every lifecycle event until `shutdown` flips, then drain what is
/// left. Resolves to the number of events logged.
pub fn spawn_event_logger(
    bus: &InMemoryEventBus<BountyEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<u64> {
    let mut subscription = bus.subscribe(EventFilter::all());
    tokio::spawn(async move {
        let mut logged = 0u64;
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => {
                        log_lifecycle_event(&event);
                        logged += 1;
                    }
                    None => break,
                },
                _ = shutdown.changed() => {
                    logged += drain(&mut subscription);
                    break;
                }
            }
        }
        if subscription.lagged() > 0 {
            warn!(lagged = subscription.lagged(), "Event logger fell behind");
        }
        logged
    })
}

fn drain(subscription: &mut Subscription<BountyEvent>) -> u64 {
    let mut count = 0;
    for event in subscription.drain() {
        log_lifecycle_event(&event);
        count += 1;
    }
    count
}

fn log_lifecycle_event(event: &BountyEvent) {
    match event {
        BountyEvent::BountyCreated { id, creator, title } => {
            log_event!(info, "bounty", *id, "Bounty created", creator = %creator, title = %title);
        }
        BountyEvent::BountyPaused { id, by } => {
            log_event!(info, "bounty", *id, "Bounty paused", by = %by);
        }
        BountyEvent::BountyCompleted {
            bounty_id,
            applicant,
            reward_handle,
        } => {
            log_event!(info, "bounty", *bounty_id, "Bounty completed", applicant = %applicant, reward = %reward_handle);
        }
        BountyEvent::ApplicationSubmitted {
            id,
            bounty_id,
            applicant,
        } => {
            log_event!(info, "application", *id, "Application submitted", bounty_id = *bounty_id, applicant = %applicant);
        }
        BountyEvent::ApplicationAccepted { id, applicant } => {
            log_event!(info, "application", *id, "Application accepted", applicant = %applicant);
        }
        BountyEvent::SubmissionSubmitted {
            id,
            application_id,
            submitter,
        } => {
            log_event!(info, "submission", *id, "Work submitted", application_id = *application_id, submitter = %submitter);
        }
        BountyEvent::SubmissionVerified { id, passed } => {
            log_event!(info, "submission", *id, "Submission verified", passed = *passed);
        }
        BountyEvent::ProfileCreated { id, identity } => {
            log_event!(info, "profile", *id, "Profile created", identity = %identity);
        }
        BountyEvent::ProfileUpdated { id, identity } => {
            log_event!(info, "profile", *id, "Profile updated", identity = %identity);
        }
        other => {
            // Identity-keyed events carry no numeric id.
            info!(topic = other.topic_name(), event = ?other, "Lifecycle event");
        }
    }
}
