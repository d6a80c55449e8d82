//! # Bounty Node
//!
//! Runs the confidential bounty board over a JSON-lines command stream.
//!
//! ```text
//! CBB_OWNER=0x.. CBB_VERIFIER=0x.. bounty-node run --input commands.jsonl --snapshot board.snap
//! ```
//!
//! Results go to stdout, one JSON object per command; logs go to stderr.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bounty_lifecycle::config::EngineConfig;
use bounty_node::{spawn_event_logger, Node};
use bounty_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

/// Confidential bounty board node
#[derive(Parser, Debug)]
#[command(name = "bounty-node", version)]
#[command(about = "Confidential bounty board over JSON-lines commands")]
struct Args {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Apply commands and print one JSON result per line
    Run {
        /// Command file (defaults to stdin)
        #[arg(short, long, env = "CBB_INPUT")]
        input: Option<PathBuf>,

        /// Snapshot file loaded before and saved after the run
        #[arg(short, long, env = "CBB_SNAPSHOT")]
        snapshot: Option<PathBuf>,

        /// Write Prometheus metrics here when the run ends
        #[arg(long, env = "CBB_METRICS_OUT")]
        metrics_out: Option<PathBuf>,
    },
    /// Validate configuration and print it as JSON
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let telemetry = init_telemetry(&TelemetryConfig::from_env())?;
    let config = EngineConfig::from_env().context("Invalid engine configuration")?;

    match args.command {
        Mode::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Mode::Run {
            input,
            snapshot,
            metrics_out,
        } => {
            info!("===========================================");
            info!("  Confidential Bounty Board v{}", bounty_lifecycle::VERSION);
            info!("===========================================");

            let node = Arc::new(Node::build(config, snapshot)?);
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let logger = spawn_event_logger(&node.bus(), shutdown_rx);

            // Stdin and file reads block; keep them off the runtime workers.
            let worker = Arc::clone(&node);
            let summary = tokio::task::spawn_blocking(move || {
                let stdout = io::stdout().lock();
                match input {
                    Some(path) => {
                        let file = File::open(&path)
                            .with_context(|| format!("Failed to open {}", path.display()))?;
                        worker.process(BufReader::new(file), stdout)
                    }
                    None => worker.process(io::stdin().lock(), stdout),
                }
            })
            .await
            .context("Command worker panicked")??;

            node.persist()?;
            let _ = shutdown_tx.send(true);
            let logged = logger.await.unwrap_or_default();

            if let Some(path) = metrics_out {
                if telemetry.metrics_enabled() {
                    std::fs::write(&path, encode_metrics()?)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
            }

            let stats = node.board().stats();
            info!(
                commands = summary.commands,
                failures = summary.failures,
                committed = stats.operations_committed,
                rejected = stats.operations_rejected,
                events = logged,
                "Run complete"
            );
            Ok(())
        }
    }
}
