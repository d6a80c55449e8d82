//! # Bounty Telemetry
//!
//! Logging and metrics for the confidential bounty board.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, pretty or JSON output
//! - **Metrics**: Prometheus counters and histograms in a process-wide registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bounty_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // Lifecycle operations now log and record metrics.
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CBB_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `CBB_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `CBB_LOG_SOURCE` | `false` | Include file and line |
//! | `CBB_METRICS` | `true` | Register Prometheus metrics |
//! | `CBB_SERVICE_NAME` | `confidential-bounty-board` | Service name |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics, MetricsHandle, OperationTimer};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and, when enabled, metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
///
/// # Errors
///
/// Propagates any [`TelemetryError`] from logging or metric setup.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = if config.metrics_enabled {
        Some(register_metrics()?)
    } else {
        None
    };

    init_logging(config)?;

    tracing::info!(service = %config.service_name, "Telemetry initialized");

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
        metrics,
    })
}

/// Guard that keeps telemetry active. Logs a shutdown line on drop.
pub struct TelemetryGuard {
    service_name: String,
    metrics: Option<MetricsHandle>,
}

impl TelemetryGuard {
    /// Whether metrics were registered for this process.
    #[must_use]
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
