//! Structured logging setup.
//!
//! Log lines carry a consistent set of fields so they can be shipped to a
//! log aggregator without post-processing:
//! - `timestamp`, `level`, `target`
//! - `service`: the configured service name (on the root span)
//! - span fields from `#[instrument]` (entity ids, caller)
//!
//! Logs go to stderr; stdout is reserved for command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::Filter` for an unparsable filter directive and
/// `TelemetryError::SubscriberInit` if a global subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_file(config.with_source_location)
                    .with_line_number(config.with_source_location),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(config.with_source_location)
                    .with_line_number(config.with_source_location),
            )
            .try_init()
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Structured logging configured"
    );
    Ok(())
}

/// Emit a lifecycle log line with the standard `entity`/`id` fields.
///
/// ```rust,ignore
/// log_event!(info, "bounty", 7, "Bounty created", creator = %addr);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:ident, $entity:expr, $id:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            entity = $entity,
            id = $id,
            $($($field)*,)?
            $msg
        )
    };
}
