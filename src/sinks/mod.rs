//! Verdict sinks: pluggable consumers of engine output
//!
//! Every verdict is handed unchanged to each configured sink after the
//! engine state has been updated:
//! - `JsonlVerdictLog`: append-only JSON Lines log for replay and audit
//! - `StatusPublisher`: structured `tracing` status events
//! - `AlertNotifier`: WARNING / CRITICAL alerts into a bounded outbox
//! - `InMemorySink`: captures events for tests and embedding
//!
//! Sink failures are logged and never feed back into engine state.

mod jsonl;
mod memory;
mod status;

pub use jsonl::JsonlVerdictLog;
pub use memory::InMemorySink;
pub use status::{Alert, AlertNotifier, StatusPublisher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::shutdown::ShutdownAction;
use crate::types::{HealthStatus, Verdict};

/// One verdict plus the context consumers need to act on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictEvent {
    pub asset_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<HealthStatus>,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown: Option<ShutdownAction>,
}

impl VerdictEvent {
    /// True when the status differs from the previous verdict (or is the first).
    pub fn status_changed(&self) -> bool {
        self.previous_status != Some(self.verdict.status)
    }
}

/// Sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Trait for verdict consumers
///
/// Implementations must be thread-safe (Send + Sync) so one sink set can be
/// shared by several processing loops.
pub trait VerdictSink: Send + Sync {
    /// Consume one verdict event
    fn publish(&self, event: &VerdictEvent) -> Result<(), SinkError>;

    /// Sink name for logging
    fn sink_name(&self) -> &'static str;
}

/// Ordered fan-out over several sinks.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn VerdictSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl VerdictSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn VerdictSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Publish to every sink; returns the number of sinks that failed.
    pub fn publish(&self, event: &VerdictEvent) -> usize {
        let mut failures = 0;
        for sink in &self.sinks {
            if let Err(e) = sink.publish(event) {
                failures += 1;
                warn!(
                    sink = sink.sink_name(),
                    asset = %event.asset_id,
                    error = %e,
                    "Verdict sink failed"
                );
            }
        }
        failures
    }
}

impl std::fmt::Debug for SinkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sinks.iter().map(|s| s.sink_name()))
            .finish()
    }
}
