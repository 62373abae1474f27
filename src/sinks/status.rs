//! Status publisher and alert notifier
//!
//! Both are transport-free: the publisher emits structured `tracing` events
//! (a log shipper or subscriber layer forwards them), the notifier queues
//! alerts in a bounded outbox that an outbound transport drains.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{SinkError, VerdictEvent, VerdictSink};
use crate::types::{Cause, HealthStatus, TripCause};

// ============================================================================
// Status Publisher
// ============================================================================

/// Emits one `tracing` event per status change (or per verdict when
/// `every_verdict` is set) under the `pump_status` target.
#[derive(Debug, Clone, Default)]
pub struct StatusPublisher {
    every_verdict: bool,
}

impl StatusPublisher {
    pub fn new(every_verdict: bool) -> Self {
        Self { every_verdict }
    }
}

impl VerdictSink for StatusPublisher {
    fn publish(&self, event: &VerdictEvent) -> Result<(), SinkError> {
        if !self.every_verdict && !event.status_changed() {
            return Ok(());
        }
        let v = &event.verdict;
        info!(
            target: "pump_status",
            asset = %event.asset_id,
            status = %v.status,
            reason = %v.reason.cause,
            display_probability = v.display_probability,
            trip_cause = ?v.trip_cause,
            invocation = v.invocation,
            "{}",
            v.reason
        );
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "status-publisher"
    }
}

// ============================================================================
// Alert Notifier
// ============================================================================

/// Alert queued for an outbound transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub asset_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: HealthStatus,
    pub cause: Cause,
    pub message: String,
    pub display_probability: f64,
    pub trip_cause: Option<TripCause>,
    pub shutdown_recommended: bool,
}

/// Queues an alert when a verdict enters WARNING or CRITICAL, when the
/// reason changes while alerting, or when a stop is recommended.
#[derive(Debug, Clone)]
pub struct AlertNotifier {
    outbox: Arc<Mutex<VecDeque<Alert>>>,
    last_cause: Arc<Mutex<std::collections::HashMap<String, Cause>>>,
    capacity: usize,
}

impl AlertNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            outbox: Arc::new(Mutex::new(VecDeque::new())),
            last_cause: Arc::new(Mutex::new(std::collections::HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Remove and return every queued alert, oldest first.
    pub fn drain(&self) -> Vec<Alert> {
        self.outbox
            .lock()
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn pending(&self) -> usize {
        self.outbox.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl VerdictSink for AlertNotifier {
    fn publish(&self, event: &VerdictEvent) -> Result<(), SinkError> {
        let v = &event.verdict;
        let poisoned = || SinkError::Unavailable("alert notifier lock poisoned".to_string());

        let cause_changed = {
            let mut last = self.last_cause.lock().map_err(|_| poisoned())?;
            if v.status.is_alert() {
                last.insert(event.asset_id.clone(), v.reason.cause) != Some(v.reason.cause)
            } else {
                last.remove(&event.asset_id);
                false
            }
        };

        if !v.status.is_alert() {
            return Ok(());
        }
        let escalated = event.previous_status.map_or(true, |prev| v.status > prev);
        if !(escalated || cause_changed || event.shutdown.is_some()) {
            return Ok(());
        }

        let alert = Alert {
            asset_id: event.asset_id.clone(),
            timestamp: event.timestamp,
            status: v.status,
            cause: v.reason.cause,
            message: v.reason.to_string(),
            display_probability: v.display_probability,
            trip_cause: v.trip_cause,
            shutdown_recommended: event.shutdown.is_some(),
        };
        warn!(
            asset = %alert.asset_id,
            status = %alert.status,
            cause = %alert.cause,
            shutdown = alert.shutdown_recommended,
            "Alert queued"
        );

        let mut outbox = self.outbox.lock().map_err(|_| poisoned())?;
        if outbox.len() >= self.capacity {
            outbox.pop_front();
        }
        outbox.push_back(alert);
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "alert-notifier"
    }
}
