//! Per-asset engine state threaded through every invocation

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{Cause, FeatureSample, HealthStatus};

/// Causes with a hold condition in the hysteresis layer.
const LATCHING_CAUSES: [Cause; 6] = [
    Cause::DebrisImpact,
    Cause::Cavitation,
    Cause::Maintenance,
    Cause::VibrationZoneC,
    Cause::VibrationZoneD,
    Cause::VibrationInterlock,
];

/// Everything the engine remembers between two invocations for one asset.
///
/// Owned exclusively by the caller and passed by value into
/// [`HealthEngine::evaluate`](super::HealthEngine::evaluate), which hands back
/// the successor. Serializable so a monitor can persist and restore it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Status of the previous verdict (`None` before the first one)
    pub previous_status: Option<HealthStatus>,
    /// Reason cause of the previous verdict
    pub previous_reason: Option<Cause>,
    /// Every cause that fired (entry or hold) on the previous verdict
    pub previous_causes: Vec<Cause>,
    /// Asymmetric EMA of the instant risk (`None` until first seen)
    pub smoothed_risk: Option<f64>,
    /// Recent EMA values, oldest first
    pub risk_history: VecDeque<f64>,
    /// Recent raw feature samples, oldest first
    pub feature_history: VecDeque<FeatureSample>,
    /// Consecutive invocations below the zone D exit while zone D is latched
    pub critical_low_vib_steps: u32,
    /// Consecutive CRITICAL verdicts with trip cause CAVITATION
    pub cavitation_sustain_steps: u32,
    /// Consecutive CRITICAL verdicts with trip cause OVERTEMP
    pub overtemp_sustain_steps: u32,
    /// Completed invocations
    pub invocations: u64,
}

impl EngineState {
    /// Previous status, HEALTHY before the first verdict.
    pub fn last_status(&self) -> HealthStatus {
        self.previous_status.unwrap_or_default()
    }

    /// True when `cause` fired on the previous verdict.
    pub fn was_active(&self, cause: Cause) -> bool {
        self.previous_causes.contains(&cause)
    }

    /// True while a physical cause from the previous verdict is latched by a
    /// deadband or the zone D dwell is counting.
    pub fn hold_latched(&self) -> bool {
        self.critical_low_vib_steps > 0 || LATCHING_CAUSES.iter().any(|&c| self.was_active(c))
    }

    /// Clear risk smoothing and the verdict memory after a nominal recovery.
    ///
    /// Sustain counters and the invocation count survive; the former reset on
    /// their own once the next verdict is no longer CRITICAL.
    pub fn clear_smoothing(&mut self) {
        self.smoothed_risk = None;
        self.risk_history.clear();
        self.feature_history.clear();
        self.previous_status = None;
        self.previous_reason = None;
        self.previous_causes.clear();
        self.critical_low_vib_steps = 0;
    }
}
