//! Shutdown Advisor
//!
//! Consumes verdicts and recommends an automatic stop when a trip-eligible
//! cause is present and, for causes that need it, has been sustained.
//! The advisor only recommends; acting on the recommendation belongs to the
//! plant control layer.
//!
//! | Trip cause          | Recommended when                                  |
//! |---------------------|---------------------------------------------------|
//! | DEBRIS_IMPACT       | immediately                                       |
//! | CHOKED_DISCHARGE    | immediately                                       |
//! | CAVITATION          | sustain counter >= `cavitation_sustain_steps`     |
//! | OVERTEMP            | sustain counter >= `overtemp_sustain_steps`       |
//! | VIB_INTERLOCK       | smoothed vibration >= interlock ceiling           |
//!
//! Verdicts justified by model risk alone never produce a recommendation. A
//! relabelled reason still trips when a physical trip cause is set.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{EngineConfig, ShutdownConfig};
use crate::engine::EngineState;
use crate::types::{FeatureWindow, HealthStatus, TripCause, Verdict};

/// A recommended stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutdownAction {
    pub trip_cause: TripCause,
    /// Consecutive CRITICAL invocations behind the recommendation (1 when immediate)
    pub sustained_steps: u32,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ShutdownAdvisor {
    config: ShutdownConfig,
    interlock_mm_s: f64,
}

impl ShutdownAdvisor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.shutdown.clone(),
            interlock_mm_s: config.thresholds.vibration.interlock_mm_s,
        }
    }

    /// Map a verdict to an optional stop recommendation.
    ///
    /// `state` is the state returned together with `verdict`, so its sustain
    /// counters already include this invocation.
    pub fn advise(
        &self,
        verdict: &Verdict,
        state: &EngineState,
        window: &FeatureWindow,
    ) -> Option<ShutdownAction> {
        if verdict.status != HealthStatus::Critical || verdict.is_model_only() {
            return None;
        }

        let action = match verdict.trip_cause {
            Some(cause @ (TripCause::DebrisImpact | TripCause::ChokedDischarge)) => {
                Some(self.action(cause, 1))
            }
            Some(TripCause::Cavitation)
                if state.cavitation_sustain_steps >= self.config.cavitation_sustain_steps =>
            {
                Some(self.action(TripCause::Cavitation, state.cavitation_sustain_steps))
            }
            Some(TripCause::Overtemp)
                if state.overtemp_sustain_steps >= self.config.overtemp_sustain_steps =>
            {
                Some(self.action(TripCause::Overtemp, state.overtemp_sustain_steps))
            }
            _ => None,
        };

        let action = action.or_else(|| {
            let interlock = window.smoothed.vib_rms >= self.interlock_mm_s
                && (verdict.reason.cause.is_vibration()
                    || verdict.trip_cause == Some(TripCause::VibrationInterlock));
            interlock.then(|| self.action(TripCause::VibrationInterlock, 1))
        });

        if let Some(ref a) = action {
            warn!(
                trip_cause = %a.trip_cause,
                sustained = a.sustained_steps,
                reason = %verdict.reason.cause,
                "Shutdown recommended"
            );
        }
        action
    }

    fn action(&self, trip_cause: TripCause, sustained_steps: u32) -> ShutdownAction {
        let message = match trip_cause {
            TripCause::DebrisImpact => "Stop pump: debris impact, inspect before restart",
            TripCause::ChokedDischarge => "Stop pump: discharge choked, overheat risk",
            TripCause::Cavitation => "Stop pump: sustained cavitation",
            TripCause::Overtemp => "Stop pump: sustained overtemperature",
            TripCause::VibrationInterlock => "Stop pump: vibration interlock",
        };
        ShutdownAction {
            trip_cause,
            sustained_steps,
            message: message.to_string(),
        }
    }
}
