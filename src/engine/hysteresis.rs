//! Hysteresis Layer
//!
//! Per-cause hold conditions. Every hold is keyed on the causes that fired on
//! the previous verdict rather than on its reason, so a relabelled reason
//! (interlock, normalizer) never breaks a latch.
//!
//! | Cause        | Latched while                                            |
//! |--------------|----------------------------------------------------------|
//! | Debris       | vibration still in zone D                                |
//! | Cavitation   | both pressures at/below exit, vibration and current high |
//! | Degradation  | any current or pressure view at/below its exit           |
//! | Zone C       | previous WARNING and vibration at/above the zone C exit  |
//! | Zone D       | dwell counter below N while vibration stays low          |
//! | Model risk   | previous model WARNING and smoothed risk at/above hold   |

use super::EngineState;
use crate::config::{EngineConfig, ProbabilityConfig, VibrationThresholds};
use crate::types::{Cause, FeatureWindow, HealthStatus};

/// Result of the zone D dwell evaluation for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellOutcome {
    /// Zone D stays asserted without a fresh entry
    pub hold: bool,
    /// Successor value of `EngineState::critical_low_vib_steps`
    pub low_vib_steps: u32,
}

/// Zone D dwell: once latched, zone D releases only after N consecutive
/// invocations with vibration below the dwell reset level.
///
/// A fresh zone D entry resets the counter, as does any invocation where the
/// latch is not set.
pub fn zone_d_dwell(
    window: &FeatureWindow,
    state: &EngineState,
    vib: &VibrationThresholds,
) -> DwellOutcome {
    let peak = window.peak_vib();
    let latched = state.last_status() == HealthStatus::Critical
        && (state.was_active(Cause::VibrationZoneD) || state.was_active(Cause::VibrationInterlock));

    if peak >= vib.zone_d_mm_s || !latched {
        return DwellOutcome { hold: false, low_vib_steps: 0 };
    }
    if peak >= vib.zone_d_exit_mm_s {
        return DwellOutcome { hold: true, low_vib_steps: 0 };
    }

    let steps = state.critical_low_vib_steps.saturating_add(1);
    if steps < vib.zone_d_dwell_steps {
        DwellOutcome { hold: true, low_vib_steps: steps }
    } else {
        DwellOutcome { hold: false, low_vib_steps: 0 }
    }
}

/// Zone C deadband between the exit and entry levels.
pub fn zone_c_hold(window: &FeatureWindow, state: &EngineState, vib: &VibrationThresholds) -> bool {
    state.last_status() == HealthStatus::Warning
        && state.was_active(Cause::VibrationZoneC)
        && window.peak_vib() >= vib.zone_c_exit_mm_s
}

/// Debris stays asserted while vibration remains in zone D.
pub fn debris_hold(window: &FeatureWindow, state: &EngineState, config: &EngineConfig) -> bool {
    state.was_active(Cause::DebrisImpact)
        && window.peak_vib() >= config.thresholds.vibration.zone_d_mm_s
}

/// Cavitation releases as soon as pressure recovers on either view.
pub fn cavitation_hold(window: &FeatureWindow, state: &EngineState, config: &EngineConfig) -> bool {
    let cav = &config.thresholds.cavitation;
    state.was_active(Cause::Cavitation)
        && window.smoothed.pressure <= cav.pressure_exit_bar
        && window.latest.pressure <= cav.pressure_exit_bar
        && window.peak_vib() >= cav.vibration_min_mm_s
        && window.peak_current() >= cav.current_min_amp
}

/// Degradation exit requires current and pressure above their exits on both views.
pub fn degradation_hold(window: &FeatureWindow, state: &EngineState, config: &EngineConfig) -> bool {
    let deg = &config.thresholds.degradation;
    state.was_active(Cause::Maintenance)
        && (window.smoothed.current <= deg.current_exit_amp
            || window.smoothed.pressure <= deg.pressure_exit_bar
            || window.latest.current <= deg.current_exit_amp
            || window.latest.pressure <= deg.pressure_exit_bar)
}

/// Model-risk hold: a model-only WARNING stays WARNING until the smoothed
/// risk drops below the hold threshold.
pub fn risk_hold(
    state: &EngineState,
    status: HealthStatus,
    smoothed_prob: f64,
    probability: &ProbabilityConfig,
) -> bool {
    status == HealthStatus::Healthy
        && state.last_status() == HealthStatus::Warning
        && state.previous_reason == Some(Cause::ElevatedRisk)
        && smoothed_prob >= probability.risk_hold_threshold
}
