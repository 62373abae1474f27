//! Smoothing Stage
//!
//! Two rolling views feed the cascade:
//! - the feature history (depth K) whose field-wise mean is the smoothed sample
//! - the asymmetric risk EMA, averaged over a short history
//!
//! The EMA reacts faster to rising risk than to falling risk, and faster still
//! when the instant risk is already high, so a genuine fault is reported
//! quickly while a one-off spike decays without flicker.

use tracing::info;

use super::EngineState;
use crate::config::{ProbabilityConfig, RecoveryConfig, SmoothingConfig};
use crate::types::{FeatureSample, FeatureWindow, HealthStatus};

/// Push `sample` into the feature history and return both views.
///
/// When the previous verdict was an alert and `sample` sits in the healthy
/// nominal band, the smoothing state is cleared first so a restarted pump is
/// not reported with carried-over risk. A latched hold or a running zone D
/// dwell blocks the reset; those release through the hysteresis layer only.
pub fn push_sample(
    smoothing: &SmoothingConfig,
    recovery: &RecoveryConfig,
    state: &mut EngineState,
    sample: FeatureSample,
) -> FeatureWindow {
    if recovery.enabled
        && state.last_status().is_alert()
        && !state.hold_latched()
        && in_recovery_band(recovery, &sample)
    {
        info!(
            previous = %state.last_status(),
            vib = sample.vib_rms,
            current = sample.current,
            "Nominal recovery detected, clearing carried-over risk"
        );
        state.clear_smoothing();
    }

    state.feature_history.push_back(sample);
    while state.feature_history.len() > smoothing.feature_window.max(1) {
        state.feature_history.pop_front();
    }

    let smoothed = FeatureSample::mean(&state.feature_history).unwrap_or(sample);
    FeatureWindow::new(smoothed, sample)
}

/// True when every channel of `sample` lies inside the healthy nominal band.
pub fn in_recovery_band(recovery: &RecoveryConfig, sample: &FeatureSample) -> bool {
    sample.vib_rms < recovery.vib_max_mm_s
        && (recovery.pressure_min_bar..recovery.pressure_max_bar).contains(&sample.pressure)
        && (recovery.temp_min_c..recovery.temp_max_c).contains(&sample.temp)
        && sample.current > recovery.current_min_amp
        && sample.current < recovery.current_max_amp
}

/// Fold the instant risk into the EMA and return the smoothed risk probability.
pub fn smooth_risk(smoothing: &SmoothingConfig, state: &mut EngineState, instant: f64) -> f64 {
    let ema = match state.smoothed_risk {
        None => instant,
        Some(prev) => {
            let alpha = if instant > prev {
                if instant >= smoothing.high_risk_threshold {
                    smoothing.alpha_very_high
                } else {
                    smoothing.alpha_rising
                }
            } else {
                smoothing.alpha_falling
            };
            alpha * instant + (1.0 - alpha) * prev
        }
    };
    state.smoothed_risk = Some(ema);

    state.risk_history.push_back(ema);
    while state.risk_history.len() > smoothing.risk_history.max(1) {
        state.risk_history.pop_front();
    }

    let sum: f64 = state.risk_history.iter().sum();
    sum / state.risk_history.len() as f64
}

/// Map the smoothed risk to the operator display value.
///
/// Above the compression start the remaining range is squeezed into
/// `[display_compress_floor, 1]`.
pub fn display_probability(probability: &ProbabilityConfig, smoothed_prob: f64) -> f64 {
    let start = probability.display_compress_start;
    if smoothed_prob >= start && start < 1.0 {
        let floor = probability.display_compress_floor;
        (floor + (smoothed_prob - start) * (1.0 - floor) / (1.0 - start)).min(1.0)
    } else {
        smoothed_prob
    }
}

/// Status the model alone would report.
///
/// The first `startup_iterations` invocations use the stricter CRITICAL
/// threshold while the risk history fills.
pub fn model_status(
    probability: &ProbabilityConfig,
    smoothed_prob: f64,
    invocation: u64,
) -> HealthStatus {
    let critical = if invocation < probability.startup_iterations {
        probability.startup_critical_threshold
    } else {
        probability.critical_threshold
    };
    if smoothed_prob >= critical {
        HealthStatus::Critical
    } else if smoothed_prob >= probability.warning_threshold {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::types::Cause;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_risk_seeds_ema() {
        let cfg = EngineConfig::default();
        let mut state = EngineState::default();
        let p = smooth_risk(&cfg.smoothing, &mut state, 0.4);
        assert!(approx(p, 0.4));
        assert_eq!(state.smoothed_risk, Some(0.4));
    }

    #[test]
    fn test_rising_high_risk_uses_fast_alpha() {
        let cfg = EngineConfig::default();
        let mut state = EngineState::default();
        smooth_risk(&cfg.smoothing, &mut state, 0.2);
        smooth_risk(&cfg.smoothing, &mut state, 0.9);
        // 0.92 * 0.9 + 0.08 * 0.2
        assert!(approx(state.smoothed_risk.unwrap(), 0.844));
    }

    #[test]
    fn test_rising_moderate_risk_uses_rising_alpha() {
        let cfg = EngineConfig::default();
        let mut state = EngineState::default();
        smooth_risk(&cfg.smoothing, &mut state, 0.2);
        smooth_risk(&cfg.smoothing, &mut state, 0.5);
        // 0.7 * 0.5 + 0.3 * 0.2
        assert!(approx(state.smoothed_risk.unwrap(), 0.41));
    }

    #[test]
    fn test_falling_risk_uses_falling_alpha() {
        let cfg = EngineConfig::default();
        let mut state = EngineState::default();
        smooth_risk(&cfg.smoothing, &mut state, 0.8);
        smooth_risk(&cfg.smoothing, &mut state, 0.0);
        // 0.65 * 0.0 + 0.35 * 0.8
        assert!(approx(state.smoothed_risk.unwrap(), 0.28));
    }

    #[test]
    fn test_risk_history_is_bounded_and_averaged() {
        let cfg = EngineConfig::default();
        let mut state = EngineState::default();
        let mut p = 0.0;
        for _ in 0..10 {
            p = smooth_risk(&cfg.smoothing, &mut state, 0.5);
        }
        assert_eq!(state.risk_history.len(), 3);
        assert!(approx(p, 0.5));
    }

    #[test]
    fn test_display_mapping() {
        let cfg = EngineConfig::default();
        assert!(approx(display_probability(&cfg.probability, 0.3), 0.3));
        assert!(approx(display_probability(&cfg.probability, 0.65), 0.85));
        assert!(approx(display_probability(&cfg.probability, 1.0), 1.0));
        let mid = display_probability(&cfg.probability, 0.825);
        assert!(approx(mid, 0.925), "got {mid}");
    }

    #[test]
    fn test_model_status_startup_threshold() {
        let cfg = EngineConfig::default();
        assert_eq!(model_status(&cfg.probability, 0.87, 0), HealthStatus::Warning);
        assert_eq!(model_status(&cfg.probability, 0.87, 3), HealthStatus::Critical);
        assert_eq!(model_status(&cfg.probability, 0.61, 5), HealthStatus::Warning);
        assert_eq!(model_status(&cfg.probability, 0.59, 5), HealthStatus::Healthy);
    }

    #[test]
    fn test_feature_window_is_mean_of_last_k() {
        let cfg = EngineConfig::default();
        let mut state = EngineState::default();
        for vib in [1.0, 2.0, 3.0, 4.0] {
            let sample = FeatureSample { vib_rms: vib, ..FeatureSample::default() };
            push_sample(&cfg.smoothing, &cfg.recovery, &mut state, sample);
        }
        assert_eq!(state.feature_history.len(), 3);
        let window = FeatureWindow::new(
            FeatureSample::mean(&state.feature_history).unwrap(),
            *state.feature_history.back().unwrap(),
        );
        assert!(approx(window.smoothed.vib_rms, 3.0));
        assert!(approx(window.latest.vib_rms, 4.0));
    }

    #[test]
    fn test_nominal_recovery_clears_carried_risk() {
        let cfg = EngineConfig::default();
        let mut state = EngineState {
            previous_status: Some(HealthStatus::Critical),
            smoothed_risk: Some(0.95),
            risk_history: [0.9, 0.95, 0.95].into_iter().collect(),
            feature_history: std::iter::repeat(FeatureSample {
                vib_rms: 8.0,
                ..FeatureSample::default()
            })
            .take(3)
            .collect(),
            ..EngineState::default()
        };
        let window = push_sample(&cfg.smoothing, &cfg.recovery, &mut state, FeatureSample::default());
        assert!(state.smoothed_risk.is_none());
        assert_eq!(state.feature_history.len(), 1);
        assert!(approx(window.smoothed.vib_rms, 2.8));
    }

    #[test]
    fn test_latched_hold_blocks_recovery_reset() {
        let cfg = EngineConfig::default();
        let mut state = EngineState {
            previous_status: Some(HealthStatus::Critical),
            previous_causes: vec![Cause::VibrationZoneD],
            smoothed_risk: Some(0.4),
            feature_history: std::iter::repeat(FeatureSample {
                vib_rms: 8.0,
                ..FeatureSample::default()
            })
            .take(3)
            .collect(),
            ..EngineState::default()
        };
        let window = push_sample(&cfg.smoothing, &cfg.recovery, &mut state, FeatureSample::default());
        assert_eq!(state.previous_status, Some(HealthStatus::Critical));
        assert_eq!(state.smoothed_risk, Some(0.4));
        assert!(window.smoothed.vib_rms > 6.0);
    }

    #[test]
    fn test_no_recovery_reset_while_healthy() {
        let cfg = EngineConfig::default();
        let mut state = EngineState {
            previous_status: Some(HealthStatus::Healthy),
            smoothed_risk: Some(0.3),
            ..EngineState::default()
        };
        push_sample(&cfg.smoothing, &cfg.recovery, &mut state, FeatureSample::default());
        assert_eq!(state.smoothed_risk, Some(0.3));
    }

    #[test]
    fn test_recovery_band_edges() {
        let cfg = EngineConfig::default();
        let nominal = FeatureSample::default();
        assert!(in_recovery_band(&cfg.recovery, &nominal));
        let hot = FeatureSample { temp: 60.0, ..nominal };
        assert!(!in_recovery_band(&cfg.recovery, &hot));
        let low_current = FeatureSample { current: 40.0, ..nominal };
        assert!(!in_recovery_band(&cfg.recovery, &low_current));
    }
}
