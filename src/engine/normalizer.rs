//! Final Normalizer
//!
//! Last pass over the assessment:
//! 1. CRITICAL floors the display probability; a CRITICAL that still carries
//!    the MAINTENANCE reason is relabelled as generic high risk
//! 2. Model-risk hold keeps a model-only WARNING latched
//! 3. An unclaimed reason is filled from the final status
//! 4. Display probability is clamped to [0, 1]

use super::hysteresis;
use super::rules::Assessment;
use super::EngineState;
use crate::config::ProbabilityConfig;
use crate::types::{Cause, HealthStatus, Reason};

pub fn apply(
    assessment: &mut Assessment,
    state: &EngineState,
    smoothed_prob: f64,
    probability: &ProbabilityConfig,
) {
    if assessment.status == HealthStatus::Critical {
        assessment.display_probability = assessment
            .display_probability
            .max(probability.critical_display_floor);
        if let Some(reason) = assessment.reason.as_mut() {
            if reason.cause == Cause::Maintenance {
                reason.cause = Cause::HighRisk;
            }
        }
    }

    if hysteresis::risk_hold(state, assessment.status, smoothed_prob, probability) {
        assessment.status = HealthStatus::Warning;
        assessment.reason = Some(Reason::with_detail(
            Cause::ElevatedRisk,
            format!("risk={smoothed_prob:.2} (hold)"),
        ));
    }

    if assessment.reason.is_none() {
        let cause = match assessment.status {
            HealthStatus::Critical => Cause::HighRisk,
            HealthStatus::Warning => Cause::ElevatedRisk,
            HealthStatus::Healthy => Cause::Nominal,
        };
        assessment.reason = Some(Reason::with_detail(cause, format!("risk={smoothed_prob:.2}")));
    }

    assessment.display_probability = assessment.display_probability.clamp(0.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_maintenance_relabelled_and_floored() {
        let mut a = Assessment::from_model(HealthStatus::Critical, 0.5);
        a.reason = Some(Reason::new(Cause::Maintenance));
        apply(&mut a, &EngineState::default(), 0.5, &ProbabilityConfig::default());
        assert_eq!(a.reason_cause(), Some(Cause::HighRisk));
        assert!((a.display_probability - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_warning_maintenance_untouched() {
        let mut a = Assessment::from_model(HealthStatus::Warning, 0.55);
        a.reason = Some(Reason::new(Cause::Maintenance));
        apply(&mut a, &EngineState::default(), 0.2, &ProbabilityConfig::default());
        assert_eq!(a.reason_cause(), Some(Cause::Maintenance));
    }

    #[test]
    fn test_unclaimed_reason_filled_from_status() {
        let probability = ProbabilityConfig::default();
        for (status, cause) in [
            (HealthStatus::Critical, Cause::HighRisk),
            (HealthStatus::Warning, Cause::ElevatedRisk),
            (HealthStatus::Healthy, Cause::Nominal),
        ] {
            let mut a = Assessment::from_model(status, 0.4);
            apply(&mut a, &EngineState::default(), 0.4, &probability);
            assert_eq!(a.reason_cause(), Some(cause));
            assert!(a.trip_cause.is_none());
        }
    }

    #[test]
    fn test_risk_hold_relatches_warning() {
        let state = EngineState {
            previous_status: Some(HealthStatus::Warning),
            previous_reason: Some(Cause::ElevatedRisk),
            ..EngineState::default()
        };
        let mut a = Assessment::from_model(HealthStatus::Healthy, 0.3);
        apply(&mut a, &state, 0.3, &ProbabilityConfig::default());
        assert_eq!(a.status, HealthStatus::Warning);
        assert_eq!(a.reason_cause(), Some(Cause::ElevatedRisk));
    }

    #[test]
    fn test_display_clamped() {
        let mut a = Assessment::from_model(HealthStatus::Healthy, 1.4);
        apply(&mut a, &EngineState::default(), 0.1, &ProbabilityConfig::default());
        assert!((a.display_probability - 1.0).abs() < 1e-9);
    }
}
