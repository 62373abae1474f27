//! Scenario Regression Tests
//!
//! Drives the decision engine through the reference operating scenarios and
//! checks the cross-cutting properties of the cascade: priority, deadband,
//! dwell, monotonic severity, display floor and shutdown exclusion.

use pump_sentinel::config::EngineConfig;
use pump_sentinel::engine::{EngineState, HealthEngine};
use pump_sentinel::shutdown::ShutdownAdvisor;
use pump_sentinel::types::{
    Cause, FeatureSample, FeatureWindow, HealthStatus, ModelOutput, TripCause, Verdict,
};
use std::sync::Arc;

fn engine() -> HealthEngine {
    HealthEngine::new(Arc::new(EngineConfig::default()))
}

/// Nominal sample with the given overrides applied by the caller.
fn sample() -> FeatureSample {
    FeatureSample {
        vib_rms: 2.5,
        vib_crest: 3.0,
        current: 45.0,
        pressure: 6.0,
        temp: 38.0,
        ..FeatureSample::default()
    }
}

fn eval(
    engine: &HealthEngine,
    features: FeatureSample,
    risk: f64,
    state: EngineState,
) -> (Verdict, EngineState) {
    engine.evaluate(&FeatureWindow::steady(features), &ModelOutput::from_risk(risk), state)
}

/// State as left by an evaluation that ended on `status` with `causes` active.
fn prior(status: HealthStatus, causes: &[Cause]) -> EngineState {
    EngineState {
        previous_status: Some(status),
        previous_reason: causes.first().copied(),
        previous_causes: causes.to_vec(),
        invocations: 10,
        ..EngineState::default()
    }
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn scenario_1_cavitation() {
    let features = FeatureSample { current: 60.0, pressure: 3.5, vib_rms: 10.0, ..sample() };
    let (v, _) = eval(&engine(), features, 0.5, EngineState::default());
    assert_eq!(v.status, HealthStatus::Critical);
    assert_eq!(v.reason.cause, Cause::Cavitation);
    assert_eq!(v.trip_cause, Some(TripCause::Cavitation));
}

#[test]
fn scenario_2_zone_d() {
    let features = FeatureSample { vib_rms: 7.5, ..sample() };
    let (v, _) = eval(&engine(), features, 0.3, EngineState::default());
    assert_eq!(v.status, HealthStatus::Critical);
    assert_eq!(v.reason.cause, Cause::VibrationZoneD);
    assert!(v.trip_cause.is_none());
}

#[test]
fn scenario_3_zone_c_deadband_holds() {
    let state = prior(HealthStatus::Warning, &[Cause::VibrationZoneC]);
    let features = FeatureSample { vib_rms: 5.0, ..sample() };
    let (v, _) = eval(&engine(), features, 0.2, state);
    assert_eq!(v.status, HealthStatus::Warning);
    assert_eq!(v.reason.cause, Cause::VibrationZoneC);
}

#[test]
fn scenario_4_zone_d_exits_on_fifth_low_sample() {
    let engine = engine();
    let mut state = prior(HealthStatus::Critical, &[Cause::VibrationZoneD]);
    let features = FeatureSample { vib_rms: 5.8, ..sample() };

    for step in 1..=4 {
        let (v, next) = eval(&engine, features, 0.3, state);
        assert_eq!(v.status, HealthStatus::Critical, "step {step} must still hold");
        assert_eq!(v.reason.cause, Cause::VibrationZoneD);
        state = next;
    }
    let (v, next) = eval(&engine, features, 0.3, state);
    assert_eq!(v.status, HealthStatus::Warning);
    assert_eq!(v.reason.cause, Cause::VibrationZoneC);
    assert_eq!(next.critical_low_vib_steps, 0);
}

#[test]
fn scenario_5_model_critical_maintenance_relabelled() {
    let features = FeatureSample { current: 38.0, pressure: 4.8, ..sample() };
    let (v, _) = eval(&engine(), features, 0.95, EngineState::default());
    assert_eq!(v.status, HealthStatus::Critical);
    assert_eq!(v.reason.cause, Cause::HighRisk);
    assert!(v.display_probability >= 0.85);
    assert!(v.trip_cause.is_none());
}

#[test]
fn scenario_6_interlock_keeps_cavitation_reason() {
    let features = FeatureSample { current: 60.0, pressure: 3.5, vib_rms: 9.2, ..sample() };
    let (v, _) = eval(&engine(), features, 0.4, EngineState::default());
    assert_eq!(v.status, HealthStatus::Critical);
    assert_eq!(v.reason.cause, Cause::Cavitation);
    assert_eq!(v.trip_cause, Some(TripCause::Cavitation));
    assert!(v.active_causes.contains(&Cause::VibrationInterlock));
    assert!(v.display_probability >= 0.99);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn priority_highest_rule_claims_reason() {
    let engine = engine();
    let cases = [
        // debris + cavitation + overtemp
        (
            FeatureSample {
                debris_impact: Some(true),
                current: 60.0,
                pressure: 3.5,
                vib_rms: 9.5,
                temp: 80.0,
                ..sample()
            },
            Cause::DebrisImpact,
        ),
        // cavitation + overtemp + overload
        (
            FeatureSample { current: 60.0, pressure: 3.5, vib_rms: 9.5, temp: 80.0, ..sample() },
            Cause::Cavitation,
        ),
        // choked + high temperature
        (
            FeatureSample { current: 34.0, pressure: 7.6, temp: 72.0, ..sample() },
            Cause::ChokedDischarge,
        ),
        // degradation + high temperature
        (
            FeatureSample { current: 38.0, pressure: 4.8, temp: 65.0, ..sample() },
            Cause::Maintenance,
        ),
        // overload + zone C
        (FeatureSample { current: 52.0, vib_rms: 5.8, ..sample() }, Cause::Overload),
    ];
    for (features, expected) in cases {
        let (v, _) = eval(&engine, features, 0.3, EngineState::default());
        assert_eq!(v.reason.cause, expected, "features: {features:?}");
    }
}

#[test]
fn deadband_degradation_holds_between_entry_and_exit() {
    let engine = engine();
    let state = prior(HealthStatus::Warning, &[Cause::Maintenance]);
    // 41 A sits between the 40 A entry and the 42 A exit
    let features = FeatureSample { current: 41.0, pressure: 6.0, ..sample() };
    let (v, state) = eval(&engine, features, 0.2, state);
    assert_eq!(v.status, HealthStatus::Warning);
    assert_eq!(v.reason.cause, Cause::Maintenance);

    let recovered = FeatureSample { current: 45.0, pressure: 6.0, ..sample() };
    let (v, _) = eval(&engine, recovered, 0.05, state);
    assert_eq!(v.status, HealthStatus::Healthy);
}

#[test]
fn deadband_zone_c_releases_below_exit() {
    let state = prior(HealthStatus::Warning, &[Cause::VibrationZoneC]);
    let features = FeatureSample { vib_rms: 4.2, ..sample() };
    let (v, _) = eval(&engine(), features, 0.05, state);
    assert_eq!(v.status, HealthStatus::Healthy);
}

#[test]
fn dwell_resets_on_intervening_high_sample() {
    let engine = engine();
    let low = FeatureSample { vib_rms: 5.8, ..sample() };
    let mid = FeatureSample { vib_rms: 6.5, ..sample() };
    let mut state = prior(HealthStatus::Critical, &[Cause::VibrationZoneD]);

    for _ in 0..3 {
        let (v, next) = eval(&engine, low, 0.3, state);
        assert_eq!(v.status, HealthStatus::Critical);
        state = next;
    }
    assert_eq!(state.critical_low_vib_steps, 3);

    let (v, next) = eval(&engine, mid, 0.3, state);
    assert_eq!(v.status, HealthStatus::Critical);
    assert_eq!(next.critical_low_vib_steps, 0);
    state = next;

    for step in 1..=4 {
        let (v, next) = eval(&engine, low, 0.3, state);
        assert_eq!(v.status, HealthStatus::Critical, "step {step} after reset must hold");
        state = next;
    }
    let (v, _) = eval(&engine, low, 0.3, state);
    assert_eq!(v.status, HealthStatus::Warning);
}

#[test]
fn monotonic_severity_later_rule_raises_status() {
    // Degradation (WARNING) claims the reason, overtemperature raises to CRITICAL
    let features = FeatureSample { current: 38.0, pressure: 4.8, temp: 80.0, ..sample() };
    let (v, _) = eval(&engine(), features, 0.2, EngineState::default());
    assert_eq!(v.status, HealthStatus::Critical);
    assert!(v.active_causes.contains(&Cause::Maintenance));
    assert!(v.active_causes.contains(&Cause::Overtemp));
    assert_ne!(v.reason.cause, Cause::Overtemp);
}

#[test]
fn display_floor_for_every_critical_verdict() {
    let engine = engine();
    let samples = [
        FeatureSample { vib_rms: 7.2, ..sample() },
        FeatureSample { vib_rms: 9.5, ..sample() },
        FeatureSample { temp: 78.0, ..sample() },
        FeatureSample { current: 34.0, pressure: 7.6, temp: 72.0, ..sample() },
        FeatureSample { debris_impact: Some(true), ..sample() },
        FeatureSample { current: 38.0, pressure: 4.8, ..sample() },
        sample(),
    ];
    let mut criticals = 0;
    for features in samples {
        for risk in [0.0, 0.3, 0.7, 0.92, 1.0] {
            let (v, _) = eval(&engine, features, risk, EngineState::default());
            if v.status == HealthStatus::Critical {
                criticals += 1;
                assert!(
                    v.display_probability >= 0.85,
                    "display {} for {:?}",
                    v.display_probability,
                    v.reason
                );
            }
            assert!((0.0..=1.0).contains(&v.display_probability));
        }
    }
    assert!(criticals > 10);
}

#[test]
fn shutdown_exclusion_for_model_only_critical() {
    let engine = engine();
    let advisor = ShutdownAdvisor::new(engine.config());
    let window = FeatureWindow::steady(sample());
    let (v, state) = engine.evaluate(&window, &ModelOutput::from_risk(0.97), EngineState::default());
    assert_eq!(v.status, HealthStatus::Critical);
    assert!(v.is_model_only());
    assert!(v.reason.cause.trip_cause().is_none());
    assert!(v.trip_cause.is_none());
    assert!(advisor.advise(&v, &state, &window).is_none());
}

#[test]
fn cavitation_shutdown_after_sustain() {
    let engine = engine();
    let advisor = ShutdownAdvisor::new(engine.config());
    let features = FeatureSample { current: 60.0, pressure: 3.5, vib_rms: 9.5, ..sample() };
    let window = FeatureWindow::steady(features);
    let mut state = EngineState::default();
    let mut first_trip = None;
    for step in 1..=6 {
        let (v, next) = engine.evaluate(&window, &ModelOutput::from_risk(0.6), state);
        assert_eq!(v.reason.cause, Cause::Cavitation);
        if first_trip.is_none() && advisor.advise(&v, &next, &window).is_some() {
            first_trip = Some(step);
        }
        state = next;
    }
    assert_eq!(first_trip, Some(4));
}

// ============================================================================
// Nominal recovery against latched holds
// ============================================================================

#[test]
fn nominal_samples_do_not_skip_zone_d_dwell() {
    let engine = engine();
    let model = ModelOutput::from_risk(0.3);
    let mut state = EngineState::default();
    for _ in 0..4 {
        let (v, next) = engine.step(state, FeatureSample { vib_rms: 8.0, ..sample() }, &model);
        assert_eq!(v.reason.cause, Cause::VibrationZoneD);
        state = next;
    }

    // The first low sample still averages above the zone D exit; the dwell
    // then needs five consecutive low invocations.
    let low = FeatureSample { vib_rms: 3.0, ..sample() };
    for step in 1..=5 {
        let (v, next) = engine.step(state, low, &model);
        assert_eq!(v.status, HealthStatus::Critical, "low sample {step} must hold");
        assert_eq!(v.reason.cause, Cause::VibrationZoneD);
        state = next;
    }
    let (v, _) = engine.step(state, low, &model);
    assert_eq!(v.status, HealthStatus::Healthy);
}

#[test]
fn nominal_samples_do_not_skip_degradation_deadband() {
    let engine = engine();
    let model = ModelOutput::from_risk(0.3);
    let worn = FeatureSample { current: 38.5, pressure: 5.0, ..sample() };
    let mut state = EngineState::default();
    for _ in 0..4 {
        let (v, next) = engine.step(state, worn, &model);
        assert_eq!(v.reason.cause, Cause::Maintenance);
        state = next;
    }

    // 5.3 bar sits in the recovery band but below the 5.5 bar exit
    let partial = FeatureSample { current: 45.0, pressure: 5.3, ..sample() };
    let (v, _) = engine.step(state, partial, &model);
    assert_eq!(v.status, HealthStatus::Warning);
    assert_eq!(v.reason.cause, Cause::Maintenance);
}

#[test]
fn overtemp_shutdown_when_degradation_claims_reason() {
    let engine = engine();
    let advisor = ShutdownAdvisor::new(engine.config());
    let window = FeatureWindow::steady(FeatureSample {
        current: 38.5,
        pressure: 5.0,
        temp: 82.0,
        ..sample()
    });
    let mut state = EngineState::default();
    let mut first_trip = None;
    for step in 1..=5 {
        let (v, next) = engine.evaluate(&window, &ModelOutput::from_risk(0.3), state);
        assert_eq!(v.status, HealthStatus::Critical);
        assert_eq!(v.trip_cause, Some(TripCause::Overtemp));
        assert!(v.active_causes.contains(&Cause::Maintenance));
        assert_eq!(next.overtemp_sustain_steps, step);
        if first_trip.is_none() {
            if let Some(action) = advisor.advise(&v, &next, &window) {
                assert_eq!(action.trip_cause, TripCause::Overtemp);
                first_trip = Some(step);
            }
        }
        state = next;
    }
    assert_eq!(first_trip, Some(3));
}
