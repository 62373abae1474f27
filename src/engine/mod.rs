//! Pump Health Decision Engine
//!
//! Turns (smoothed features, latest features, model output, previous state)
//! into (verdict, next state):
//!
//! ```text
//! Smoothing ──▶ Rule Cascade ──▶ Interlock ──▶ Final Normalizer ──▶ Verdict
//!                    │
//!                    └── Hysteresis (per-cause holds keyed on previous causes)
//! ```
//!
//! `evaluate` is synchronous and deterministic: the same input sequence
//! always yields the same verdict sequence. One `EngineState` per asset;
//! invocations for the same asset must be serialized by the caller.

pub mod hysteresis;
pub mod interlock;
pub mod normalizer;
pub mod rules;
pub mod smoothing;
mod state;

pub use rules::{Assessment, Finding, Rule, RuleContext, CASCADE};
pub use state::EngineState;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::types::{Cause, FeatureSample, FeatureWindow, HealthStatus, ModelOutput, Reason, TripCause, Verdict};

/// Stateless decision engine; all per-asset memory lives in [`EngineState`].
#[derive(Debug, Clone)]
pub struct HealthEngine {
    config: Arc<EngineConfig>,
}

impl HealthEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Push the latest raw sample into the feature history and build the
    /// two-view window for this invocation.
    pub fn push_sample(&self, state: &mut EngineState, sample: FeatureSample) -> FeatureWindow {
        smoothing::push_sample(&self.config.smoothing, &self.config.recovery, state, sample)
    }

    /// Evaluate one invocation.
    pub fn evaluate(
        &self,
        window: &FeatureWindow,
        model: &ModelOutput,
        state: EngineState,
    ) -> (Verdict, EngineState) {
        let cfg = &*self.config;
        let mut next = state;
        let invocation = next.invocations;

        // 1. Smoothing
        let smoothed_prob = smoothing::smooth_risk(&cfg.smoothing, &mut next, model.risk());
        let model_status = smoothing::model_status(&cfg.probability, smoothed_prob, invocation);
        let display = smoothing::display_probability(&cfg.probability, smoothed_prob);

        // 2. Cascade, consulting the previous verdict for holds
        let dwell = hysteresis::zone_d_dwell(window, &next, &cfg.thresholds.vibration);
        let mut assessment = Assessment::from_model(model_status, display);
        let ctx = RuleContext {
            window,
            smoothed_prob,
            model_status,
            state: &next,
            config: cfg,
            zone_d_hold: dwell.hold,
        };
        rules::run_cascade(&ctx, &mut assessment);

        // 3. Interlock
        interlock::apply(&mut assessment, window, &cfg.thresholds.vibration);

        // 4. Final normalizer
        normalizer::apply(&mut assessment, &next, smoothed_prob, &cfg.probability);

        let reason = assessment
            .reason
            .unwrap_or_else(|| Reason::new(Cause::Nominal));
        let verdict = Verdict {
            status: assessment.status,
            reason,
            display_probability: assessment.display_probability,
            trip_cause: assessment.trip_cause,
            active_causes: assessment.active_causes,
            smoothed_risk: smoothed_prob,
            invocation,
        };

        // 5. State update
        if next.last_status() != verdict.status {
            info!(
                from = %next.last_status(),
                to = %verdict.status,
                reason = %verdict.reason.cause,
                "Health status changed"
            );
        }
        next.critical_low_vib_steps = dwell.low_vib_steps;
        next.cavitation_sustain_steps = if verdict.status == HealthStatus::Critical
            && verdict.trip_cause == Some(TripCause::Cavitation)
        {
            next.cavitation_sustain_steps.saturating_add(1)
        } else {
            0
        };
        next.overtemp_sustain_steps = if verdict.status == HealthStatus::Critical
            && verdict.trip_cause == Some(TripCause::Overtemp)
            && window.smoothed.temp >= cfg.thresholds.temperature.critical_c
        {
            next.overtemp_sustain_steps.saturating_add(1)
        } else {
            0
        };
        next.previous_status = Some(verdict.status);
        next.previous_reason = Some(verdict.reason.cause);
        next.previous_causes.clone_from(&verdict.active_causes);
        next.invocations += 1;

        debug!(
            invocation,
            status = %verdict.status,
            reason = %verdict.reason.cause,
            display = verdict.display_probability,
            risk = smoothed_prob,
            "Verdict"
        );

        (verdict, next)
    }

    /// Push `sample` and evaluate in one call, threading the state by value.
    pub fn step(
        &self,
        mut state: EngineState,
        sample: FeatureSample,
        model: &ModelOutput,
    ) -> (Verdict, EngineState) {
        let window = self.push_sample(&mut state, sample);
        self.evaluate(&window, model, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HealthEngine {
        HealthEngine::new(Arc::new(EngineConfig::default()))
    }

    #[test]
    fn test_nominal_is_healthy_with_one_reason() {
        let engine = engine();
        let (verdict, state) = engine.step(
            EngineState::default(),
            FeatureSample::default(),
            &ModelOutput::from_risk(0.05),
        );
        assert_eq!(verdict.status, HealthStatus::Healthy);
        assert_eq!(verdict.reason.cause, Cause::Nominal);
        assert!(verdict.active_causes.is_empty());
        assert_eq!(verdict.invocation, 0);
        assert_eq!(state.invocations, 1);
        assert_eq!(state.previous_status, Some(HealthStatus::Healthy));
    }

    #[test]
    fn test_cavitation_sustain_counter() {
        let engine = engine();
        let cav = FeatureSample {
            current: 60.0,
            pressure: 3.5,
            vib_rms: 10.0,
            ..FeatureSample::default()
        };
        let mut state = EngineState::default();
        for expected in 1..=3 {
            let (verdict, next) =
                engine.evaluate(&FeatureWindow::steady(cav), &ModelOutput::from_risk(0.9), state);
            assert_eq!(verdict.trip_cause, Some(TripCause::Cavitation));
            assert_eq!(next.cavitation_sustain_steps, expected);
            state = next;
        }
        let (_, next) = engine.evaluate(
            &FeatureWindow::steady(FeatureSample::default()),
            &ModelOutput::from_risk(0.1),
            state,
        );
        assert_eq!(next.cavitation_sustain_steps, 0);
    }

    #[test]
    fn test_overtemp_sustain_needs_smoothed_temperature() {
        let engine = engine();
        let hot = FeatureSample { temp: 80.0, ..FeatureSample::default() };
        let (verdict, state) = engine.evaluate(
            &FeatureWindow::new(FeatureSample::default(), hot),
            &ModelOutput::from_risk(0.2),
            EngineState::default(),
        );
        assert_eq!(verdict.reason.cause, Cause::Overtemp);
        assert_eq!(state.overtemp_sustain_steps, 0);

        let (_, state) = engine.evaluate(
            &FeatureWindow::steady(hot),
            &ModelOutput::from_risk(0.2),
            state,
        );
        assert_eq!(state.overtemp_sustain_steps, 1);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let engine = engine();
        let window = FeatureWindow::steady(FeatureSample { vib_rms: 6.0, ..FeatureSample::default() });
        let model = ModelOutput::from_risk(0.4);
        let a = engine.evaluate(&window, &model, EngineState::default());
        let b = engine.evaluate(&window, &model, EngineState::default());
        assert_eq!(a, b);
    }
}
