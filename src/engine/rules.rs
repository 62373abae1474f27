//! Rule Cascade
//!
//! Ordered physical-cause detectors. Each rule looks at both feature views,
//! the smoothed risk and the previous state, and either fires a [`Finding`]
//! or stays silent. Rules never see each other's results: priority comes
//! only from the order of [`CASCADE`] and the reason lock in [`Assessment`].

use tracing::debug;

use super::hysteresis;
use super::EngineState;
use crate::config::EngineConfig;
use crate::types::{Cause, FeatureWindow, HealthStatus, Reason, TripCause};

// ============================================================================
// Rule Context
// ============================================================================

/// Inputs shared by every rule for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub window: &'a FeatureWindow,
    pub smoothed_prob: f64,
    pub model_status: HealthStatus,
    pub state: &'a EngineState,
    pub config: &'a EngineConfig,
    /// Zone D dwell hold computed before the cascade runs
    pub zone_d_hold: bool,
}

/// A fired rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub cause: Cause,
    pub status: HealthStatus,
    pub display_floor: Option<f64>,
    pub detail: String,
    /// Fired through a hysteresis hold rather than a fresh entry
    pub held: bool,
}

// ============================================================================
// Cascade
// ============================================================================

/// Cause detectors, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Mechanical,
    Cavitation,
    ChokedDischarge,
    Degradation,
    Temperature,
    Overload,
    HighPressure,
    AirIngestion,
    VibrationZone,
}

/// Fixed evaluation order. Earlier rules claim the reason.
pub const CASCADE: [Rule; 9] = [
    Rule::Mechanical,
    Rule::Cavitation,
    Rule::ChokedDischarge,
    Rule::Degradation,
    Rule::Temperature,
    Rule::Overload,
    Rule::HighPressure,
    Rule::AirIngestion,
    Rule::VibrationZone,
];

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::Mechanical => "mechanical",
            Rule::Cavitation => "cavitation",
            Rule::ChokedDischarge => "choked_discharge",
            Rule::Degradation => "degradation",
            Rule::Temperature => "temperature",
            Rule::Overload => "overload",
            Rule::HighPressure => "high_pressure",
            Rule::AirIngestion => "air_ingestion",
            Rule::VibrationZone => "vibration_zone",
        }
    }

    /// Evaluate this rule; `None` when its condition does not hold.
    pub fn evaluate(self, ctx: &RuleContext<'_>) -> Option<Finding> {
        match self {
            Rule::Mechanical => mechanical(ctx),
            Rule::Cavitation => cavitation(ctx),
            Rule::ChokedDischarge => choked_discharge(ctx),
            Rule::Degradation => degradation(ctx),
            Rule::Temperature => temperature(ctx),
            Rule::Overload => overload(ctx),
            Rule::HighPressure => high_pressure(ctx),
            Rule::AirIngestion => air_ingestion(ctx),
            Rule::VibrationZone => vibration_zone(ctx),
        }
    }
}

// ============================================================================
// Detectors
// ============================================================================

fn mechanical(ctx: &RuleContext<'_>) -> Option<Finding> {
    let w = ctx.window;
    let vib = &ctx.config.thresholds.vibration;
    let flagged = w.latest.has_debris_impact();
    let impulsive = w.peak_crest() >= ctx.config.thresholds.debris.crest_factor
        && (ctx.model_status == HealthStatus::Critical || w.peak_vib() >= vib.zone_d_mm_s);
    let held = !flagged && !impulsive && hysteresis::debris_hold(w, ctx.state, ctx.config);

    (flagged || impulsive || held).then(|| Finding {
        cause: Cause::DebrisImpact,
        status: HealthStatus::Critical,
        display_floor: Some(ctx.config.probability.trip_display_floor),
        detail: format!("crest={:.2}, V={:.2} mm/s", w.peak_crest(), w.peak_vib()),
        held,
    })
}

fn cavitation(ctx: &RuleContext<'_>) -> Option<Finding> {
    let w = ctx.window;
    let cav = &ctx.config.thresholds.cavitation;
    let entry = [&w.smoothed, &w.latest].into_iter().any(|s| {
        s.current >= cav.current_min_amp
            && s.pressure <= cav.pressure_max_bar
            && s.vib_rms >= cav.vibration_min_mm_s
    });
    let held = !entry && hysteresis::cavitation_hold(w, ctx.state, ctx.config);

    (entry || held).then(|| Finding {
        cause: Cause::Cavitation,
        status: HealthStatus::Critical,
        display_floor: Some(ctx.config.probability.trip_display_floor),
        detail: format!(
            "I={:.1} A, P={:.2} bar, V={:.2} mm/s",
            w.latest.current, w.latest.pressure, w.peak_vib()
        ),
        held,
    })
}

fn choked_discharge(ctx: &RuleContext<'_>) -> Option<Finding> {
    let w = ctx.window;
    let ch = &ctx.config.thresholds.choked;
    let entry = [&w.smoothed, &w.latest].into_iter().any(|s| {
        s.current <= ch.current_max_amp && s.pressure >= ch.pressure_min_bar && s.temp >= ch.temp_min_c
    });

    entry.then(|| Finding {
        cause: Cause::ChokedDischarge,
        status: HealthStatus::Critical,
        display_floor: Some(ctx.config.probability.trip_display_floor),
        detail: format!(
            "I={:.1} A, P={:.2} bar, T={:.1} °C",
            w.latest.current, w.latest.pressure, w.latest.temp
        ),
        held: false,
    })
}

fn degradation(ctx: &RuleContext<'_>) -> Option<Finding> {
    let w = ctx.window;
    let deg = &ctx.config.thresholds.degradation;
    let entry = [&w.smoothed, &w.latest]
        .into_iter()
        .all(|s| s.current <= deg.current_max_amp && s.pressure <= deg.pressure_max_bar);
    let held = !entry && hysteresis::degradation_hold(w, ctx.state, ctx.config);

    (entry || held).then(|| Finding {
        cause: Cause::Maintenance,
        status: HealthStatus::Warning,
        display_floor: Some(ctx.config.probability.warning_display_floor),
        detail: format!("I={:.1} A, P={:.2} bar", w.smoothed.current, w.smoothed.pressure),
        held,
    })
}

fn temperature(ctx: &RuleContext<'_>) -> Option<Finding> {
    let t = &ctx.config.thresholds.temperature;
    let peak = ctx.window.peak_temp();
    let detail = format!("T={peak:.1} °C");
    if peak >= t.critical_c {
        Some(Finding {
            cause: Cause::Overtemp,
            status: HealthStatus::Critical,
            display_floor: Some(ctx.config.probability.critical_display_floor),
            detail,
            held: false,
        })
    } else if peak >= t.warning_c {
        Some(Finding {
            cause: Cause::HighTemperature,
            status: HealthStatus::Warning,
            display_floor: Some(ctx.config.probability.warning_display_floor),
            detail,
            held: false,
        })
    } else {
        None
    }
}

fn overload(ctx: &RuleContext<'_>) -> Option<Finding> {
    let peak = ctx.window.peak_current();
    (peak >= ctx.config.thresholds.overload.current_amp).then(|| Finding {
        cause: Cause::Overload,
        status: HealthStatus::Warning,
        display_floor: Some(ctx.config.probability.warning_display_floor),
        detail: format!("I={peak:.1} A"),
        held: false,
    })
}

fn high_pressure(ctx: &RuleContext<'_>) -> Option<Finding> {
    let w = ctx.window;
    let p = &ctx.config.thresholds.pressure;
    let fires = w.peak_pressure() >= p.high_bar
        && w.smoothed.current > p.min_flow_current_amp
        && w.latest.current > p.min_flow_current_amp;

    fires.then(|| Finding {
        cause: Cause::HighPressure,
        status: HealthStatus::Warning,
        display_floor: Some(ctx.config.probability.warning_display_floor),
        detail: format!("P={:.2} bar", w.peak_pressure()),
        held: false,
    })
}

fn air_ingestion(ctx: &RuleContext<'_>) -> Option<Finding> {
    let w = ctx.window;
    let air = &ctx.config.thresholds.air_ingestion;
    let fires = w.peak_crest() >= air.crest_factor && w.peak_vib() >= air.vibration_min_mm_s;

    fires.then(|| Finding {
        cause: Cause::AirIngestion,
        status: HealthStatus::Warning,
        display_floor: Some(ctx.config.probability.warning_display_floor),
        detail: format!("crest={:.2}, V={:.2} mm/s", w.peak_crest(), w.peak_vib()),
        held: false,
    })
}

fn vibration_zone(ctx: &RuleContext<'_>) -> Option<Finding> {
    let w = ctx.window;
    let vib = &ctx.config.thresholds.vibration;
    let detail = format!("V={:.2} mm/s", w.peak_vib());

    let zone_d = w.peak_vib() >= vib.zone_d_mm_s;
    if zone_d || ctx.zone_d_hold {
        return Some(Finding {
            cause: Cause::VibrationZoneD,
            status: HealthStatus::Critical,
            display_floor: Some(vib.zone_d_display),
            detail,
            held: !zone_d,
        });
    }

    let zone_c = w.smoothed.vib_rms >= vib.zone_c_mm_s
        && w.latest.vib_rms >= vib.zone_c_mm_s
        && ctx.smoothed_prob >= vib.zone_c_min_risk;
    let held = !zone_c && hysteresis::zone_c_hold(w, ctx.state, vib);

    (zone_c || held).then(|| Finding {
        cause: Cause::VibrationZoneC,
        status: HealthStatus::Warning,
        display_floor: None,
        detail,
        held,
    })
}

// ============================================================================
// Assessment (verdict under construction)
// ============================================================================

/// Verdict being assembled by the cascade, interlock and normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub status: HealthStatus,
    pub reason: Option<Reason>,
    pub display_probability: f64,
    pub trip_cause: Option<TripCause>,
    pub active_causes: Vec<Cause>,
}

impl Assessment {
    /// Start from the model's own opinion.
    pub fn from_model(model_status: HealthStatus, display_probability: f64) -> Self {
        Self {
            status: model_status,
            reason: None,
            display_probability,
            trip_cause: None,
            active_causes: Vec::new(),
        }
    }

    /// Fold a finding in: escalate status, claim the reason and trip cause if
    /// still free, raise the display floor.
    pub fn apply(&mut self, finding: Finding) {
        self.status = self.status.max(finding.status);
        if let Some(floor) = finding.display_floor {
            self.display_probability = self.display_probability.max(floor);
        }
        if self.trip_cause.is_none() {
            self.trip_cause = finding.cause.trip_cause();
        }
        if !self.active_causes.contains(&finding.cause) {
            self.active_causes.push(finding.cause);
        }
        if self.reason.is_none() {
            self.reason = Some(Reason::with_detail(finding.cause, finding.detail));
        }
    }

    pub fn reason_cause(&self) -> Option<Cause> {
        self.reason.as_ref().map(|r| r.cause)
    }
}

/// Run every rule of the cascade in order.
pub fn run_cascade(ctx: &RuleContext<'_>, assessment: &mut Assessment) {
    for rule in CASCADE {
        if let Some(finding) = rule.evaluate(ctx) {
            debug!(
                rule = rule.name(),
                cause = %finding.cause,
                status = %finding.status,
                held = finding.held,
                "Rule fired"
            );
            assessment.apply(finding);
        }
    }
}
