//! Interlock Detector
//!
//! Hard vibration ceiling above zone D, evaluated on the smoothed view only
//! so a single spike cannot trip it. Between zone D and the ceiling the
//! display probability ramps up linearly for alerting verdicts.

use tracing::warn;

use super::rules::Assessment;
use crate::config::VibrationThresholds;
use crate::types::{Cause, FeatureWindow, HealthStatus, Reason, TripCause};

/// Reasons the interlock never relabels: they already name a more specific
/// physical cause than "vibration too high".
pub const PROTECTED_CAUSES: [Cause; 5] = [
    Cause::DebrisImpact,
    Cause::Cavitation,
    Cause::ChokedDischarge,
    Cause::Overtemp,
    Cause::HighTemperature,
];

pub fn apply(assessment: &mut Assessment, window: &FeatureWindow, vib: &VibrationThresholds) {
    let v = window.smoothed.vib_rms;

    if v >= vib.interlock_mm_s {
        let keep_reason = assessment
            .reason_cause()
            .is_some_and(|c| PROTECTED_CAUSES.contains(&c));
        if !keep_reason {
            assessment.reason = Some(Reason::with_detail(
                Cause::VibrationInterlock,
                format!("V={v:.2} mm/s >= {:.1} mm/s", vib.interlock_mm_s),
            ));
        }
        assessment.status = HealthStatus::Critical;
        assessment.display_probability = assessment.display_probability.max(vib.interlock_display);
        if assessment.trip_cause.is_none() {
            assessment.trip_cause = Some(TripCause::VibrationInterlock);
        }
        if !assessment.active_causes.contains(&Cause::VibrationInterlock) {
            assessment.active_causes.push(Cause::VibrationInterlock);
        }
        warn!(vib = v, reason = ?assessment.reason_cause(), "Vibration interlock asserted");
    } else if assessment.status.is_alert() && v >= vib.zone_d_mm_s {
        let span = vib.interlock_mm_s - vib.zone_d_mm_s;
        let ramp = (vib.zone_d_display + (1.0 - vib.zone_d_display) * (v - vib.zone_d_mm_s) / span)
            .min(1.0);
        assessment.display_probability = assessment.display_probability.max(ramp);
    }
}
