//! Health status, cause taxonomy and the per-invocation verdict

use serde::{Deserialize, Serialize};

/// Health classification, ordered by severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    #[default]
    Healthy = 0,
    Warning = 1,
    Critical = 2,
}

impl HealthStatus {
    /// WARNING and CRITICAL are alert-worthy; HEALTHY is not.
    pub fn is_alert(self) -> bool {
        self >= HealthStatus::Warning
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "HEALTHY"),
            HealthStatus::Warning => write!(f, "WARNING"),
            HealthStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Fixed set of cause identifiers a verdict can carry.
///
/// Physical causes come from the rule cascade and the interlock. The last
/// three are model-derived and never eligible for an automatic stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cause {
    /// Stone hit / mechanical damage (Zone D)
    DebrisImpact,
    /// High current, low pressure, high vibration (Zone D)
    Cavitation,
    /// Low flow with high pressure and temperature
    ChokedDischarge,
    /// Impeller wear / underload (Zone C)
    Maintenance,
    /// Temperature at or above the critical limit (Zone D)
    Overtemp,
    /// Temperature at or above the warning limit (Zone C)
    HighTemperature,
    /// Motor overload
    Overload,
    /// High discharge pressure with normal flow
    HighPressure,
    /// Vortex / air ingestion: impulsive vibration
    AirIngestion,
    /// ISO 10816-3 Zone D vibration
    VibrationZoneD,
    /// ISO 10816-3 Zone C vibration
    VibrationZoneC,
    /// Vibration above the hard trip ceiling
    VibrationInterlock,
    /// Model-only CRITICAL, or a CRITICAL that lost its specific cause
    HighRisk,
    /// Model-only WARNING, including the risk hysteresis hold
    ElevatedRisk,
    /// Nothing to report
    Nominal,
}

impl Cause {
    /// True for the causes derived from the classifier alone.
    pub fn is_model_derived(self) -> bool {
        matches!(self, Cause::HighRisk | Cause::ElevatedRisk | Cause::Nominal)
    }

    /// Trip code for causes that may justify an automatic stop.
    pub fn trip_cause(self) -> Option<TripCause> {
        match self {
            Cause::DebrisImpact => Some(TripCause::DebrisImpact),
            Cause::Cavitation => Some(TripCause::Cavitation),
            Cause::ChokedDischarge => Some(TripCause::ChokedDischarge),
            Cause::Overtemp => Some(TripCause::Overtemp),
            Cause::VibrationInterlock => Some(TripCause::VibrationInterlock),
            _ => None,
        }
    }

    /// Vibration-derived causes (zone or interlock).
    pub fn is_vibration(self) -> bool {
        matches!(
            self,
            Cause::VibrationZoneD | Cause::VibrationZoneC | Cause::VibrationInterlock
        )
    }

    /// Operator-facing message.
    pub fn message(self) -> &'static str {
        match self {
            Cause::DebrisImpact => {
                "DEBRIS IMPACT (Zone D): inspect impeller, wear plate and liner; do not restart without inspection if damage suspected."
            }
            Cause::Cavitation => "CAVITATION (Zone D): check inlet valve / sump level.",
            Cause::ChokedDischarge => {
                "CHOKED DISCHARGE: low flow + high P/T. Overheat risk. Immediate stop."
            }
            Cause::Maintenance => {
                "MAINTENANCE (Zone C): inspect impeller & wear plate, assess on shutdown."
            }
            Cause::Overtemp => "HIGH TEMPERATURE (Zone D): inspect cooling and flow rate.",
            Cause::HighTemperature => "HIGH TEMPERATURE (Zone C): inspect cooling and flow rate.",
            Cause::Overload => "Motor overload: inspect for motor strain.",
            Cause::HighPressure => "High discharge pressure: check discharge valves.",
            Cause::AirIngestion => "AIR INGESTION: check sump level, reduce speed.",
            Cause::VibrationZoneD => {
                "VIBRATION (Zone D): unacceptable; reduce load or stop for inspection."
            }
            Cause::VibrationZoneC => "VIBRATION (Zone C): plan maintenance; monitor trend.",
            Cause::VibrationInterlock => "VIBRATION INTERLOCK: limit exceeded; stop and inspect.",
            Cause::HighRisk => "High risk (model): inspect equipment.",
            Cause::ElevatedRisk => "Elevated risk (model): continue monitoring.",
            Cause::Nominal => "Operating within nominal limits.",
        }
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Cause::DebrisImpact => "DEBRIS_IMPACT",
            Cause::Cavitation => "CAVITATION",
            Cause::ChokedDischarge => "CHOKED_DISCHARGE",
            Cause::Maintenance => "MAINTENANCE",
            Cause::Overtemp => "OVERTEMP",
            Cause::HighTemperature => "HIGH_TEMPERATURE",
            Cause::Overload => "OVERLOAD",
            Cause::HighPressure => "HIGH_PRESSURE",
            Cause::AirIngestion => "AIR_INGESTION",
            Cause::VibrationZoneD => "VIBRATION_ZONE_D",
            Cause::VibrationZoneC => "VIBRATION_ZONE_C",
            Cause::VibrationInterlock => "VIBRATION_INTERLOCK",
            Cause::HighRisk => "HIGH_RISK",
            Cause::ElevatedRisk => "ELEVATED_RISK",
            Cause::Nominal => "NOMINAL",
        };
        write!(f, "{code}")
    }
}

/// Structured trip codes consumed by the shutdown advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripCause {
    DebrisImpact,
    Cavitation,
    ChokedDischarge,
    Overtemp,
    VibrationInterlock,
}

impl std::fmt::Display for TripCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripCause::DebrisImpact => write!(f, "DEBRIS_IMPACT"),
            TripCause::Cavitation => write!(f, "CAVITATION"),
            TripCause::ChokedDischarge => write!(f, "CHOKED_DISCHARGE"),
            TripCause::Overtemp => write!(f, "OVERTEMP"),
            TripCause::VibrationInterlock => write!(f, "VIB_INTERLOCK"),
        }
    }
}

/// Cause identifier plus optional numeric detail (e.g. "P=7.5 bar, T=72.0°C").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub cause: Cause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Reason {
    pub fn new(cause: Cause) -> Self {
        Self {
            cause,
            detail: None,
        }
    }

    pub fn with_detail(cause: Cause, detail: String) -> Self {
        Self {
            cause,
            detail: Some(detail),
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} [{}]", self.cause.message(), detail),
            None => write!(f, "{}", self.cause.message()),
        }
    }
}

/// Per-invocation engine output, handed unchanged to every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: HealthStatus,
    pub reason: Reason,
    /// Risk shown to operators, after smoothing, floors and ceilings
    pub display_probability: f64,
    /// Primary trip code when a stop-eligible cause fired
    pub trip_cause: Option<TripCause>,
    /// Every cause whose condition (entry or hold) held, in cascade order
    pub active_causes: Vec<Cause>,
    /// Mean of the smoothed risk history
    pub smoothed_risk: f64,
    /// Zero-based invocation index for this asset
    pub invocation: u64,
}

impl Verdict {
    /// True when no physical cause fired and the reason is model-derived.
    pub fn is_model_only(&self) -> bool {
        self.reason.cause.is_model_derived() && self.trip_cause.is_none()
    }

    pub fn has_active(&self, cause: Cause) -> bool {
        self.active_causes.contains(&cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(HealthStatus::Critical > HealthStatus::Warning);
        assert!(HealthStatus::Warning > HealthStatus::Healthy);
        assert!(!HealthStatus::Healthy.is_alert());
        assert!(HealthStatus::Warning.is_alert());
    }

    #[test]
    fn test_model_causes_are_never_trip_eligible() {
        for cause in [Cause::HighRisk, Cause::ElevatedRisk, Cause::Nominal] {
            assert!(cause.is_model_derived());
            assert!(cause.trip_cause().is_none());
        }
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&HealthStatus::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        let json = serde_json::to_string(&Cause::VibrationZoneD).unwrap();
        assert_eq!(json, "\"VIBRATION_ZONE_D\"");
    }

    #[test]
    fn test_reason_display_includes_detail() {
        let reason = Reason::with_detail(Cause::ChokedDischarge, "P=7.5 bar".to_string());
        let text = reason.to_string();
        assert!(text.starts_with("CHOKED DISCHARGE"));
        assert!(text.contains("P=7.5 bar"));
    }
}
