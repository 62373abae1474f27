//! Shared data structures for the pump health decision engine
//!
//! - `FeatureSample` / `FeatureWindow`: validated feature vectors (input)
//! - `ModelOutput`: classifier class distribution (input)
//! - `Verdict`, `HealthStatus`, `Cause`, `TripCause`: engine output
//! - `TelemetryRecord`: one line of the JSONL telemetry stream

mod features;
mod model;
mod verdict;

pub use features::*;
pub use model::*;
pub use verdict::*;

use serde::{Deserialize, Serialize};

/// One inference batch for one asset: the latest feature sample and the
/// classifier output computed for that batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Empty when the stream carries a single unnamed asset
    #[serde(default)]
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub features: FeatureSample,
    pub model: ModelOutput,
}

impl TelemetryRecord {
    /// True when every numeric input is finite and the model output is a
    /// plausible distribution.
    pub fn is_well_formed(&self) -> bool {
        let f = &self.features;
        let m = &self.model;
        [
            f.vib_rms,
            f.vib_crest,
            f.vib_kurtosis,
            f.current,
            f.pressure,
            f.temp,
            f.temp_delta,
            f.cavitation_index,
            m.healthy,
            m.warning,
            m.critical,
        ]
        .iter()
        .all(|v| v.is_finite())
            && m.warning >= 0.0
            && m.critical >= 0.0
    }
}
