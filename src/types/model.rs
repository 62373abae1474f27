//! Classifier output contract

use serde::{Deserialize, Serialize};

/// Three-way class distribution produced by the external classifier for the
/// current feature window (0 = Healthy, 1 = Warning, 2 = Critical).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub healthy: f64,
    pub warning: f64,
    pub critical: f64,
}

impl Default for ModelOutput {
    fn default() -> Self {
        Self {
            healthy: 1.0,
            warning: 0.0,
            critical: 0.0,
        }
    }
}

impl ModelOutput {
    pub fn new(healthy: f64, warning: f64, critical: f64) -> Self {
        Self {
            healthy,
            warning,
            critical,
        }
    }

    /// Distribution with `risk` split evenly between the two anomaly classes.
    pub fn from_risk(risk: f64) -> Self {
        let risk = risk.clamp(0.0, 1.0);
        Self {
            healthy: 1.0 - risk,
            warning: risk / 2.0,
            critical: risk / 2.0,
        }
    }

    /// Anomaly probability: P(Warning) + P(Critical), clamped to [0, 1].
    pub fn risk(&self) -> f64 {
        (self.warning + self.critical).clamp(0.0, 1.0)
    }
}
