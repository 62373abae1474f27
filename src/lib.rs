//! Pump Sentinel: Pump Health Decision Engine
//!
//! Fuses a classifier's three-way risk distribution with rule-based physical
//! diagnostics into one stable verdict per invocation.
//!
//! ## Architecture
//!
//! - **Engine**: smoothing, ordered rule cascade, hysteresis, vibration
//!   interlock and final normalizer over a per-asset [`EngineState`]
//! - **Shutdown Advisor**: maps verdicts to stop recommendations
//! - **Sinks**: JSONL verdict log, status publisher, alert notifier
//! - **Pipeline**: async source trait plus the per-asset processing loop

pub mod config;
pub mod engine;
pub mod pipeline;
pub mod shutdown;
pub mod sinks;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, EngineConfig};

// Re-export commonly used types
pub use types::{
    Cause, FeatureSample, FeatureWindow, HealthStatus, ModelOutput, Reason, TelemetryRecord,
    TripCause, Verdict,
};

// Re-export the engine
pub use engine::{EngineState, HealthEngine};

// Re-export shutdown advisor
pub use shutdown::{ShutdownAction, ShutdownAdvisor};

// Re-export sinks
pub use sinks::{SinkError, SinkSet, VerdictEvent, VerdictSink};
