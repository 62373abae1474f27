//! Processing Pipeline Module
//!
//! ```text
//! TelemetrySource ──▶ ProcessingLoop ──▶ per-asset AssetMonitor
//!                                          │
//!                                          ├─ HealthEngine (push_sample, evaluate)
//!                                          ├─ ShutdownAdvisor
//!                                          └─ SinkSet (log, status, alerts)
//! ```
//!
//! Sinks run after the asset's engine state has been updated; their failures
//! are counted and logged but never touch engine state.

pub mod processing_loop;
pub mod source;

pub use processing_loop::{AssetMonitor, PipelineStats, ProcessingLoop};
pub use source::{JsonLinesSource, ReplaySource, SourceEvent, TelemetrySource};
