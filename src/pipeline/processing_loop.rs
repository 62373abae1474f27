//! Record processing loop shared across all input modes.
//!
//! Pulls records from a [`TelemetrySource`], routes each one to its asset's
//! monitor, evaluates it, asks the shutdown advisor, then fans the verdict
//! out to the sinks. Records are processed strictly in arrival order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::source::{SourceEvent, TelemetrySource};
use crate::config::defaults::{MAX_TRACKED_ASSETS, STATS_LOG_INTERVAL};
use crate::engine::{EngineState, HealthEngine};
use crate::shutdown::ShutdownAdvisor;
use crate::sinks::{SinkSet, VerdictEvent};
use crate::types::{HealthStatus, TelemetryRecord};

// ============================================================================
// Asset Monitor
// ============================================================================

/// Per-asset memory: the engine state plus stream bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AssetMonitor {
    pub state: EngineState,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub records: u64,
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub records_processed: u64,
    pub records_dropped: u64,
    pub healthy: u64,
    pub warning: u64,
    pub critical: u64,
    pub shutdowns_recommended: u64,
    pub sink_failures: u64,
    pub assets: usize,
}

impl PipelineStats {
    fn count(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Warning => self.warning += 1,
            HealthStatus::Critical => self.critical += 1,
        }
    }
}

impl std::fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pipeline: {} records ({} dropped) over {} assets, {} healthy / {} warning / {} critical, {} shutdowns, {} sink failures",
            self.records_processed,
            self.records_dropped,
            self.assets,
            self.healthy,
            self.warning,
            self.critical,
            self.shutdowns_recommended,
            self.sink_failures
        )
    }
}

// ============================================================================
// Processing Loop
// ============================================================================

/// Owns all state needed for the record processing loop.
///
/// Built with [`new()`](ProcessingLoop::new) and consumed by
/// [`run()`](ProcessingLoop::run); [`process_record()`](ProcessingLoop::process_record)
/// is public for embedding without a source.
pub struct ProcessingLoop {
    engine: HealthEngine,
    advisor: ShutdownAdvisor,
    sinks: SinkSet,
    monitors: HashMap<String, AssetMonitor>,
    default_asset: String,
    cancel_token: CancellationToken,
    stats: PipelineStats,
}

impl ProcessingLoop {
    pub fn new(engine: HealthEngine, sinks: SinkSet, cancel_token: CancellationToken) -> Self {
        let advisor = ShutdownAdvisor::new(engine.config());
        let default_asset = engine.config().asset.name.clone();
        Self {
            engine,
            advisor,
            sinks,
            monitors: HashMap::new(),
            default_asset,
            cancel_token,
            stats: PipelineStats::default(),
        }
    }

    /// Seed the monitor of `asset_id` with a previously persisted state.
    pub fn with_state(mut self, asset_id: impl Into<String>, state: EngineState) -> Self {
        self.monitors.insert(
            asset_id.into(),
            AssetMonitor {
                state,
                ..AssetMonitor::default()
            },
        );
        self
    }

    pub fn monitor(&self, asset_id: &str) -> Option<&AssetMonitor> {
        self.monitors.get(asset_id)
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Evaluate one record and publish the verdict.
    ///
    /// Returns `None` when the record was dropped (asset limit reached).
    pub fn process_record(&mut self, record: TelemetryRecord) -> Option<VerdictEvent> {
        let asset_id = if record.asset_id.is_empty() {
            self.default_asset.clone()
        } else {
            record.asset_id
        };

        if !self.monitors.contains_key(&asset_id) && self.monitors.len() >= MAX_TRACKED_ASSETS {
            self.stats.records_dropped += 1;
            warn!(asset = %asset_id, limit = MAX_TRACKED_ASSETS, "Asset limit reached, dropping record");
            return None;
        }
        let monitor = self.monitors.entry(asset_id.clone()).or_insert_with(|| {
            info!(asset = %asset_id, "Tracking new asset");
            AssetMonitor::default()
        });

        let timestamp = record.timestamp.unwrap_or_else(Utc::now);
        if let (Some(ts), Some(last)) = (record.timestamp, monitor.last_timestamp) {
            if ts < last {
                warn!(asset = %asset_id, %ts, %last, "Out-of-order record, evaluating in arrival order");
            }
        }

        let mut state = std::mem::take(&mut monitor.state);
        let previous_status = state.previous_status;
        let window = self.engine.push_sample(&mut state, record.features);
        let (verdict, next) = self.engine.evaluate(&window, &record.model, state);
        let shutdown = self.advisor.advise(&verdict, &next, &window);

        monitor.state = next;
        monitor.last_timestamp = record.timestamp.or(monitor.last_timestamp);
        monitor.records += 1;

        self.stats.records_processed += 1;
        self.stats.assets = self.monitors.len();
        self.stats.count(verdict.status);
        if shutdown.is_some() {
            self.stats.shutdowns_recommended += 1;
        }

        let event = VerdictEvent {
            asset_id,
            timestamp,
            previous_status,
            verdict,
            shutdown,
        };
        self.stats.sink_failures += self.sinks.publish(&event) as u64;
        Some(event)
    }

    /// Run the processing loop until the source is exhausted or cancellation.
    ///
    /// Returns final pipeline statistics.
    pub async fn run<S: TelemetrySource>(mut self, source: &mut S) -> PipelineStats {
        info!(
            source = source.source_name(),
            sinks = ?self.sinks,
            "Processing telemetry"
        );

        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    info!("[ProcessingLoop] Shutdown signal received");
                    break;
                }
                result = source.next_record() => {
                    match result {
                        Ok(ev) => ev,
                        Err(e) => {
                            warn!("[ProcessingLoop] Source error: {}", e);
                            break;
                        }
                    }
                }
            };

            let record = match event {
                SourceEvent::Record(r) => r,
                SourceEvent::Eof => {
                    info!(
                        "[ProcessingLoop] Source reached end ({} records processed)",
                        self.stats.records_processed
                    );
                    break;
                }
            };

            self.process_record(record);

            if self.stats.records_processed % STATS_LOG_INTERVAL == 0 {
                info!("Progress: {}", self.stats);
            }
        }

        info!("Final statistics: {}", self.stats);
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::sinks::InMemorySink;
    use crate::types::{Cause, FeatureSample, ModelOutput};
    use std::sync::Arc;

    fn record(asset: &str, features: FeatureSample, risk: f64) -> TelemetryRecord {
        TelemetryRecord {
            asset_id: asset.to_string(),
            timestamp: None,
            features,
            model: ModelOutput::from_risk(risk),
        }
    }

    fn processing_loop(sink: &InMemorySink) -> ProcessingLoop {
        let engine = HealthEngine::new(Arc::new(EngineConfig::default()));
        ProcessingLoop::new(engine, SinkSet::new().with(sink.clone()), CancellationToken::new())
    }

    #[test]
    fn test_assets_are_isolated() {
        let sink = InMemorySink::new(16);
        let mut pl = processing_loop(&sink);
        let hot = FeatureSample { vib_rms: 8.0, ..FeatureSample::default() };
        let a = pl.process_record(record("a", hot, 0.5)).unwrap();
        let b = pl.process_record(record("b", FeatureSample::default(), 0.05)).unwrap();
        assert_eq!(a.verdict.status, HealthStatus::Critical);
        assert_eq!(b.verdict.status, HealthStatus::Healthy);
        assert_eq!(pl.monitor("a").unwrap().state.previous_causes, vec![Cause::VibrationZoneD]);
        assert!(pl.monitor("b").unwrap().state.previous_causes.is_empty());
        assert_eq!(pl.stats().assets, 2);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_empty_asset_id_uses_configured_name() {
        let sink = InMemorySink::new(4);
        let mut pl = processing_loop(&sink);
        let event = pl.process_record(record("", FeatureSample::default(), 0.0)).unwrap();
        assert_eq!(event.asset_id, "pump-01");
        assert!(event.previous_status.is_none());
    }

    #[test]
    fn test_shutdown_recommended_for_debris() {
        let sink = InMemorySink::new(4);
        let mut pl = processing_loop(&sink);
        let hit = FeatureSample { debris_impact: Some(true), ..FeatureSample::default() };
        let event = pl.process_record(record("a", hit, 0.3)).unwrap();
        assert_eq!(event.verdict.reason.cause, Cause::DebrisImpact);
        assert!(event.shutdown.is_some());
        assert_eq!(pl.stats().shutdowns_recommended, 1);
    }
}
