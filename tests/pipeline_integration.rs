//! Pipeline Integration Tests
//!
//! Runs JSON Lines telemetry through the async processing loop into real
//! sinks: the in-memory capture, the JSONL verdict log and the alert
//! notifier.

use pump_sentinel::config::EngineConfig;
use pump_sentinel::engine::HealthEngine;
use pump_sentinel::pipeline::{JsonLinesSource, ProcessingLoop, ReplaySource};
use pump_sentinel::sinks::{AlertNotifier, InMemorySink, JsonlVerdictLog, SinkSet, VerdictEvent};
use pump_sentinel::types::{
    Cause, FeatureSample, HealthStatus, ModelOutput, TelemetryRecord, TripCause,
};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn engine() -> HealthEngine {
    HealthEngine::new(Arc::new(EngineConfig::default()))
}

fn record(asset: &str, features: FeatureSample, risk: f64) -> TelemetryRecord {
    TelemetryRecord {
        asset_id: asset.to_string(),
        timestamp: None,
        features,
        model: ModelOutput::from_risk(risk),
    }
}

fn nominal() -> FeatureSample {
    FeatureSample {
        vib_rms: 2.5,
        vib_crest: 3.0,
        current: 45.0,
        pressure: 6.0,
        temp: 40.0,
        ..FeatureSample::default()
    }
}

#[tokio::test]
async fn jsonl_file_to_verdict_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("telemetry.jsonl");
    let log_path = dir.path().join("out").join("verdicts.jsonl");

    {
        let mut f = std::fs::File::create(&input).unwrap();
        let healthy = record("P-1", nominal(), 0.05);
        let cavitating = record(
            "P-1",
            FeatureSample { current: 60.0, pressure: 3.5, vib_rms: 9.5, ..nominal() },
            0.7,
        );
        writeln!(f, "{}", serde_json::to_string(&healthy).unwrap()).unwrap();
        writeln!(f, "this line is not json").unwrap();
        for _ in 0..3 {
            writeln!(f, "{}", serde_json::to_string(&cavitating).unwrap()).unwrap();
        }
    }

    let capture = InMemorySink::new(64);
    let sinks = SinkSet::new()
        .with(capture.clone())
        .with(JsonlVerdictLog::open(&log_path).unwrap());
    let processing = ProcessingLoop::new(engine(), sinks, CancellationToken::new());

    let mut source = JsonLinesSource::open(&input).await.unwrap();
    let stats = processing.run(&mut source).await;

    assert_eq!(source.skipped(), 1);
    assert_eq!(stats.records_processed, 4);
    assert_eq!(stats.healthy, 1);
    assert_eq!(stats.critical, 3);
    assert_eq!(stats.sink_failures, 0);

    let events = capture.events();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].verdict.reason.cause, Cause::Nominal);
    assert!(events[1].status_changed());
    assert_eq!(events[1].verdict.reason.cause, Cause::Cavitation);
    assert_eq!(events[1].verdict.trip_cause, Some(TripCause::Cavitation));

    let logged: Vec<VerdictEvent> = std::fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(logged.len(), 4);
    assert_eq!(logged[3].asset_id, "P-1");
    assert_eq!(logged[3].verdict.status, HealthStatus::Critical);
}

#[tokio::test]
async fn sustained_cavitation_recommends_shutdown() {
    let cav = FeatureSample { current: 60.0, pressure: 3.5, vib_rms: 9.5, ..nominal() };
    let records = (0..5).map(|_| record("P-2", cav, 0.8)).collect();
    let capture = InMemorySink::new(16);
    let notifier = AlertNotifier::new(16);
    let sinks = SinkSet::new().with(capture.clone()).with(notifier.clone());
    let processing = ProcessingLoop::new(engine(), sinks, CancellationToken::new());

    let stats = processing.run(&mut ReplaySource::new(records, 0)).await;
    assert_eq!(stats.records_processed, 5);
    assert_eq!(stats.shutdowns_recommended, 2);

    let events = capture.events();
    assert!(events[..3].iter().all(|e| e.shutdown.is_none()));
    let action = events[3].shutdown.as_ref().unwrap();
    assert_eq!(action.trip_cause, TripCause::Cavitation);
    assert_eq!(action.sustained_steps, 4);

    // Entry alert, then one per stop recommendation
    let alerts = notifier.drain();
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0].cause, Cause::Cavitation);
    assert!(!alerts[0].shutdown_recommended);
    assert!(alerts[1].shutdown_recommended);
}

#[tokio::test]
async fn cancelled_loop_stops_before_reading() {
    let token = CancellationToken::new();
    token.cancel();
    let capture = InMemorySink::new(4);
    let processing = ProcessingLoop::new(engine(), SinkSet::new().with(capture.clone()), token);
    let records = vec![record("P-3", nominal(), 0.0)];
    let stats = processing.run(&mut ReplaySource::new(records, 0)).await;
    assert_eq!(stats.records_processed, 0);
    assert!(capture.is_empty());
}

#[tokio::test]
async fn interleaved_assets_keep_independent_state() {
    let hot = FeatureSample { vib_rms: 8.0, ..nominal() };
    let records = vec![
        record("A", hot, 0.4),
        record("B", nominal(), 0.05),
        record("A", hot, 0.4),
        record("B", nominal(), 0.05),
    ];
    let capture = InMemorySink::new(8);
    let processing = ProcessingLoop::new(engine(), SinkSet::new().with(capture.clone()), CancellationToken::new());
    let stats = processing.run(&mut ReplaySource::new(records, 0)).await;
    assert_eq!(stats.assets, 2);

    for event in capture.events() {
        match event.asset_id.as_str() {
            "A" => assert_eq!(event.verdict.reason.cause, Cause::VibrationZoneD),
            "B" => assert_eq!(event.verdict.status, HealthStatus::Healthy),
            other => panic!("unexpected asset {other}"),
        }
    }
}
