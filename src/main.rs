//! Pump Sentinel - Pump Health Decision Engine
//!
//! Reads telemetry records (features plus classifier output) as JSON Lines
//! and emits one verdict per record.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate a recorded stream
//! pump-sentinel run --input telemetry.jsonl --verdict-log verdicts.jsonl
//!
//! # Pipe the synthetic scenario generator
//! simulation --scenario all | pump-sentinel run
//!
//! # Inspect configuration
//! pump-sentinel check-config --config pump_sentinel.toml
//! pump-sentinel print-config
//! ```
//!
//! # Environment Variables
//!
//! - `PUMP_SENTINEL_CONFIG`: Path to the engine configuration TOML
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pump_sentinel::config::EngineConfig;
use pump_sentinel::engine::HealthEngine;
use pump_sentinel::pipeline::{JsonLinesSource, PipelineStats, ProcessingLoop, TelemetrySource};
use pump_sentinel::sinks::{AlertNotifier, JsonlVerdictLog, SinkSet, StatusPublisher};

/// Alerts kept in the notifier outbox before the oldest are dropped
const ALERT_OUTBOX_CAPACITY: usize = 256;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "pump-sentinel")]
#[command(about = "Pump health decision engine")]
#[command(version)]
struct CliArgs {
    /// Engine configuration file (overrides $PUMP_SENTINEL_CONFIG and ./pump_sentinel.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate telemetry records and publish verdicts
    Run {
        /// JSON Lines telemetry file (default: stdin)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Verdict log path (overrides `output.verdict_log`)
        #[arg(long, value_name = "FILE")]
        verdict_log: Option<PathBuf>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,

    /// Print the effective configuration as TOML
    PrintConfig,
}

// ============================================================================
// Logging
// ============================================================================

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load engine configuration")
}

fn check_config(path: Option<&Path>) -> Result<()> {
    let cfg = load_config(path)?;
    info!(
        asset = %cfg.asset.name,
        zone_d = cfg.thresholds.vibration.zone_d_mm_s,
        interlock = cfg.thresholds.vibration.interlock_mm_s,
        critical = cfg.probability.critical_threshold,
        "Configuration OK"
    );
    Ok(())
}

fn print_config(path: Option<&Path>) -> Result<()> {
    let cfg = load_config(path)?;
    let toml = cfg.to_toml().context("Failed to serialize configuration")?;
    print!("{toml}");
    Ok(())
}

async fn run(
    cfg: EngineConfig,
    input: Option<PathBuf>,
    verdict_log: Option<PathBuf>,
) -> Result<PipelineStats> {
    let log_path = verdict_log.unwrap_or_else(|| cfg.output.verdict_log.clone());
    let log = JsonlVerdictLog::open(&log_path)
        .with_context(|| format!("Failed to open verdict log {}", log_path.display()))?;
    let notifier = AlertNotifier::new(ALERT_OUTBOX_CAPACITY);
    let sinks = SinkSet::new()
        .with(log)
        .with(StatusPublisher::new(cfg.output.publish_every_verdict))
        .with(notifier.clone());

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Pump Sentinel - Pump Health Decision Engine");
    info!("  Asset: {} | Site: {}", cfg.asset.name, if cfg.asset.site.is_empty() { "unset" } else { &cfg.asset.site });
    info!("  Verdict log: {}", log_path.display());
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let engine = HealthEngine::new(Arc::new(cfg));
    let processing = ProcessingLoop::new(engine, sinks, cancel_token);

    let stats = match input {
        Some(path) => {
            let mut source = JsonLinesSource::open(&path).await?;
            drive(processing, &mut source).await
        }
        None => {
            let mut source = JsonLinesSource::stdin();
            drive(processing, &mut source).await
        }
    };

    let alerts = notifier.drain();
    if !alerts.is_empty() {
        info!(count = alerts.len(), "Alerts raised during run");
    }
    Ok(stats)
}

async fn drive<S: TelemetrySource>(processing: ProcessingLoop, source: &mut S) -> PipelineStats {
    info!("Input: {}", source.source_name());
    processing.run(source).await
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.json_logs);

    let config_path = args.config.as_deref();
    match args.command {
        Command::CheckConfig => check_config(config_path),
        Command::PrintConfig => print_config(config_path),
        Command::Run { input, verdict_log } => {
            let cfg = load_config(config_path)?;
            let stats = run(cfg, input, verdict_log).await?;
            if stats.sink_failures > 0 {
                warn!(failures = stats.sink_failures, "Some verdicts were not delivered to every sink");
            }
            Ok(())
        }
    }
}
