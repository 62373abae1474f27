//! Pump Telemetry Simulation
//!
//! Generates synthetic telemetry records (features plus a heuristic
//! classifier output) for exercising pump-sentinel. Scenarios:
//! - Healthy operation (Zone B, nominal flow)
//! - Degradation (worn impeller: low current, low pressure)
//! - Cavitation (high current, collapsed pressure, heavy vibration)
//! - Choked discharge (low current, high pressure, rising temperature)
//! - Debris impact (impulsive crest, flagged impacts)
//! - Overtemperature (temperature ramp past the critical limit)
//! - Vibration (velocity ramp through zones C and D to the interlock)
//!
//! # Usage
//! ```bash
//! ./simulation --scenario all --speed 0 | ./pump-sentinel run
//! ```

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::{self, Write};
use std::time::Duration;

use pump_sentinel::config::defaults::{SIMULATION_BASE_DELAY_MS, SIMULATION_PHASE_LENGTH};
use pump_sentinel::types::{FeatureSample, ModelOutput, TelemetryRecord};

// ============================================================================
// Operating Point
// ============================================================================

/// Nominal vibration velocity (mm/s RMS)
const BASE_VIB: f64 = 2.6;
/// Nominal crest factor
const BASE_CREST: f64 = 3.0;
/// Nominal motor current (A)
const BASE_CURRENT: f64 = 45.0;
/// Nominal discharge pressure (bar)
const BASE_PRESSURE: f64 = 6.0;
/// Nominal casing temperature (°C)
const BASE_TEMP: f64 = 40.0;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "pump-simulation")]
#[command(about = "Synthetic pump telemetry for pump-sentinel testing")]
#[command(version = "1.0")]
struct Args {
    /// Scenario to simulate
    #[arg(long, value_enum, default_value = "all")]
    scenario: Scenario,

    /// Asset identifier stamped on every record
    #[arg(long, default_value = "pump-01")]
    asset: String,

    /// Records per scenario phase
    #[arg(long, default_value_t = SIMULATION_PHASE_LENGTH)]
    phase_length: usize,

    /// Speed multiplier (1 = one record per second, 0 = no delay)
    #[arg(short, long, default_value = "0")]
    speed: u64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress the scenario log on stderr
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================================
// Scenarios
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Healthy,
    Degradation,
    Cavitation,
    Choked,
    Debris,
    Overtemp,
    Vibration,
    /// Every fault scenario in turn, each followed by a healthy recovery phase
    All,
}

impl Scenario {
    const FAULTS: [Scenario; 6] = [
        Scenario::Degradation,
        Scenario::Cavitation,
        Scenario::Choked,
        Scenario::Debris,
        Scenario::Overtemp,
        Scenario::Vibration,
    ];

    fn name(self) -> &'static str {
        match self {
            Scenario::Healthy => "Healthy Operation",
            Scenario::Degradation => "Degradation (Worn Impeller)",
            Scenario::Cavitation => "Cavitation",
            Scenario::Choked => "Choked Discharge",
            Scenario::Debris => "Debris Impact",
            Scenario::Overtemp => "Overtemperature",
            Scenario::Vibration => "Vibration Ramp (Zone C -> D -> Interlock)",
            Scenario::All => "All Scenarios",
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Scenario::Healthy => "HEALTHY, nominal",
            Scenario::Degradation => "WARNING, maintenance required",
            Scenario::Cavitation => "CRITICAL, cavitation trip once sustained",
            Scenario::Choked => "CRITICAL, immediate choked discharge trip",
            Scenario::Debris => "CRITICAL, immediate debris trip",
            Scenario::Overtemp => "WARNING then CRITICAL overtemperature",
            Scenario::Vibration => "WARNING zone C, CRITICAL zone D, interlock",
            Scenario::All => "",
        }
    }

    /// Phases to run, in order.
    fn phases(self) -> Vec<Scenario> {
        match self {
            Scenario::All => {
                let mut phases = vec![Scenario::Healthy];
                for fault in Self::FAULTS {
                    phases.push(fault);
                    phases.push(Scenario::Healthy);
                }
                phases
            }
            other => vec![Scenario::Healthy, other],
        }
    }
}

// ============================================================================
// Simulation State
// ============================================================================

struct SimulationState {
    rng: StdRng,
    asset: String,
    clock: DateTime<Utc>,
    records_generated: u64,
    anomaly_records: u64,
    small_noise: Normal<f64>,
    model_noise: Normal<f64>,
}

impl SimulationState {
    fn new(asset: String, seed: Option<u64>) -> Result<Self, rand_distr::NormalError> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            asset,
            clock: Utc::now(),
            records_generated: 0,
            anomaly_records: 0,
            small_noise: Normal::new(0.0, 0.02)?,
            model_noise: Normal::new(0.0, 0.03)?,
        })
    }

    fn jitter(&mut self, value: f64) -> f64 {
        value * (1.0 + self.small_noise.sample(&mut self.rng))
    }

    /// Features for step `i` of `n` in `scenario`.
    fn features(&mut self, scenario: Scenario, i: usize, n: usize) -> FeatureSample {
        let progress = if n > 1 { i as f64 / (n - 1) as f64 } else { 1.0 };
        let mut s = FeatureSample {
            vib_rms: self.jitter(BASE_VIB),
            vib_crest: self.jitter(BASE_CREST),
            vib_kurtosis: self.jitter(3.0),
            current: self.jitter(BASE_CURRENT),
            pressure: self.jitter(BASE_PRESSURE),
            temp: self.jitter(BASE_TEMP),
            temp_delta: 0.0,
            cavitation_index: self.jitter(0.1),
            debris_impact: None,
        };

        match scenario {
            Scenario::Healthy | Scenario::All => {}
            Scenario::Degradation => {
                s.current = self.jitter(38.0);
                s.pressure = self.jitter(4.8);
                s.vib_rms = self.jitter(3.2);
            }
            Scenario::Cavitation => {
                s.current = self.jitter(58.0);
                s.pressure = self.jitter(3.4);
                s.vib_rms = self.jitter(9.6);
                s.vib_crest = self.jitter(4.2);
                s.cavitation_index = self.jitter(2.8);
            }
            Scenario::Choked => {
                s.current = self.jitter(34.0);
                s.pressure = self.jitter(7.8);
                s.temp = self.jitter(68.0 + 8.0 * progress);
                s.temp_delta = 1.5;
            }
            Scenario::Debris => {
                let impact = i % 3 == 1;
                s.debris_impact = Some(impact);
                if impact {
                    s.vib_crest = self.jitter(7.5);
                    s.vib_rms = self.jitter(7.8);
                    s.vib_kurtosis = self.jitter(9.0);
                }
            }
            Scenario::Overtemp => {
                s.temp = self.jitter(55.0 + 30.0 * progress);
                s.temp_delta = 30.0 / n.max(1) as f64;
            }
            Scenario::Vibration => {
                s.vib_rms = self.jitter(4.0 + 6.5 * progress);
            }
        }
        s
    }

    /// Heuristic classifier output: risk grows with the scenario's severity.
    fn model(&mut self, scenario: Scenario, i: usize, n: usize) -> ModelOutput {
        let progress = if n > 1 { i as f64 / (n - 1) as f64 } else { 1.0 };
        let severity = match scenario {
            Scenario::Healthy | Scenario::All => 0.05,
            Scenario::Degradation => 0.35 + 0.15 * progress,
            Scenario::Cavitation => 0.80 + 0.15 * progress,
            Scenario::Choked => 0.70 + 0.20 * progress,
            Scenario::Debris => 0.55,
            Scenario::Overtemp => 0.30 + 0.50 * progress,
            Scenario::Vibration => 0.20 + 0.75 * progress,
        };
        let risk = (severity + self.model_noise.sample(&mut self.rng)).clamp(0.0, 1.0);
        let critical = risk * risk;
        ModelOutput::new(1.0 - risk, risk - critical, critical)
    }

    fn next_record(&mut self, scenario: Scenario, i: usize, n: usize) -> TelemetryRecord {
        self.records_generated += 1;
        if scenario != Scenario::Healthy {
            self.anomaly_records += 1;
        }
        self.clock += chrono::Duration::seconds(1);
        let features = self.features(scenario, i, n);
        let model = self.model(scenario, i, n);
        TelemetryRecord {
            asset_id: self.asset.clone(),
            timestamp: Some(self.clock),
            features,
            model,
        }
    }
}

// ============================================================================
// Logging Utilities
// ============================================================================

fn log_mission(step: u64, message: &str, quiet: bool) {
    if !quiet {
        eprintln!("[{step:>5}] {message}");
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut state = SimulationState::new(args.asset.clone(), args.seed)?;

    let delay = if args.speed == 0 {
        None
    } else {
        Some(Duration::from_millis(SIMULATION_BASE_DELAY_MS / args.speed))
    };
    let phases = args.scenario.phases();
    let n = args.phase_length.max(1);

    log_mission(0, &"=".repeat(70), args.quiet);
    log_mission(0, "PUMP TELEMETRY SIMULATION v1.0", args.quiet);
    log_mission(0, &"=".repeat(70), args.quiet);
    log_mission(0, &format!("  Asset: {}", args.asset), args.quiet);
    log_mission(0, &format!("  Scenario: {}", args.scenario.name()), args.quiet);
    log_mission(0, &format!("  Phases: {} x {} records", phases.len(), n), args.quiet);
    if let Some(seed) = args.seed {
        log_mission(0, &format!("  Random seed: {seed}"), args.quiet);
    }
    log_mission(0, &"=".repeat(70), args.quiet);

    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();

    for phase in phases {
        log_mission(state.records_generated, &format!(">>> PHASE: {}", phase.name()), args.quiet);
        log_mission(state.records_generated, &format!("    Expected: {}", phase.expected()), args.quiet);

        for i in 0..n {
            let record = state.next_record(phase, i, n);
            writeln!(stdout_lock, "{}", serde_json::to_string(&record)?)?;
            stdout_lock.flush()?;
            if let Some(d) = delay {
                std::thread::sleep(d);
            }
        }
    }

    stdout_lock.flush()?;
    drop(stdout_lock);

    log_mission(state.records_generated, &"=".repeat(70), args.quiet);
    log_mission(state.records_generated, "SIMULATION COMPLETE", args.quiet);
    log_mission(state.records_generated, &format!("Total records: {}", state.records_generated), args.quiet);
    log_mission(state.records_generated, &format!("Anomaly records: {}", state.anomaly_records), args.quiet);
    log_mission(state.records_generated, &"=".repeat(70), args.quiet);

    Ok(())
}
