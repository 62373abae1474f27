//! Engine Configuration - every decision threshold as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the values of the pump's operating
//! instruction, so an absent config file gives the reference behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "PUMP_SENTINEL_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pump_sentinel.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one deployment of the decision engine.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. explicit path (`--config`)
/// 2. `$PUMP_SENTINEL_CONFIG` env var
/// 3. `./pump_sentinel.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Asset identification
    #[serde(default)]
    pub asset: AssetInfo,

    /// Feature and risk smoothing
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// Model-risk status thresholds and display mapping
    #[serde(default)]
    pub probability: ProbabilityConfig,

    /// Physical cause thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Nominal-recovery reset band
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Shutdown advisor sustain requirements
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    /// Verdict sinks
    #[serde(default)]
    pub output: OutputConfig,
}

impl EngineConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path or a config named by the environment must load and
    /// validate; failures there are fatal. The local file is only tried when
    /// neither is given.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. Explicit path
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), asset = %config.asset.name, "Loaded engine config from --config");
            return Ok(config);
        }

        // 2. Env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), asset = %config.asset.name, "Loaded engine config from {CONFIG_ENV_VAR}");
                return Ok(config);
            }
            warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
        }

        // 3. ./pump_sentinel.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!(asset = %config.asset.name, "Loaded engine config from ./{LOCAL_CONFIG_FILE}");
            return Ok(config);
        }

        // 4. Defaults
        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Two-pass: unknown keys are reported as warnings first, then the
    /// document goes through serde and `validate()`.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let typo_warnings = super::validation::validate_unknown_keys(contents);
        for w in &typo_warnings {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all thresholds for internal consistency.
    ///
    /// Rules:
    /// - Probabilities and alphas lie in [0, 1]
    /// - Vibration exits sit below their entries, zone D above zone C,
    ///   the interlock above zone D
    /// - Degradation and cavitation exits sit beyond their entries
    /// - Window, history and dwell sizes are > 0
    /// - Every value is finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Smoothing
        let s = &self.smoothing;
        if s.feature_window == 0 {
            errors.push("smoothing.feature_window must be > 0".to_string());
        }
        if s.risk_history == 0 {
            errors.push("smoothing.risk_history must be > 0".to_string());
        }
        for (name, value) in [
            ("smoothing.alpha_rising", s.alpha_rising),
            ("smoothing.alpha_falling", s.alpha_falling),
            ("smoothing.alpha_very_high", s.alpha_very_high),
            ("smoothing.high_risk_threshold", s.high_risk_threshold),
        ] {
            Self::check_unit_interval(value, name, &mut errors);
        }
        if s.alpha_rising < s.alpha_falling {
            errors.push(format!(
                "smoothing.alpha_rising ({:.2}) must be >= alpha_falling ({:.2})",
                s.alpha_rising, s.alpha_falling
            ));
        }

        // Probability
        let p = &self.probability;
        for (name, value) in [
            ("probability.warning_threshold", p.warning_threshold),
            ("probability.critical_threshold", p.critical_threshold),
            ("probability.startup_critical_threshold", p.startup_critical_threshold),
            ("probability.display_compress_start", p.display_compress_start),
            ("probability.display_compress_floor", p.display_compress_floor),
            ("probability.risk_hold_threshold", p.risk_hold_threshold),
            ("probability.critical_display_floor", p.critical_display_floor),
            ("probability.warning_display_floor", p.warning_display_floor),
            ("probability.trip_display_floor", p.trip_display_floor),
        ] {
            Self::check_unit_interval(value, name, &mut errors);
        }
        Self::check_escalation(
            p.warning_threshold,
            p.critical_threshold,
            "probability.model_status",
            &mut errors,
        );
        Self::check_escalation(
            p.critical_threshold,
            p.startup_critical_threshold,
            "probability.startup_critical",
            &mut errors,
        );
        if p.risk_hold_threshold >= p.warning_threshold {
            errors.push(format!(
                "probability.risk_hold_threshold ({:.2}) must be less than warning_threshold ({:.2})",
                p.risk_hold_threshold, p.warning_threshold
            ));
        }

        // Vibration zones: exit < entry, C < D < interlock
        let v = &self.thresholds.vibration;
        if v.zone_c_exit_mm_s >= v.zone_c_mm_s {
            errors.push(format!(
                "vibration.zone_c_exit_mm_s ({:.2}) must be less than zone_c_mm_s ({:.2})",
                v.zone_c_exit_mm_s, v.zone_c_mm_s
            ));
        }
        if v.zone_d_exit_mm_s >= v.zone_d_mm_s {
            errors.push(format!(
                "vibration.zone_d_exit_mm_s ({:.2}) must be less than zone_d_mm_s ({:.2})",
                v.zone_d_exit_mm_s, v.zone_d_mm_s
            ));
        }
        if v.zone_d_mm_s <= v.zone_c_mm_s {
            errors.push(format!(
                "vibration.zone_d_mm_s ({:.2}) must be greater than zone_c_mm_s ({:.2})",
                v.zone_d_mm_s, v.zone_c_mm_s
            ));
        }
        if v.interlock_mm_s <= v.zone_d_mm_s {
            errors.push(format!(
                "vibration.interlock_mm_s ({:.2}) must be greater than zone_d_mm_s ({:.2})",
                v.interlock_mm_s, v.zone_d_mm_s
            ));
        }
        if v.zone_d_dwell_steps == 0 {
            errors.push("vibration.zone_d_dwell_steps must be > 0".to_string());
        }
        Self::check_unit_interval(v.zone_c_min_risk, "vibration.zone_c_min_risk", &mut errors);
        Self::check_unit_interval(v.zone_d_display, "vibration.zone_d_display", &mut errors);
        Self::check_unit_interval(v.interlock_display, "vibration.interlock_display", &mut errors);

        // Degradation: exit above entry (low current / low pressure cause)
        let d = &self.thresholds.degradation;
        if d.current_exit_amp <= d.current_max_amp {
            errors.push(format!(
                "degradation.current_exit_amp ({:.1}) must be greater than current_max_amp ({:.1})",
                d.current_exit_amp, d.current_max_amp
            ));
        }
        if d.pressure_exit_bar <= d.pressure_max_bar {
            errors.push(format!(
                "degradation.pressure_exit_bar ({:.2}) must be greater than pressure_max_bar ({:.2})",
                d.pressure_exit_bar, d.pressure_max_bar
            ));
        }

        // Cavitation: pressure exit above entry
        let c = &self.thresholds.cavitation;
        if c.pressure_exit_bar <= c.pressure_max_bar {
            errors.push(format!(
                "cavitation.pressure_exit_bar ({:.2}) must be greater than pressure_max_bar ({:.2})",
                c.pressure_exit_bar, c.pressure_max_bar
            ));
        }

        // Temperature: critical >= warning
        let t = &self.thresholds.temperature;
        Self::check_escalation(t.warning_c, t.critical_c, "temperature", &mut errors);

        // Shutdown
        if self.shutdown.cavitation_sustain_steps == 0 {
            errors.push("shutdown.cavitation_sustain_steps must be > 0".to_string());
        }
        if self.shutdown.overtemp_sustain_steps == 0 {
            errors.push("shutdown.overtemp_sustain_steps must be > 0".to_string());
        }

        // Recovery band must be non-empty
        let r = &self.recovery;
        if r.pressure_min_bar >= r.pressure_max_bar
            || r.temp_min_c >= r.temp_max_c
            || r.current_min_amp >= r.current_max_amp
        {
            errors.push("recovery band is empty: every min must be below its max".to_string());
        }

        // Physical range validation
        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        // Reject NaN/Inf in any config value (sweep all f64 fields via serialization)
        match toml::Value::try_from(self) {
            Ok(value) => {
                let bad = super::validation::non_finite_keys(&value, "");
                if !bad.is_empty() {
                    errors.push(format!(
                        "Config contains NaN or Inf values ({}); all thresholds must be finite numbers",
                        bad.join(", ")
                    ));
                }
            }
            Err(e) => errors.push(format!("Config could not be checked for NaN or Inf values: {e}")),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_escalation(warning: f64, critical: f64, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass, catch them explicitly
        if !warning.is_finite() || !critical.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got warning={warning}, critical={critical})"
            ));
            return;
        }
        if critical < warning {
            errors.push(format!(
                "{name}: critical ({critical:.3}) must be >= warning ({warning:.3})"
            ));
        }
    }

    fn check_unit_interval(value: f64, name: &str, errors: &mut Vec<String>) {
        if !(0.0..=1.0).contains(&value) {
            errors.push(format!("{name} ({value}) must be within [0, 1]"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Asset Info
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Default asset identifier for records that do not name one
    #[serde(default = "default_asset_name")]
    pub name: String,

    /// Site / plant label, informational
    #[serde(default)]
    pub site: String,
}

fn default_asset_name() -> String {
    "pump-01".to_string()
}

impl Default for AssetInfo {
    fn default() -> Self {
        Self {
            name: default_asset_name(),
            site: String::new(),
        }
    }
}

// ============================================================================
// Smoothing
// ============================================================================

/// Feature-window depth and the asymmetric risk EMA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Raw samples averaged into the smoothed feature view (K)
    #[serde(default = "default_feature_window")]
    pub feature_window: usize,

    /// EMA values averaged into the smoothed risk
    #[serde(default = "default_risk_history")]
    pub risk_history: usize,

    /// EMA weight when risk is rising
    #[serde(default = "default_alpha_rising")]
    pub alpha_rising: f64,

    /// EMA weight when risk is flat or falling
    #[serde(default = "default_alpha_falling")]
    pub alpha_falling: f64,

    /// EMA weight when risk is rising and the instant risk is high
    #[serde(default = "default_alpha_very_high")]
    pub alpha_very_high: f64,

    /// Instant risk at which `alpha_very_high` applies
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: f64,
}

fn default_feature_window() -> usize { 3 }
fn default_risk_history() -> usize { 3 }
fn default_alpha_rising() -> f64 { 0.70 }
fn default_alpha_falling() -> f64 { 0.65 }
fn default_alpha_very_high() -> f64 { 0.92 }
fn default_high_risk_threshold() -> f64 { 0.70 }

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            feature_window: default_feature_window(),
            risk_history: default_risk_history(),
            alpha_rising: default_alpha_rising(),
            alpha_falling: default_alpha_falling(),
            alpha_very_high: default_alpha_very_high(),
            high_risk_threshold: default_high_risk_threshold(),
        }
    }
}

// ============================================================================
// Probability
// ============================================================================

/// Model-risk classification and display-probability shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityConfig {
    /// Smoothed risk at which the model alone reports WARNING
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,

    /// Smoothed risk at which the model alone reports CRITICAL
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,

    /// Stricter CRITICAL threshold during startup
    #[serde(default = "default_startup_critical_threshold")]
    pub startup_critical_threshold: f64,

    /// Invocations that use the startup threshold
    #[serde(default = "default_startup_iterations")]
    pub startup_iterations: u64,

    /// Smoothed risk above which the display value is compressed
    #[serde(default = "default_display_compress_start")]
    pub display_compress_start: f64,

    /// Display value at the compression start point
    #[serde(default = "default_display_compress_floor")]
    pub display_compress_floor: f64,

    /// Smoothed risk that keeps a model-only WARNING latched
    #[serde(default = "default_risk_hold_threshold")]
    pub risk_hold_threshold: f64,

    /// Minimum display probability of any CRITICAL verdict
    #[serde(default = "default_critical_display_floor")]
    pub critical_display_floor: f64,

    /// Minimum display probability of a physical WARNING
    #[serde(default = "default_warning_display_floor")]
    pub warning_display_floor: f64,

    /// Minimum display probability of debris, cavitation and choked verdicts
    #[serde(default = "default_trip_display_floor")]
    pub trip_display_floor: f64,
}

fn default_warning_threshold() -> f64 { 0.60 }
fn default_critical_threshold() -> f64 { 0.85 }
fn default_startup_critical_threshold() -> f64 { 0.90 }
fn default_startup_iterations() -> u64 { 3 }
fn default_display_compress_start() -> f64 { 0.65 }
fn default_display_compress_floor() -> f64 { 0.85 }
fn default_risk_hold_threshold() -> f64 { 0.25 }
fn default_critical_display_floor() -> f64 { 0.85 }
fn default_warning_display_floor() -> f64 { 0.55 }
fn default_trip_display_floor() -> f64 { 0.95 }

impl Default for ProbabilityConfig {
    fn default() -> Self {
        Self {
            warning_threshold: default_warning_threshold(),
            critical_threshold: default_critical_threshold(),
            startup_critical_threshold: default_startup_critical_threshold(),
            startup_iterations: default_startup_iterations(),
            display_compress_start: default_display_compress_start(),
            display_compress_floor: default_display_compress_floor(),
            risk_hold_threshold: default_risk_hold_threshold(),
            critical_display_floor: default_critical_display_floor(),
            warning_display_floor: default_warning_display_floor(),
            trip_display_floor: default_trip_display_floor(),
        }
    }
}

// ============================================================================
// Threshold Config (container)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub vibration: VibrationThresholds,
    #[serde(default)]
    pub debris: DebrisThresholds,
    #[serde(default)]
    pub cavitation: CavitationThresholds,
    #[serde(default)]
    pub choked: ChokedThresholds,
    #[serde(default)]
    pub degradation: DegradationThresholds,
    #[serde(default)]
    pub temperature: TemperatureThresholds,
    #[serde(default)]
    pub overload: OverloadThresholds,
    #[serde(default)]
    pub pressure: PressureThresholds,
    #[serde(default)]
    pub air_ingestion: AirIngestionThresholds,
}

// ============================================================================
// Vibration (ISO 10816-3, SAFETY-CRITICAL)
// ============================================================================

/// Vibration severity zones, dwell and the hard interlock.
///
/// Changes here move the trip ceiling; review with the site's rotating
/// equipment engineer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibrationThresholds {
    /// Zone C entry (mm/s RMS), both views must exceed it
    #[serde(default = "default_zone_c")]
    pub zone_c_mm_s: f64,

    /// Zone C hold floor (mm/s RMS)
    #[serde(default = "default_zone_c_exit")]
    pub zone_c_exit_mm_s: f64,

    /// Minimum smoothed risk for a zone C entry
    #[serde(default = "default_zone_c_min_risk")]
    pub zone_c_min_risk: f64,

    /// Zone D entry (mm/s RMS), either view
    #[serde(default = "default_zone_d")]
    pub zone_d_mm_s: f64,

    /// Zone D dwell reset level (mm/s RMS)
    #[serde(default = "default_zone_d_exit")]
    pub zone_d_exit_mm_s: f64,

    /// Consecutive low-vibration invocations before zone D releases
    #[serde(default = "default_zone_d_dwell_steps")]
    pub zone_d_dwell_steps: u32,

    /// Display floor for a zone D verdict
    #[serde(default = "default_zone_d_display")]
    pub zone_d_display: f64,

    /// Hard trip ceiling on smoothed vibration (mm/s RMS)
    #[serde(default = "default_interlock")]
    pub interlock_mm_s: f64,

    /// Display probability forced by the interlock
    #[serde(default = "default_interlock_display")]
    pub interlock_display: f64,
}

fn default_zone_c() -> f64 { 5.5 }
fn default_zone_c_exit() -> f64 { 4.5 }
fn default_zone_c_min_risk() -> f64 { 0.15 }
fn default_zone_d() -> f64 { 7.1 }
fn default_zone_d_exit() -> f64 { 6.0 }
fn default_zone_d_dwell_steps() -> u32 { 5 }
fn default_zone_d_display() -> f64 { 0.85 }
fn default_interlock() -> f64 { 9.0 }
fn default_interlock_display() -> f64 { 0.999 }

impl Default for VibrationThresholds {
    fn default() -> Self {
        Self {
            zone_c_mm_s: default_zone_c(),
            zone_c_exit_mm_s: default_zone_c_exit(),
            zone_c_min_risk: default_zone_c_min_risk(),
            zone_d_mm_s: default_zone_d(),
            zone_d_exit_mm_s: default_zone_d_exit(),
            zone_d_dwell_steps: default_zone_d_dwell_steps(),
            zone_d_display: default_zone_d_display(),
            interlock_mm_s: default_interlock(),
            interlock_display: default_interlock_display(),
        }
    }
}

// ============================================================================
// Debris / Mechanical
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisThresholds {
    /// Crest factor that signals an impact, confirmed by model CRITICAL or zone D vibration
    #[serde(default = "default_debris_crest")]
    pub crest_factor: f64,
}

fn default_debris_crest() -> f64 { 6.0 }

impl Default for DebrisThresholds {
    fn default() -> Self {
        Self {
            crest_factor: default_debris_crest(),
        }
    }
}

// ============================================================================
// Cavitation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CavitationThresholds {
    #[serde(default = "default_cav_current")]
    pub current_min_amp: f64,
    #[serde(default = "default_cav_pressure")]
    pub pressure_max_bar: f64,
    #[serde(default = "default_cav_vibration")]
    pub vibration_min_mm_s: f64,
    /// Pressure above which a latched cavitation releases
    #[serde(default = "default_cav_pressure_exit")]
    pub pressure_exit_bar: f64,
}

fn default_cav_current() -> f64 { 54.0 }
fn default_cav_pressure() -> f64 { 4.0 }
fn default_cav_vibration() -> f64 { 9.0 }
fn default_cav_pressure_exit() -> f64 { 4.5 }

impl Default for CavitationThresholds {
    fn default() -> Self {
        Self {
            current_min_amp: default_cav_current(),
            pressure_max_bar: default_cav_pressure(),
            vibration_min_mm_s: default_cav_vibration(),
            pressure_exit_bar: default_cav_pressure_exit(),
        }
    }
}

// ============================================================================
// Choked Discharge
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChokedThresholds {
    #[serde(default = "default_choked_current")]
    pub current_max_amp: f64,
    #[serde(default = "default_choked_pressure")]
    pub pressure_min_bar: f64,
    #[serde(default = "default_choked_temp")]
    pub temp_min_c: f64,
}

fn default_choked_current() -> f64 { 38.0 }
fn default_choked_pressure() -> f64 { 7.0 }
fn default_choked_temp() -> f64 { 70.0 }

impl Default for ChokedThresholds {
    fn default() -> Self {
        Self {
            current_max_amp: default_choked_current(),
            pressure_min_bar: default_choked_pressure(),
            temp_min_c: default_choked_temp(),
        }
    }
}

// ============================================================================
// Degradation (impeller wear / underload)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationThresholds {
    /// Entry: current at or below (A)
    #[serde(default = "default_deg_current")]
    pub current_max_amp: f64,
    /// Entry: pressure at or below (bar)
    #[serde(default = "default_deg_pressure")]
    pub pressure_max_bar: f64,
    /// Exit requires current above this on both views (A)
    #[serde(default = "default_deg_current_exit")]
    pub current_exit_amp: f64,
    /// Exit requires pressure above this on both views (bar)
    #[serde(default = "default_deg_pressure_exit")]
    pub pressure_exit_bar: f64,
}

fn default_deg_current() -> f64 { 40.0 }
fn default_deg_pressure() -> f64 { 5.2 }
fn default_deg_current_exit() -> f64 { 42.0 }
fn default_deg_pressure_exit() -> f64 { 5.5 }

impl Default for DegradationThresholds {
    fn default() -> Self {
        Self {
            current_max_amp: default_deg_current(),
            pressure_max_bar: default_deg_pressure(),
            current_exit_amp: default_deg_current_exit(),
            pressure_exit_bar: default_deg_pressure_exit(),
        }
    }
}

// ============================================================================
// Temperature / Overload / Pressure / Air ingestion
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureThresholds {
    #[serde(default = "default_temp_warning")]
    pub warning_c: f64,
    #[serde(default = "default_temp_critical")]
    pub critical_c: f64,
}

fn default_temp_warning() -> f64 { 60.0 }
fn default_temp_critical() -> f64 { 75.0 }

impl Default for TemperatureThresholds {
    fn default() -> Self {
        Self {
            warning_c: default_temp_warning(),
            critical_c: default_temp_critical(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverloadThresholds {
    #[serde(default = "default_overload_current")]
    pub current_amp: f64,
}

fn default_overload_current() -> f64 { 50.0 }

impl Default for OverloadThresholds {
    fn default() -> Self {
        Self {
            current_amp: default_overload_current(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureThresholds {
    /// High discharge pressure (bar)
    #[serde(default = "default_high_pressure")]
    pub high_bar: f64,
    /// Both current views must exceed this for the flow to count as normal (A)
    #[serde(default = "default_pressure_min_current")]
    pub min_flow_current_amp: f64,
}

fn default_high_pressure() -> f64 { 7.0 }
fn default_pressure_min_current() -> f64 { 38.0 }

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            high_bar: default_high_pressure(),
            min_flow_current_amp: default_pressure_min_current(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirIngestionThresholds {
    #[serde(default = "default_air_crest")]
    pub crest_factor: f64,
    #[serde(default = "default_air_vibration")]
    pub vibration_min_mm_s: f64,
}

fn default_air_crest() -> f64 { 5.5 }
fn default_air_vibration() -> f64 { 4.5 }

impl Default for AirIngestionThresholds {
    fn default() -> Self {
        Self {
            crest_factor: default_air_crest(),
            vibration_min_mm_s: default_air_vibration(),
        }
    }
}

// ============================================================================
// Nominal Recovery
// ============================================================================

/// Healthy band that clears carried-over risk after an alert.
///
/// Bounds are inclusive on the min side for pressure and temperature and
/// exclusive elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_recovery_vib")]
    pub vib_max_mm_s: f64,
    #[serde(default = "default_recovery_p_min")]
    pub pressure_min_bar: f64,
    #[serde(default = "default_recovery_p_max")]
    pub pressure_max_bar: f64,
    #[serde(default = "default_recovery_t_min")]
    pub temp_min_c: f64,
    #[serde(default = "default_recovery_t_max")]
    pub temp_max_c: f64,
    #[serde(default = "default_recovery_i_min")]
    pub current_min_amp: f64,
    #[serde(default = "default_recovery_i_max")]
    pub current_max_amp: f64,
}

fn default_true() -> bool { true }
fn default_recovery_vib() -> f64 { 4.5 }
fn default_recovery_p_min() -> f64 { 5.2 }
fn default_recovery_p_max() -> f64 { 7.0 }
fn default_recovery_t_min() -> f64 { 35.0 }
fn default_recovery_t_max() -> f64 { 60.0 }
fn default_recovery_i_min() -> f64 { 40.0 }
fn default_recovery_i_max() -> f64 { 50.0 }

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            vib_max_mm_s: default_recovery_vib(),
            pressure_min_bar: default_recovery_p_min(),
            pressure_max_bar: default_recovery_p_max(),
            temp_min_c: default_recovery_t_min(),
            temp_max_c: default_recovery_t_max(),
            current_min_amp: default_recovery_i_min(),
            current_max_amp: default_recovery_i_max(),
        }
    }
}

// ============================================================================
// Shutdown Advisor
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Consecutive CRITICAL cavitation verdicts before a stop is advised
    #[serde(default = "default_cav_sustain")]
    pub cavitation_sustain_steps: u32,
    /// Consecutive CRITICAL overtemperature verdicts before a stop is advised
    #[serde(default = "default_overtemp_sustain")]
    pub overtemp_sustain_steps: u32,
}

fn default_cav_sustain() -> u32 { 4 }
fn default_overtemp_sustain() -> u32 { 3 }

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            cavitation_sustain_steps: default_cav_sustain(),
            overtemp_sustain_steps: default_overtemp_sustain(),
        }
    }
}

// ============================================================================
// Output
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Append-only JSONL verdict log; overridden by `--verdict-log`
    #[serde(default = "default_verdict_log")]
    pub verdict_log: PathBuf,

    /// Emit a status event for every verdict, not only on change
    #[serde(default)]
    pub publish_every_verdict: bool,
}

fn default_verdict_log() -> PathBuf {
    PathBuf::from("verdicts.jsonl")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            verdict_log: default_verdict_log(),
            publish_every_verdict: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
