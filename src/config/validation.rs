//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, "; did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `EngineConfig`.
///
/// Maintained by hand to match the struct hierarchy in engine_config.rs.
/// Any new field added to `EngineConfig` must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [asset]
        "asset",
        "asset.name",
        "asset.site",
        // [smoothing]
        "smoothing",
        "smoothing.feature_window",
        "smoothing.risk_history",
        "smoothing.alpha_rising",
        "smoothing.alpha_falling",
        "smoothing.alpha_very_high",
        "smoothing.high_risk_threshold",
        // [probability]
        "probability",
        "probability.warning_threshold",
        "probability.critical_threshold",
        "probability.startup_critical_threshold",
        "probability.startup_iterations",
        "probability.display_compress_start",
        "probability.display_compress_floor",
        "probability.risk_hold_threshold",
        "probability.critical_display_floor",
        "probability.warning_display_floor",
        "probability.trip_display_floor",
        // [thresholds]
        "thresholds",
        // [thresholds.vibration]
        "thresholds.vibration",
        "thresholds.vibration.zone_c_mm_s",
        "thresholds.vibration.zone_c_exit_mm_s",
        "thresholds.vibration.zone_c_min_risk",
        "thresholds.vibration.zone_d_mm_s",
        "thresholds.vibration.zone_d_exit_mm_s",
        "thresholds.vibration.zone_d_dwell_steps",
        "thresholds.vibration.zone_d_display",
        "thresholds.vibration.interlock_mm_s",
        "thresholds.vibration.interlock_display",
        // [thresholds.debris]
        "thresholds.debris",
        "thresholds.debris.crest_factor",
        // [thresholds.cavitation]
        "thresholds.cavitation",
        "thresholds.cavitation.current_min_amp",
        "thresholds.cavitation.pressure_max_bar",
        "thresholds.cavitation.vibration_min_mm_s",
        "thresholds.cavitation.pressure_exit_bar",
        // [thresholds.choked]
        "thresholds.choked",
        "thresholds.choked.current_max_amp",
        "thresholds.choked.pressure_min_bar",
        "thresholds.choked.temp_min_c",
        // [thresholds.degradation]
        "thresholds.degradation",
        "thresholds.degradation.current_max_amp",
        "thresholds.degradation.pressure_max_bar",
        "thresholds.degradation.current_exit_amp",
        "thresholds.degradation.pressure_exit_bar",
        // [thresholds.temperature]
        "thresholds.temperature",
        "thresholds.temperature.warning_c",
        "thresholds.temperature.critical_c",
        // [thresholds.overload]
        "thresholds.overload",
        "thresholds.overload.current_amp",
        // [thresholds.pressure]
        "thresholds.pressure",
        "thresholds.pressure.high_bar",
        "thresholds.pressure.min_flow_current_amp",
        // [thresholds.air_ingestion]
        "thresholds.air_ingestion",
        "thresholds.air_ingestion.crest_factor",
        "thresholds.air_ingestion.vibration_min_mm_s",
        // [recovery]
        "recovery",
        "recovery.enabled",
        "recovery.vib_max_mm_s",
        "recovery.pressure_min_bar",
        "recovery.pressure_max_bar",
        "recovery.temp_min_c",
        "recovery.temp_max_c",
        "recovery.current_min_amp",
        "recovery.current_max_amp",
        // [shutdown]
        "shutdown",
        "shutdown.cavitation_sustain_steps",
        "shutdown.overtemp_sustain_steps",
        // [output]
        "output",
        "output.verdict_log",
        "output.publish_every_verdict",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect dotted key paths from a TOML value tree.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

/// Dotted paths of every float leaf that is NaN or infinite.
pub fn non_finite_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            match v {
                toml::Value::Float(f) if !f.is_finite() => keys.push(path),
                toml::Value::Table(_) => keys.extend(non_finite_keys(v, &path)),
                _ => {}
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed `EngineConfig`.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::EngineConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let t = &config.thresholds;

    // Magnitudes that cannot be negative
    let non_negative = [
        ("thresholds.vibration.zone_c_mm_s", t.vibration.zone_c_mm_s),
        ("thresholds.vibration.zone_c_exit_mm_s", t.vibration.zone_c_exit_mm_s),
        ("thresholds.vibration.zone_d_exit_mm_s", t.vibration.zone_d_exit_mm_s),
        ("thresholds.debris.crest_factor", t.debris.crest_factor),
        ("thresholds.cavitation.current_min_amp", t.cavitation.current_min_amp),
        ("thresholds.cavitation.pressure_max_bar", t.cavitation.pressure_max_bar),
        ("thresholds.choked.current_max_amp", t.choked.current_max_amp),
        ("thresholds.choked.pressure_min_bar", t.choked.pressure_min_bar),
        ("thresholds.degradation.current_max_amp", t.degradation.current_max_amp),
        ("thresholds.degradation.pressure_max_bar", t.degradation.pressure_max_bar),
        ("thresholds.overload.current_amp", t.overload.current_amp),
        ("thresholds.pressure.high_bar", t.pressure.high_bar),
        ("thresholds.air_ingestion.crest_factor", t.air_ingestion.crest_factor),
    ];
    for (field, value) in non_negative {
        if value < 0.0 {
            errors.push(format!("{field} = {value:.2} cannot be negative"));
        }
    }

    // Crest factor of a pure sine is sqrt(2); anything below cannot occur
    if t.debris.crest_factor < std::f64::consts::SQRT_2 {
        errors.push(format!(
            "thresholds.debris.crest_factor = {:.2} is below the sine-wave minimum (1.41)",
            t.debris.crest_factor
        ));
    }

    // Zone D: ISO 10816-3 boundaries for group 1/2 machines span 2.8-11 mm/s
    let zd = t.vibration.zone_d_mm_s;
    if !(2.8..=11.0).contains(&zd) {
        warnings.push(ValidationWarning {
            field: "thresholds.vibration.zone_d_mm_s".to_string(),
            message: format!(
                "zone_d_mm_s = {zd:.1} is outside the ISO 10816-3 range (2.8-11 mm/s)"
            ),
            suggestion: None,
        });
    }

    // Temperature: casing / gland readings above 150 °C are not plausible set points
    let tc = t.temperature.critical_c;
    if !(30.0..=150.0).contains(&tc) {
        warnings.push(ValidationWarning {
            field: "thresholds.temperature.critical_c".to_string(),
            message: format!("critical_c = {tc:.1} is outside typical range (30-150 °C)"),
            suggestion: None,
        });
    }

    // Pressure: a slurry / sump pump discharge beyond 40 bar is suspicious
    let hp = t.pressure.high_bar;
    if hp > 40.0 {
        warnings.push(ValidationWarning {
            field: "thresholds.pressure.high_bar".to_string(),
            message: format!("high_bar = {hp:.1} is outside typical range (0-40 bar)"),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
