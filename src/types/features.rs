//! Feature samples and the two-view window handed to the engine

use serde::{Deserialize, Serialize};

/// Validated numeric snapshot produced by feature extraction.
///
/// Units follow the operating instruction: vibration velocity in mm/s RMS
/// (bearing housing), motor current in A, discharge pressure in bar,
/// temperature in °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSample {
    /// Vibration velocity RMS (mm/s)
    pub vib_rms: f64,
    /// Vibration crest factor (peak / RMS)
    pub vib_crest: f64,
    /// Vibration kurtosis
    #[serde(default)]
    pub vib_kurtosis: f64,
    /// Motor current (A)
    pub current: f64,
    /// Discharge pressure (bar)
    pub pressure: f64,
    /// Casing / gland temperature (°C)
    pub temp: f64,
    /// Temperature change across the feature window (°C)
    #[serde(default)]
    pub temp_delta: f64,
    /// Cavitation index (vibration / pressure proxy)
    #[serde(default)]
    pub cavitation_index: f64,
    /// Debris impact flag raised by the acquisition layer; absent means false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debris_impact: Option<bool>,
}

impl Default for FeatureSample {
    /// Nominal healthy operating point (Zone B, 44-48 A, 5.5-6.0 bar).
    fn default() -> Self {
        Self {
            vib_rms: 2.8,
            vib_crest: 3.0,
            vib_kurtosis: 3.0,
            current: 45.0,
            pressure: 6.0,
            temp: 42.0,
            temp_delta: 0.0,
            cavitation_index: 0.1,
            debris_impact: None,
        }
    }
}

impl FeatureSample {
    /// Debris flag with the missing case treated as false.
    pub fn has_debris_impact(&self) -> bool {
        self.debris_impact.unwrap_or(false)
    }

    /// Field-wise mean of a non-empty sequence of samples.
    ///
    /// The debris flag is not averaged: it is taken from the last sample,
    /// since it marks an instantaneous event. Returns `None` for an empty
    /// iterator.
    pub fn mean<'a, I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a FeatureSample>,
    {
        let mut acc = [0.0_f64; 8];
        let mut count = 0_usize;
        let mut last_flag = None;
        for s in samples {
            acc[0] += s.vib_rms;
            acc[1] += s.vib_crest;
            acc[2] += s.vib_kurtosis;
            acc[3] += s.current;
            acc[4] += s.pressure;
            acc[5] += s.temp;
            acc[6] += s.temp_delta;
            acc[7] += s.cavitation_index;
            last_flag = s.debris_impact;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self {
            vib_rms: acc[0] / n,
            vib_crest: acc[1] / n,
            vib_kurtosis: acc[2] / n,
            current: acc[3] / n,
            pressure: acc[4] / n,
            temp: acc[5] / n,
            temp_delta: acc[6] / n,
            cavitation_index: acc[7] / n,
            debris_impact: last_flag,
        })
    }
}

/// The two views of the feature stream handed to the engine per invocation.
///
/// Causes that need a sustained condition look at `smoothed`; causes that
/// must react within the same step (debris, choked, cavitation) also look at
/// `latest`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureWindow {
    /// Rolling mean over the last K raw samples
    pub smoothed: FeatureSample,
    /// Most recent raw sample
    pub latest: FeatureSample,
}

impl FeatureWindow {
    pub fn new(smoothed: FeatureSample, latest: FeatureSample) -> Self {
        Self { smoothed, latest }
    }

    /// Window where both views carry the same sample.
    pub fn steady(sample: FeatureSample) -> Self {
        Self {
            smoothed: sample,
            latest: sample,
        }
    }

    /// Larger of the two vibration readings.
    pub fn peak_vib(&self) -> f64 {
        self.smoothed.vib_rms.max(self.latest.vib_rms)
    }

    /// Larger of the two crest factors.
    pub fn peak_crest(&self) -> f64 {
        self.smoothed.vib_crest.max(self.latest.vib_crest)
    }

    /// Larger of the two current readings.
    pub fn peak_current(&self) -> f64 {
        self.smoothed.current.max(self.latest.current)
    }

    /// Larger of the two pressure readings.
    pub fn peak_pressure(&self) -> f64 {
        self.smoothed.pressure.max(self.latest.pressure)
    }

    /// Larger of the two temperature readings.
    pub fn peak_temp(&self) -> f64 {
        self.smoothed.temp.max(self.latest.temp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_none() {
        let empty: Vec<FeatureSample> = Vec::new();
        assert!(FeatureSample::mean(&empty).is_none());
    }

    #[test]
    fn test_mean_averages_fields_and_keeps_last_flag() {
        let a = FeatureSample {
            vib_rms: 2.0,
            current: 40.0,
            debris_impact: Some(true),
            ..FeatureSample::default()
        };
        let b = FeatureSample {
            vib_rms: 4.0,
            current: 50.0,
            debris_impact: None,
            ..FeatureSample::default()
        };
        let mean = FeatureSample::mean(&[a, b]).unwrap();
        assert!((mean.vib_rms - 3.0).abs() < 1e-9);
        assert!((mean.current - 45.0).abs() < 1e-9);
        assert!(!mean.has_debris_impact());
    }

    #[test]
    fn test_missing_debris_flag_deserializes_as_absent() {
        let json = r#"{"vib_rms":2.5,"vib_crest":3.0,"current":45.0,"pressure":6.0,"temp":38.0}"#;
        let sample: FeatureSample = serde_json::from_str(json).unwrap();
        assert!(sample.debris_impact.is_none());
        assert!(!sample.has_debris_impact());
    }

    #[test]
    fn test_window_peaks() {
        let window = FeatureWindow::new(
            FeatureSample { vib_rms: 5.0, temp: 70.0, ..FeatureSample::default() },
            FeatureSample { vib_rms: 8.0, temp: 65.0, ..FeatureSample::default() },
        );
        assert!((window.peak_vib() - 8.0).abs() < 1e-9);
        assert!((window.peak_temp() - 70.0).abs() < 1e-9);
    }
}
