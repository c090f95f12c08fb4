//! Threshold and Delta Anomaly Detection

use sensors::SensorReading;
use serde::Serialize;

/// Hard anomaly bands, wider than the validator's warning bands
const TDS_BAND: (f64, f64) = (50.0, 800.0);
const PH_BAND: (f64, f64) = (6.0, 9.0);
const ORP_BAND: (f64, f64) = (100.0, 900.0);
const TURBIDITY_MAX: f64 = 5.0;

/// Maximum plausible change between consecutive readings
const TDS_MAX_DELTA: f64 = 150.0;
const PH_MAX_DELTA: f64 = 1.5;
const ORP_MAX_DELTA: f64 = 250.0;
const TURBIDITY_MAX_DELTA: f64 = 3.0;

/// One detected anomaly
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyReport {
    /// Parameter name
    pub parameter: &'static str,
    /// Offending value
    pub value: f64,
    /// Description of why it is anomalous
    pub message: String,
}

/// Detects readings outside static bands or with implausible jumps
///
/// A reading is anomalous if a value falls outside its hard band, or if its
/// delta from the previous reading exceeds a fixed per-parameter constant.
#[derive(Debug, Default)]
pub struct AnomalyDetector {
    previous: Option<SensorReading>,
}

impl AnomalyDetector {
    /// Create a new detector with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a reading and update the detector's history
    pub fn detect(&mut self, reading: &SensorReading) -> Vec<AnomalyReport> {
        let mut anomalies = Vec::new();

        Self::check_band(&mut anomalies, "tds", reading.tds, TDS_BAND, "ppm");
        Self::check_band(&mut anomalies, "ph", reading.ph, PH_BAND, "");
        Self::check_band(&mut anomalies, "orp", reading.orp, ORP_BAND, "mV");
        if reading.turbidity > TURBIDITY_MAX {
            anomalies.push(AnomalyReport {
                parameter: "turbidity",
                value: reading.turbidity,
                message: format!(
                    "Turbidity {:.2} too high (>{:.1} NTU)",
                    reading.turbidity, TURBIDITY_MAX
                ),
            });
        }

        if let Some(prev) = &self.previous {
            Self::check_delta(&mut anomalies, "tds", prev.tds, reading.tds, TDS_MAX_DELTA);
            Self::check_delta(&mut anomalies, "ph", prev.ph, reading.ph, PH_MAX_DELTA);
            Self::check_delta(&mut anomalies, "orp", prev.orp, reading.orp, ORP_MAX_DELTA);
            Self::check_delta(
                &mut anomalies,
                "turbidity",
                prev.turbidity,
                reading.turbidity,
                TURBIDITY_MAX_DELTA,
            );
        }

        self.previous = Some(reading.clone());
        anomalies
    }

    fn check_band(
        out: &mut Vec<AnomalyReport>,
        parameter: &'static str,
        value: f64,
        band: (f64, f64),
        unit: &str,
    ) {
        if value < band.0 || value > band.1 {
            out.push(AnomalyReport {
                parameter,
                value,
                message: format!(
                    "{} value {:.2} outside normal range ({:.1}-{:.1} {})",
                    parameter, value, band.0, band.1, unit
                ),
            });
        }
    }

    fn check_delta(
        out: &mut Vec<AnomalyReport>,
        parameter: &'static str,
        previous: f64,
        current: f64,
        max_delta: f64,
    ) {
        let delta = (current - previous).abs();
        if delta > max_delta {
            out.push(AnomalyReport {
                parameter,
                value: current,
                message: format!(
                    "{} changed by {:.2} since last reading (limit {:.2})",
                    parameter, delta, max_delta
                ),
            });
        }
    }

    /// Clear the stored previous reading
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(tds: f64, ph: f64, orp: f64, turbidity: f64) -> SensorReading {
        SensorReading::now(tds, ph, orp, turbidity, 22.0)
    }

    #[test]
    fn test_normal_reading_no_anomalies() {
        let mut detector = AnomalyDetector::new();
        assert!(detector.detect(&reading(250.0, 7.2, 400.0, 0.3)).is_empty());
    }

    #[test]
    fn test_band_anomaly() {
        let mut detector = AnomalyDetector::new();
        let anomalies = detector.detect(&reading(900.0, 7.2, 400.0, 0.3));
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].parameter, "tds");
    }

    #[test]
    fn test_delta_anomaly() {
        let mut detector = AnomalyDetector::new();
        assert!(detector.detect(&reading(250.0, 7.2, 400.0, 0.3)).is_empty());

        // Within bands, but an implausible pH jump
        let anomalies = detector.detect(&reading(250.0, 8.9, 400.0, 0.3));
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].parameter, "ph");
        assert!(anomalies[0].message.contains("changed by"));
    }

    #[test]
    fn test_first_reading_has_no_delta_check() {
        let mut detector = AnomalyDetector::new();
        // Would be a huge delta if there were history; bands are fine
        assert!(detector.detect(&reading(790.0, 8.9, 850.0, 4.9)).is_empty());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut detector = AnomalyDetector::new();
        detector.detect(&reading(250.0, 7.2, 400.0, 0.3));
        detector.reset();
        assert!(detector.detect(&reading(600.0, 8.8, 700.0, 3.5)).is_empty());
    }
}
