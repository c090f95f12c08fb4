//! Filter Saturation Prediction

use sensors::SensorReading;
use serde::Serialize;
use tracing::debug;

/// Saturation at which replacement is required (%)
const REPLACEMENT_THRESHOLD: f64 = 80.0;
/// Baseline saturation accumulation per day of service (%)
const SATURATION_PER_DAY: f64 = 1.2;
/// Projected saturation growth per day for the remaining-days estimate (%)
const PROJECTED_GROWTH_PER_DAY: f64 = 1.5;

/// Result of a filter saturation prediction
#[derive(Debug, Clone, Serialize)]
pub struct FilterAnalysis {
    /// Estimated saturation (0-100 %)
    pub saturation_percent: f64,
    /// Estimated days until replacement is due
    pub days_until_replacement: f64,
    /// Whether replacement is due now
    pub replacement_needed: bool,
    /// Confidence label for the estimate
    pub confidence: &'static str,
}

/// Rule-based filter saturation predictor
///
/// Saturation grows with filter age and is penalized when the water being
/// filtered is dirty. The estimate is deterministic.
#[derive(Debug, Default)]
pub struct FilterPredictor;

impl FilterPredictor {
    /// Create a new predictor
    pub fn new() -> Self {
        Self
    }

    /// Predict filter saturation from recent readings and service history
    pub fn predict_saturation(
        &self,
        readings: &[SensorReading],
        days_since_replacement: u32,
    ) -> Option<FilterAnalysis> {
        let latest = readings.last()?;

        let mut saturation = (days_since_replacement as f64 * SATURATION_PER_DAY).min(90.0);

        // Dirty water saturates the filter faster
        if latest.tds > 300.0 {
            saturation += 10.0;
        }
        if latest.turbidity > 0.5 {
            saturation += 15.0;
        }
        if latest.ph < 6.5 || latest.ph > 8.5 {
            saturation += 5.0;
        }

        let saturation = saturation.min(100.0);

        let days_until_replacement = if saturation < REPLACEMENT_THRESHOLD {
            (REPLACEMENT_THRESHOLD - saturation) / PROJECTED_GROWTH_PER_DAY
        } else {
            0.0
        };

        debug!(
            saturation_percent = saturation,
            days_until_replacement, "Filter saturation predicted"
        );

        Some(FilterAnalysis {
            saturation_percent: (saturation * 10.0).round() / 10.0,
            days_until_replacement: (days_until_replacement * 10.0).round() / 10.0,
            replacement_needed: saturation >= REPLACEMENT_THRESHOLD,
            confidence: if saturation > 20.0 { "high" } else { "medium" },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(tds: f64, ph: f64, turbidity: f64) -> SensorReading {
        SensorReading::now(tds, ph, 400.0, turbidity, 22.0)
    }

    #[test]
    fn test_no_readings_yields_none() {
        let predictor = FilterPredictor::new();
        assert!(predictor.predict_saturation(&[], 10).is_none());
    }

    #[test]
    fn test_fresh_filter_clean_water() {
        let predictor = FilterPredictor::new();
        let analysis = predictor
            .predict_saturation(&[reading(225.0, 7.2, 0.3)], 0)
            .unwrap();
        assert!(analysis.saturation_percent < 1.0);
        assert!(!analysis.replacement_needed);
        assert!(analysis.days_until_replacement > 50.0);
    }

    #[test]
    fn test_old_filter_needs_replacement() {
        let predictor = FilterPredictor::new();
        let analysis = predictor
            .predict_saturation(&[reading(350.0, 7.2, 0.8)], 60)
            .unwrap();
        // 60 days * 1.2 = 72, +10 tds, +15 turbidity = 97
        assert!(analysis.saturation_percent >= 95.0);
        assert!(analysis.replacement_needed);
        assert_eq!(analysis.days_until_replacement, 0.0);
    }

    #[test]
    fn test_age_contribution_capped() {
        let predictor = FilterPredictor::new();
        let analysis = predictor
            .predict_saturation(&[reading(225.0, 7.2, 0.3)], 1000)
            .unwrap();
        assert!((analysis.saturation_percent - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_deterministic() {
        let predictor = FilterPredictor::new();
        let readings = [reading(310.0, 8.7, 0.6)];
        let a = predictor.predict_saturation(&readings, 30).unwrap();
        let b = predictor.predict_saturation(&readings, 30).unwrap();
        assert_eq!(a.saturation_percent, b.saturation_percent);
    }
}
