//! Quality Status and Score Computation

use sensors::SensorReading;
use serde::{Deserialize, Serialize};

/// Coarse quality status for a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    Excellent,
    Fair,
    Poor,
}

impl QualityStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityStatus::Excellent => "excellent",
            QualityStatus::Fair => "fair",
            QualityStatus::Poor => "poor",
        }
    }
}

/// Classify a reading as excellent / fair / poor
///
/// Poor: pH outside 6.5-8.5, TDS > 500 or turbidity > 4.
/// Fair: pH outside 7.0-8.0, TDS > 300 or turbidity > 1.
pub fn quality_status(reading: &SensorReading) -> QualityStatus {
    if reading.ph < 6.5 || reading.ph > 8.5 || reading.tds > 500.0 || reading.turbidity > 4.0 {
        QualityStatus::Poor
    } else if reading.ph < 7.0
        || reading.ph > 8.0
        || reading.tds > 300.0
        || reading.turbidity > 1.0
    {
        QualityStatus::Fair
    } else {
        QualityStatus::Excellent
    }
}

/// Compute a 0-100 quality score as the mean of per-parameter scores
///
/// Each parameter scores 100 inside its target band, then loses points
/// linearly with distance from the band's optimal value.
pub fn quality_score(reading: &SensorReading) -> f64 {
    let tds_score = if (150.0..=300.0).contains(&reading.tds) {
        100.0
    } else {
        (100.0 - (reading.tds - 225.0).abs() / 2.0).max(0.0)
    };

    let ph_score = if (6.5..=8.5).contains(&reading.ph) {
        100.0
    } else {
        (100.0 - (reading.ph - 7.2).abs() * 20.0).max(0.0)
    };

    let orp_score = if (300.0..=600.0).contains(&reading.orp) {
        100.0
    } else {
        (100.0 - (reading.orp - 450.0).abs() / 5.0).max(0.0)
    };

    let turbidity_score = if reading.turbidity <= 1.0 {
        100.0
    } else {
        (100.0 - (reading.turbidity - 1.0) * 50.0).max(0.0)
    };

    let total = tds_score + ph_score + orp_score + turbidity_score;
    (total / 4.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(tds: f64, ph: f64, orp: f64, turbidity: f64) -> SensorReading {
        SensorReading::now(tds, ph, orp, turbidity, 22.0)
    }

    #[test]
    fn test_excellent_status() {
        assert_eq!(
            quality_status(&reading(225.0, 7.4, 400.0, 0.3)),
            QualityStatus::Excellent
        );
    }

    #[test]
    fn test_fair_status() {
        assert_eq!(
            quality_status(&reading(350.0, 7.4, 400.0, 0.3)),
            QualityStatus::Fair
        );
        assert_eq!(
            quality_status(&reading(225.0, 6.8, 400.0, 0.3)),
            QualityStatus::Fair
        );
    }

    #[test]
    fn test_poor_status() {
        assert_eq!(
            quality_status(&reading(225.0, 6.2, 400.0, 0.3)),
            QualityStatus::Poor
        );
        assert_eq!(
            quality_status(&reading(600.0, 7.4, 400.0, 0.3)),
            QualityStatus::Poor
        );
    }

    #[test]
    fn test_perfect_score() {
        let score = quality_score(&reading(225.0, 7.2, 450.0, 0.2));
        assert!((score - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_degraded_score() {
        // Extreme values drag every per-parameter score to zero
        let score = quality_score(&reading(2000.0, 2.0, 1500.0, 10.0));
        assert!(score < 10.0);
    }

    #[test]
    fn test_score_bounded() {
        for tds in [0.0, 225.0, 900.0] {
            for ph in [2.0, 7.2, 12.0] {
                let score = quality_score(&reading(tds, ph, 400.0, 0.5));
                assert!((0.0..=100.0).contains(&score));
            }
        }
    }
}
