//! Bundled Analysis Pass and Potability Classification

use crate::{AnalysisError, FilterAnalysis, FilterPredictor, Optimization, Optimizer};
use chrono::{DateTime, Utc};
use quality::{quality_score, AnomalyDetector, AnomalyReport};
use sensors::SensorReading;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Overall system status derived from the quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Critical,
}

impl OverallStatus {
    /// Map a 0-100 score to a status
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            OverallStatus::Excellent
        } else if score >= 80.0 {
            OverallStatus::Good
        } else if score >= 70.0 {
            OverallStatus::Acceptable
        } else if score >= 60.0 {
            OverallStatus::Poor
        } else {
            OverallStatus::Critical
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Excellent => "excellent",
            OverallStatus::Good => "good",
            OverallStatus::Acceptable => "acceptable",
            OverallStatus::Poor => "poor",
            OverallStatus::Critical => "critical",
        }
    }
}

/// An alert derived during analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisAlert {
    /// Alert type key (stable, used for deduplication)
    pub alert_type: String,
    /// Severity label
    pub severity: &'static str,
    /// Operator-facing message
    pub message: String,
}

/// Bundled output of one analysis pass
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// When the analysis ran
    pub timestamp: DateTime<Utc>,
    /// Latest reading the analysis is based on
    pub current_reading: SensorReading,
    /// Filter saturation prediction
    pub filter_analysis: FilterAnalysis,
    /// Anomalies in the latest reading
    pub anomalies: Vec<AnomalyReport>,
    /// Optimization recommendations
    pub optimization: Optimization,
    /// Overall status derived from the quality score
    pub overall_status: OverallStatus,
    /// Alerts raised by this pass
    pub alerts: Vec<AnalysisAlert>,
}

/// Potability classification for a single reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotabilityReport {
    /// Whether the water is classified potable
    pub potable: bool,
    /// Classification confidence (0.5-0.99)
    pub confidence: f64,
    /// Underlying quality score
    pub quality_score: f64,
    /// Overall status label
    pub status: OverallStatus,
}

/// Run a full analysis pass over recent readings
///
/// Readings must be in chronological order; the pass analyzes the latest
/// reading with the one before it as delta context.
pub fn analyze(
    readings: &[SensorReading],
    days_since_replacement: u32,
) -> Result<Analysis, AnalysisError> {
    let latest = readings.last().ok_or(AnalysisError::NoData)?;

    let filter_analysis = FilterPredictor::new()
        .predict_saturation(readings, days_since_replacement)
        .ok_or(AnalysisError::NoData)?;

    let mut detector = AnomalyDetector::new();
    if readings.len() >= 2 {
        detector.detect(&readings[readings.len() - 2]);
    }
    let anomalies = detector.detect(latest);

    let optimization = Optimizer::new().recommendations(latest);
    let overall_status = OverallStatus::from_score(optimization.quality_score);

    let mut alerts = Vec::new();
    if filter_analysis.replacement_needed {
        alerts.push(AnalysisAlert {
            alert_type: "filter_replacement".to_string(),
            severity: "high",
            message: format!(
                "Filter replacement needed (saturation: {:.1}%)",
                filter_analysis.saturation_percent
            ),
        });
    }
    for anomaly in &anomalies {
        alerts.push(AnalysisAlert {
            alert_type: format!("sensor_anomaly_{}", anomaly.parameter),
            severity: "high",
            message: format!("Anomaly in {}: {}", anomaly.parameter, anomaly.message),
        });
    }
    if optimization.quality_score < 70.0 {
        alerts.push(AnalysisAlert {
            alert_type: "water_quality".to_string(),
            severity: "medium",
            message: format!(
                "Water quality below target (score: {:.1})",
                optimization.quality_score
            ),
        });
    }

    info!(
        score = optimization.quality_score,
        status = overall_status.as_str(),
        alert_count = alerts.len(),
        "Analysis pass complete"
    );

    Ok(Analysis {
        timestamp: Utc::now(),
        current_reading: latest.clone(),
        filter_analysis,
        anomalies,
        optimization,
        overall_status,
        alerts,
    })
}

/// Classify a reading as potable or not
///
/// Potable means the quality score clears the acceptable bar. Confidence
/// grows with distance from the decision boundary.
pub fn classify_potability(reading: &SensorReading) -> PotabilityReport {
    let score = quality_score(reading);
    let potable = score >= 70.0;
    let confidence = (0.5 + (score - 70.0).abs() / 60.0).clamp(0.5, 0.99);

    PotabilityReport {
        potable,
        confidence: (confidence * 100.0).round() / 100.0,
        quality_score: score,
        status: OverallStatus::from_score(score),
    }
}
