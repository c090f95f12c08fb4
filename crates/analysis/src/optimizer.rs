//! Treatment Optimization Recommendations

use quality::{quality_score, QualityStatus};
use sensors::SensorReading;
use serde::Serialize;

/// A structured adjustment the treatment system can apply
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Adjust a filtration parameter
    FilterAdjustment { parameter: &'static str, change: &'static str },
    /// Dose a chemical
    ChemicalDosing { chemical: &'static str, amount: &'static str },
    /// Change disinfection intensity
    Disinfection { method: &'static str, change: &'static str },
    /// Trigger filter maintenance
    FilterMaintenance { action: &'static str },
}

/// Optimization output for one reading
#[derive(Debug, Clone, Serialize)]
pub struct Optimization {
    /// Operator-facing recommendation strings
    pub recommendations: Vec<String>,
    /// Machine-actionable adjustments
    pub actions: Vec<RecommendedAction>,
    /// Quality score for the reading (0-100)
    pub quality_score: f64,
    /// Coarse status derived from validator bands
    pub status: QualityStatus,
}

/// Rule-based treatment optimizer
#[derive(Debug, Default)]
pub struct Optimizer;

impl Optimizer {
    /// Create a new optimizer
    pub fn new() -> Self {
        Self
    }

    /// Produce recommendations and actions for a reading
    pub fn recommendations(&self, reading: &SensorReading) -> Optimization {
        let mut recommendations = Vec::new();
        let mut actions = Vec::new();

        if reading.tds > 300.0 {
            recommendations.push("TDS high - increase RO filtration".to_string());
            actions.push(RecommendedAction::FilterAdjustment {
                parameter: "ro_pressure",
                change: "+10%",
            });
        } else if reading.tds < 150.0 {
            recommendations.push("TDS low - add mineral cartridge".to_string());
            actions.push(RecommendedAction::FilterAdjustment {
                parameter: "mineral_addition",
                change: "enable",
            });
        }

        if reading.ph > 8.5 {
            recommendations.push("pH high - activate acid injection".to_string());
            actions.push(RecommendedAction::ChemicalDosing {
                chemical: "acid",
                amount: "low",
            });
        } else if reading.ph < 6.5 {
            recommendations.push("pH low - activate alkaline injection".to_string());
            actions.push(RecommendedAction::ChemicalDosing {
                chemical: "alkaline",
                amount: "low",
            });
        }

        if reading.orp < 300.0 {
            recommendations.push("ORP low - increase disinfection".to_string());
            actions.push(RecommendedAction::Disinfection {
                method: "chlorine",
                change: "+20%",
            });
        }

        if reading.turbidity > 1.0 {
            recommendations.push("Turbidity high - backwash filters".to_string());
            actions.push(RecommendedAction::FilterMaintenance { action: "backwash" });
        }

        if recommendations.is_empty() {
            recommendations.push("Water quality within optimal ranges".to_string());
        }

        Optimization {
            recommendations,
            actions,
            quality_score: quality_score(reading),
            status: quality::quality_status(reading),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(tds: f64, ph: f64, orp: f64, turbidity: f64) -> SensorReading {
        SensorReading::now(tds, ph, orp, turbidity, 22.0)
    }

    #[test]
    fn test_optimal_water_no_actions() {
        let optimizer = Optimizer::new();
        let opt = optimizer.recommendations(&reading(225.0, 7.2, 450.0, 0.3));
        assert!(opt.actions.is_empty());
        assert_eq!(opt.recommendations.len(), 1);
        assert!(opt.recommendations[0].contains("optimal"));
    }

    #[test]
    fn test_high_tds_triggers_ro() {
        let optimizer = Optimizer::new();
        let opt = optimizer.recommendations(&reading(400.0, 7.2, 450.0, 0.3));
        assert!(matches!(
            opt.actions[0],
            RecommendedAction::FilterAdjustment { parameter: "ro_pressure", .. }
        ));
    }

    #[test]
    fn test_compound_problems_stack() {
        let optimizer = Optimizer::new();
        let opt = optimizer.recommendations(&reading(400.0, 6.0, 250.0, 2.0));
        assert_eq!(opt.actions.len(), 4);
        assert!(opt.quality_score < 100.0);
        assert_eq!(opt.status, QualityStatus::Poor);
    }
}
