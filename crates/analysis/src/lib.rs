//! Water-Quality Analysis
//!
//! Rule-based replacements for the dashboard's "ML" surface: filter
//! saturation prediction, optimization recommendations, bundled analysis
//! reports and potability classification. There is no trained model behind
//! any of this; every output is a deterministic function of the readings.

mod analyzer;
mod optimizer;
mod predictor;

pub use analyzer::{
    analyze, classify_potability, Analysis, AnalysisAlert, OverallStatus, PotabilityReport,
};
pub use optimizer::{Optimization, Optimizer, RecommendedAction};
pub use predictor::{FilterAnalysis, FilterPredictor};

use thiserror::Error;

/// Errors from the analysis layer
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// No readings were supplied
    #[error("No sensor readings available for analysis")]
    NoData,
}
