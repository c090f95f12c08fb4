//! Water-Quality Validation and Scoring
//!
//! Provides range validation against WHO-style bands, anomaly detection,
//! quality status/score computation and noise filtering.

mod anomaly;
mod error;
mod filter;
mod score;
mod validator;

pub use anomaly::{AnomalyDetector, AnomalyReport};
pub use error::ValidationError;
pub use filter::MedianFilter;
pub use score::{quality_score, quality_status, QualityStatus};
pub use validator::{Validator, ValidationConfig, Warning};
