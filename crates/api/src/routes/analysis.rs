//! Analysis Routes

use analysis::{analyze, classify_potability, Analysis, PotabilityReport};
use axum::extract::{Query, State};
use axum::Json;
use sensors::SensorReading;
use serde::Deserialize;

use crate::error::ApiError;
use crate::SharedState;

/// Query parameters for the analysis endpoint
///
/// `filter_usage_hours` is accepted for dashboard compatibility but does
/// not change the prediction; saturation is driven by filter age and
/// water quality.
#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default)]
    pub days_since_replacement: u32,
}

fn default_hours() -> u32 {
    24
}

/// A reading submitted for potability classification
///
/// Missing parameters fall back to typical clean-water values.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default = "default_tds")]
    pub tds: f64,
    #[serde(default = "default_ph")]
    pub ph: f64,
    #[serde(default = "default_orp")]
    pub orp: f64,
    #[serde(default = "default_turbidity")]
    pub turbidity: f64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_tds() -> f64 {
    250.0
}
fn default_ph() -> f64 {
    7.2
}
fn default_orp() -> f64 {
    400.0
}
fn default_turbidity() -> f64 {
    0.3
}
fn default_temperature() -> f64 {
    22.0
}

/// Run the rule-based analysis over recent readings
pub async fn get_analysis(
    State(state): State<SharedState>,
    Query(params): Query<AnalysisQuery>,
) -> Result<Json<Analysis>, ApiError> {
    if !(1..=168).contains(&params.hours) {
        return Err(ApiError::bad_request("Hours must be between 1 and 168"));
    }

    let state = state.read().await;
    let readings = state.repository.recent_readings(params.hours).await?;
    if readings.is_empty() {
        return Err(ApiError::not_found("No sensor data available for analysis"));
    }

    let analysis = analyze(&readings, params.days_since_replacement)
        .map_err(|e| ApiError::not_found(e.to_string()))?;
    Ok(Json(analysis))
}

/// Classify a single reading as potable or not
pub async fn predict(Json(request): Json<PredictRequest>) -> Json<PotabilityReport> {
    let reading = SensorReading::now(
        request.tds,
        request.ph,
        request.orp,
        request.turbidity,
        request.temperature,
    );
    Json(classify_potability(&reading))
}
