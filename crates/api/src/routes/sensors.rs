//! Sensor Routes

use axum::extract::{Query, State};
use axum::Json;
use sensors::SensorReading;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::SharedState;

/// Query parameters for the history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Window size in hours, 1 to 168
    #[serde(default = "default_hours")]
    pub hours: u32,
}

fn default_hours() -> u32 {
    24
}

/// Response for the history endpoint
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub readings: Vec<SensorReading>,
    pub count: usize,
    pub hours: u32,
}

/// Get a fresh reading from the sensor array
pub async fn get_current(State(state): State<SharedState>) -> Json<SensorReading> {
    let mut state = state.write().await;
    Json(state.simulator.next_reading())
}

/// Get historical readings for the last N hours
pub async fn get_history(
    State(state): State<SharedState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    if !(1..=168).contains(&params.hours) {
        return Err(ApiError::bad_request("Hours must be between 1 and 168"));
    }

    let state = state.read().await;
    let readings = state.repository.recent_readings(params.hours).await?;

    Ok(Json(HistoryResponse {
        count: readings.len(),
        hours: params.hours,
        readings,
    }))
}
