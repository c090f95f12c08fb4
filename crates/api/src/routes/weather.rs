//! Weather Routes

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use weather::{ConditionAnalysis, CurrentWeather, WeatherAlert};

use crate::error::ApiError;
use crate::SharedState;

/// Query parameters for the weather endpoint
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// Monitoring location name; defaults to the first registered site
    pub location: Option<String>,
}

/// Weather status and treatment recommendations for one site
#[derive(Debug, Serialize)]
pub struct WeatherStatusResponse {
    /// "ok" or "unavailable" when the upstream API cannot be reached
    pub status: &'static str,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<CurrentWeather>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ConditionAnalysis>,
    pub alerts: Vec<WeatherAlert>,
    pub monitoring_locations: usize,
}

/// Get weather-based treatment recommendations
///
/// An unreachable weather API is not an error: the response degrades to
/// `status: "unavailable"` with no analysis so callers can fall back to
/// weather-agnostic operation.
pub async fn get_status(
    State(state): State<SharedState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherStatusResponse>, ApiError> {
    let state = state.read().await;

    let location = state
        .locations
        .resolve(params.location.as_deref())
        .map_err(|e| ApiError::not_found(e.to_string()))?;

    let monitoring_locations = state.locations.locations().len();

    let Some(conditions) = state
        .weather
        .current_weather(location.latitude, location.longitude)
        .await
    else {
        return Ok(Json(WeatherStatusResponse {
            status: "unavailable",
            location: location.name.clone(),
            conditions: None,
            analysis: None,
            alerts: Vec::new(),
            monitoring_locations,
        }));
    };

    let analysis = state.weather_analyzer.analyze(&conditions, location.area_type);
    let alerts = state.locations.check_alerts(location, &conditions);

    Ok(Json(WeatherStatusResponse {
        status: "ok",
        location: location.name.clone(),
        conditions: Some(conditions),
        analysis: Some(analysis),
        alerts,
        monitoring_locations,
    }))
}
