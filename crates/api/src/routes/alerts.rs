//! Alert Routes

use alerting::{Alert, Severity};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use storage::AlertFilter;
use uuid::Uuid;

use crate::error::ApiError;
use crate::SharedState;

/// Query parameters for the alert listing
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Filter by severity (low/medium/high/critical)
    pub severity: Option<String>,
    /// Filter by acknowledged state
    pub acknowledged: Option<bool>,
    /// Maximum number of records
    pub limit: Option<i64>,
}

/// Response for the alert listing
#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<Alert>,
    pub count: usize,
    pub unacknowledged_count: i64,
}

/// Response for an acknowledgement
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub id: Uuid,
    pub acknowledged: bool,
}

/// List alerts, newest first
pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<AlertQuery>,
) -> Result<Json<AlertListResponse>, ApiError> {
    let severity = params
        .severity
        .as_deref()
        .map(|s| s.parse::<Severity>())
        .transpose()
        .map_err(ApiError::bad_request)?;

    let state = state.read().await;
    let filter = AlertFilter {
        severity,
        acknowledged: params.acknowledged,
        limit: params.limit,
    };
    let alerts = state.repository.list_alerts(&filter).await?;
    let counts = state.repository.counts().await?;

    Ok(Json(AlertListResponse {
        count: alerts.len(),
        unacknowledged_count: counts.unacknowledged_alerts,
        alerts,
    }))
}

/// Acknowledge one alert by ID
pub async fn acknowledge(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let state = state.read().await;
    if !state.repository.acknowledge_alert(id).await? {
        return Err(ApiError::not_found(format!("No alert with id {id}")));
    }

    Ok(Json(AckResponse {
        id,
        acknowledged: true,
    }))
}
