//! Control Routes

use alerting::{Alert, Severity};
use axum::extract::{Path, State};
use axum::Json;
use control::{process_command, ControlOutcome, ControlRequest, DroneReport, EmergencyReport, Mission};
use metrics::counter;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::SharedState;

/// Execute a hardware control command
pub async fn execute(
    State(state): State<SharedState>,
    Json(request): Json<ControlRequest>,
) -> Result<Json<ControlOutcome>, ApiError> {
    let mut state = state.write().await;
    let state = &mut *state;

    let outcome = process_command(&mut state.hardware, &mut state.drone, &request).await?;
    counter!("aqua_control_commands_total").increment(1);

    let outcome_json = serde_json::to_value(&outcome)
        .map_err(|e| ApiError::internal(format!("Failed to serialize outcome: {e}")))?;
    state
        .repository
        .record_control_action(&request.command_type, &request.command, &outcome_json)
        .await?;

    // Mirror the executed command onto the telemetry bus; failures are
    // logged, the command already ran.
    let published = match &outcome {
        ControlOutcome::Valve(_) | ControlOutcome::Filter(_) => {
            state
                .telemetry
                .publish_hardware_command(&request.command_type, &request.command)
                .await
        }
        ControlOutcome::Drone(report) => {
            state
                .telemetry
                .publish_drone_dispatch(report.latitude, report.longitude)
                .await
        }
        ControlOutcome::Emergency(_) => {
            state
                .telemetry
                .publish_hardware_command("emergency", "stop")
                .await
        }
    };
    if let Err(e) = published {
        warn!(error = %e, "Failed to publish control event");
    }

    Ok(Json(outcome))
}

/// Emergency stop all operations
pub async fn emergency_stop(
    State(state): State<SharedState>,
) -> Result<Json<EmergencyReport>, ApiError> {
    let mut state = state.write().await;
    let state = &mut *state;

    let report = state.hardware.emergency_stop().await;
    counter!("aqua_emergency_stops_total").increment(1);

    let report_json = serde_json::to_value(&report)
        .map_err(|e| ApiError::internal(format!("Failed to serialize report: {e}")))?;
    state
        .repository
        .record_control_action("emergency", "stop", &report_json)
        .await?;

    // Critical alerts bypass dedup, so this always fires
    let alert = Alert::new(
        "emergency_stop",
        Severity::Critical,
        "Emergency stop activated via API",
    );
    state.alerts.record_fire(&alert.alert_type);
    state.repository.insert_alert(&alert).await?;
    if let Err(e) = state.telemetry.publish_alert(&alert).await {
        warn!(error = %e, "Failed to publish emergency alert");
    }

    Ok(Json(report))
}

/// Get drone system status
pub async fn drone_status(State(state): State<SharedState>) -> Json<DroneReport> {
    let mut state = state.write().await;
    Json(state.drone.report())
}

/// Get the status of one drone mission
pub async fn mission_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mission>, ApiError> {
    let mut state = state.write().await;
    let mission = state.drone.mission(id)?;
    Ok(Json(mission.clone()))
}
