//! Control Command Dispatcher

use crate::{
    ControlError, DispatchReport, DroneController, EmergencyReport, FilterReport,
    HardwareController, ValveReport,
};
use serde::{Deserialize, Serialize};

/// An incoming control request
#[derive(Debug, Clone, Deserialize)]
pub struct ControlRequest {
    /// Command type: valve, filter, drone or emergency
    pub command_type: String,
    /// Device-specific command
    pub command: String,
    /// Latitude for drone dispatch
    pub latitude: Option<f64>,
    /// Longitude for drone dispatch
    pub longitude: Option<f64>,
}

/// Outcome of a processed control request
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ControlOutcome {
    Valve(ValveReport),
    Filter(FilterReport),
    Drone(DispatchReport),
    Emergency(EmergencyReport),
}

/// Route a control request to the right controller
pub async fn process_command(
    hardware: &mut HardwareController,
    drone: &mut DroneController,
    request: &ControlRequest,
) -> Result<ControlOutcome, ControlError> {
    match request.command_type.as_str() {
        "valve" => {
            let action = request.command.parse()?;
            Ok(ControlOutcome::Valve(hardware.control_valve(action).await?))
        }
        "filter" => {
            let action = request.command.parse()?;
            Ok(ControlOutcome::Filter(
                hardware.control_filter(action).await?,
            ))
        }
        "drone" => {
            if request.command != "dispatch" {
                return Err(ControlError::InvalidCommand {
                    device: "drone",
                    command: request.command.clone(),
                });
            }
            let latitude = request.latitude.ok_or(ControlError::MissingCoordinates)?;
            let longitude = request.longitude.ok_or(ControlError::MissingCoordinates)?;
            Ok(ControlOutcome::Drone(drone.dispatch(
                latitude,
                longitude,
                "delivery",
            )?))
        }
        "emergency" => Ok(ControlOutcome::Emergency(hardware.emergency_stop().await)),
        other => Err(ControlError::UnknownCommandType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValveState;

    fn request(command_type: &str, command: &str) -> ControlRequest {
        ControlRequest {
            command_type: command_type.to_string(),
            command: command.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_valve_routing() {
        let mut hardware = HardwareController::default();
        let mut drone = DroneController::new();

        let outcome = process_command(&mut hardware, &mut drone, &request("valve", "0"))
            .await
            .unwrap();
        match outcome {
            ControlOutcome::Valve(report) => assert_eq!(report.valve_state, ValveState::Open),
            _ => panic!("expected valve outcome"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drone_requires_coordinates() {
        let mut hardware = HardwareController::default();
        let mut drone = DroneController::new();

        let err = process_command(&mut hardware, &mut drone, &request("drone", "dispatch"))
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::MissingCoordinates));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_command_type() {
        let mut hardware = HardwareController::default();
        let mut drone = DroneController::new();

        let err = process_command(&mut hardware, &mut drone, &request("laser", "fire"))
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::UnknownCommandType(_)));
    }
}
