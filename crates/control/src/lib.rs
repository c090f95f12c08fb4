//! Hardware Control
//!
//! Simulated control plane for the purification hardware: valve and filter
//! commands with safety limits, drone dispatch with mission tracking, and
//! emergency stop. The command vocabulary matches the hardware serial
//! protocol (`"0"`/`"C"` for the valve, `"f"`/`"b"`/`"r"` for the filter)
//! so recorded actions stay compatible with the dashboard.

mod dispatch;
mod drone;
mod hardware;

pub use dispatch::{process_command, ControlOutcome, ControlRequest};
pub use drone::{
    DispatchReport, DroneController, DroneReport, DroneStatus, Mission, MissionStatus,
};
pub use hardware::{
    ControllerReport, ControllerStatus, EmergencyReport, FilterAction, FilterReport,
    HardwareController, HardwareConfig, ValveAction, ValveReport, ValveState,
};

use thiserror::Error;

/// Errors from the control layer
#[derive(Debug, Clone, Error)]
pub enum ControlError {
    /// Command string not in the protocol vocabulary
    #[error("Invalid {device} command: {command}")]
    InvalidCommand { device: &'static str, command: String },

    /// Valve operated too many times in the last hour
    #[error("Valve operation limit exceeded: too many operations in the last hour")]
    SafetyLimitExceeded,

    /// Drone cannot accept a mission right now
    #[error("Drone not available. Current status: {0}")]
    DroneUnavailable(String),

    /// Latitude/longitude outside valid bounds
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Drone dispatch requested without coordinates
    #[error("Missing coordinates for drone dispatch")]
    MissingCoordinates,

    /// Mission ID not known
    #[error("Mission not found: {0}")]
    MissionNotFound(String),

    /// Unknown command type in a control request
    #[error("Unknown command type: {0}")]
    UnknownCommandType(String),
}
