//! Simulated Hardware Controller

use crate::ControlError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Simulated command processing delay
const COMMAND_DELAY: Duration = Duration::from_millis(100);

/// Valve state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValveState {
    Open,
    Closed,
    Unknown,
}

impl ValveState {
    /// Protocol code for the state
    pub fn code(&self) -> &'static str {
        match self {
            ValveState::Open => "0",
            ValveState::Closed => "C",
            ValveState::Unknown => "U",
        }
    }
}

/// A valve command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveAction {
    Open,
    Close,
}

impl FromStr for ValveAction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "open" => Ok(ValveAction::Open),
            "C" | "close" => Ok(ValveAction::Close),
            other => Err(ControlError::InvalidCommand {
                device: "valve",
                command: other.to_string(),
            }),
        }
    }
}

/// A filter mechanism command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Forward,
    Backward,
    Rotate,
    Stop,
}

impl FilterAction {
    /// Protocol code for the action
    pub fn code(&self) -> &'static str {
        match self {
            FilterAction::Forward => "f",
            FilterAction::Backward => "b",
            FilterAction::Rotate => "r",
            FilterAction::Stop => "s",
        }
    }

    /// Past-tense description for reports
    fn description(&self) -> &'static str {
        match self {
            FilterAction::Forward => "moved forward",
            FilterAction::Backward => "moved backward",
            FilterAction::Rotate => "rotated",
            FilterAction::Stop => "stopped",
        }
    }
}

impl FromStr for FilterAction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" | "forward" => Ok(FilterAction::Forward),
            "b" | "backward" => Ok(FilterAction::Backward),
            "r" | "rotate" => Ok(FilterAction::Rotate),
            other => Err(ControlError::InvalidCommand {
                device: "filter",
                command: other.to_string(),
            }),
        }
    }
}

/// Controller status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerStatus {
    Ready,
    Busy,
    Error,
    Disconnected,
}

/// Controller configuration
#[derive(Debug, Clone)]
pub struct HardwareConfig {
    /// Safety cap on valve operations per rolling hour
    pub max_valve_operations_per_hour: usize,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            max_valve_operations_per_hour: 100,
        }
    }
}

/// One executed command, for the status history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of a valve command
#[derive(Debug, Clone, Serialize)]
pub struct ValveReport {
    pub action: &'static str,
    pub valve_state: ValveState,
    pub timestamp: DateTime<Utc>,
}

/// Result of a filter command
#[derive(Debug, Clone, Serialize)]
pub struct FilterReport {
    pub action: &'static str,
    pub filter_position: FilterAction,
    pub timestamp: DateTime<Utc>,
}

/// Result of an emergency stop
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyReport {
    pub message: &'static str,
    pub valve_state: ValveState,
    pub filter_position: FilterAction,
    pub timestamp: DateTime<Utc>,
}

/// Full controller status report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerReport {
    pub controller_status: ControllerStatus,
    pub valve_state: ValveState,
    pub filter_position: FilterAction,
    pub last_command_time: Option<DateTime<Utc>>,
    pub valve_operations_this_hour: usize,
    pub recent_commands: Vec<CommandRecord>,
}

/// Simulated hardware controller for the purification system
///
/// There is no real serial link; commands update in-process state after a
/// short simulated delay, mirroring how the hardware behaves in
/// development mode.
pub struct HardwareController {
    config: HardwareConfig,
    status: ControllerStatus,
    valve_state: ValveState,
    filter_position: FilterAction,
    last_command_time: Option<DateTime<Utc>>,
    history: Vec<CommandRecord>,
    valve_operation_count: usize,
    valve_count_reset: Instant,
}

impl HardwareController {
    /// Create a new controller in the ready state
    pub fn new(config: HardwareConfig) -> Self {
        Self {
            config,
            status: ControllerStatus::Ready,
            valve_state: ValveState::Unknown,
            filter_position: FilterAction::Stop,
            last_command_time: None,
            history: Vec::new(),
            valve_operation_count: 0,
            valve_count_reset: Instant::now(),
        }
    }

    /// Open or close the valve
    pub async fn control_valve(&mut self, action: ValveAction) -> Result<ValveReport, ControlError> {
        if !self.within_valve_safety_limit() {
            warn!("Valve command rejected: safety limit reached");
            return Err(ControlError::SafetyLimitExceeded);
        }

        self.status = ControllerStatus::Busy;
        let (state, code, description) = match action {
            ValveAction::Open => (ValveState::Open, "0", "opened"),
            ValveAction::Close => (ValveState::Closed, "C", "closed"),
        };
        self.execute(code).await;

        self.valve_state = state;
        self.valve_operation_count += 1;
        self.status = ControllerStatus::Ready;
        info!(action = description, "Valve command executed");

        Ok(ValveReport {
            action: description,
            valve_state: self.valve_state,
            timestamp: Utc::now(),
        })
    }

    /// Move or rotate the filter mechanism
    pub async fn control_filter(
        &mut self,
        action: FilterAction,
    ) -> Result<FilterReport, ControlError> {
        self.status = ControllerStatus::Busy;
        self.execute(action.code()).await;

        self.filter_position = action;
        self.status = ControllerStatus::Ready;
        info!(action = action.description(), "Filter command executed");

        Ok(FilterReport {
            action: action.description(),
            filter_position: self.filter_position,
            timestamp: Utc::now(),
        })
    }

    /// Stop everything and close the valve
    pub async fn emergency_stop(&mut self) -> EmergencyReport {
        warn!("Emergency stop activated");

        self.execute("STOP").await;
        self.execute(ValveState::Closed.code()).await;

        self.valve_state = ValveState::Closed;
        self.filter_position = FilterAction::Stop;
        self.status = ControllerStatus::Ready;

        EmergencyReport {
            message: "Emergency stop executed",
            valve_state: self.valve_state,
            filter_position: self.filter_position,
            timestamp: Utc::now(),
        }
    }

    /// Get current controller status
    pub fn report(&self) -> ControllerReport {
        let recent = self.history.iter().rev().take(5).rev().cloned().collect();
        ControllerReport {
            controller_status: self.status,
            valve_state: self.valve_state,
            filter_position: self.filter_position,
            last_command_time: self.last_command_time,
            valve_operations_this_hour: self.valve_operation_count,
            recent_commands: recent,
        }
    }

    /// Simulate sending one command to the hardware
    async fn execute(&mut self, command: &str) {
        tokio::time::sleep(COMMAND_DELAY).await;
        let now = Utc::now();
        self.last_command_time = Some(now);
        self.history.push(CommandRecord {
            command: command.to_string(),
            timestamp: now,
        });
    }

    fn within_valve_safety_limit(&mut self) -> bool {
        // Rolling-hour counter reset
        if self.valve_count_reset.elapsed() > Duration::from_secs(3600) {
            self.valve_operation_count = 0;
            self.valve_count_reset = Instant::now();
        }
        self.valve_operation_count < self.config.max_valve_operations_per_hour
    }
}

impl Default for HardwareController {
    fn default() -> Self {
        Self::new(HardwareConfig::default())
    }
}
