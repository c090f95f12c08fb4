//! Water-Quality Sensor Array
//!
//! Provides the sensor reading type, hardware frame parsing, a drift-based
//! simulator, and the background monitoring loop.

mod monitor;
mod reading;
mod simulator;

pub use monitor::{Monitor, MonitorConfig};
pub use reading::SensorReading;
pub use simulator::{SensorSimulator, SimulatorConfig};

use thiserror::Error;

/// Errors from the sensor layer
#[derive(Debug, Clone, Error)]
pub enum SensorError {
    /// A hardware frame could not be parsed
    #[error("Invalid sensor frame: {0}")]
    InvalidFrame(String),

    /// A parameter value could not be parsed as a number
    #[error("Invalid value for {field}: {raw}")]
    InvalidValue { field: String, raw: String },
}
