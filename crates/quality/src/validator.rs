//! Reading Validator Against Safe-Water Bands

use crate::error::ValidationError;
use sensors::SensorReading;
use serde::{Deserialize, Serialize};

/// Validation configuration
///
/// Default bands follow WHO drinking-water guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// pH valid range
    pub ph_range: (f64, f64),
    /// TDS valid range (ppm)
    pub tds_range: (f64, f64),
    /// ORP valid range (mV)
    pub orp_range: (f64, f64),
    /// Turbidity upper bound (NTU)
    pub turbidity_max: f64,
    /// Temperature valid range (°C)
    pub temperature_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ph_range: (6.5, 8.5),
            tds_range: (50.0, 600.0),
            orp_range: (200.0, 800.0),
            turbidity_max: 1.0,
            temperature_range: (0.0, 40.0),
        }
    }
}

/// A human-readable warning about one parameter
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    /// Parameter name
    pub parameter: &'static str,
    /// Offending value
    pub value: f64,
    /// Operator-facing message
    pub message: String,
}

/// Validator for sensor readings
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate pH
    pub fn validate_ph(&self, ph: f64) -> Result<(), ValidationError> {
        self.validate_range("ph", ph, self.config.ph_range)
    }

    /// Validate TDS
    pub fn validate_tds(&self, tds: f64) -> Result<(), ValidationError> {
        self.validate_range("tds", tds, self.config.tds_range)
    }

    /// Validate ORP
    pub fn validate_orp(&self, orp: f64) -> Result<(), ValidationError> {
        self.validate_range("orp", orp, self.config.orp_range)
    }

    /// Validate turbidity
    pub fn validate_turbidity(&self, turbidity: f64) -> Result<(), ValidationError> {
        self.validate_range("turbidity", turbidity, (0.0, self.config.turbidity_max))
    }

    /// Validate temperature
    pub fn validate_temperature(&self, temperature: f64) -> Result<(), ValidationError> {
        self.validate_range("temperature", temperature, self.config.temperature_range)
    }

    /// Check a reading against safe-water standards and collect warnings
    pub fn validate_reading(&self, reading: &SensorReading) -> Vec<Warning> {
        let mut warnings = Vec::new();

        if reading.ph < self.config.ph_range.0 {
            warnings.push(Warning {
                parameter: "ph",
                value: reading.ph,
                message: "pH too low - water is acidic".to_string(),
            });
        } else if reading.ph > self.config.ph_range.1 {
            warnings.push(Warning {
                parameter: "ph",
                value: reading.ph,
                message: "pH too high - water is alkaline".to_string(),
            });
        }

        if reading.tds > self.config.tds_range.1 {
            warnings.push(Warning {
                parameter: "tds",
                value: reading.tds,
                message: "TDS too high - excessive dissolved solids".to_string(),
            });
        } else if reading.tds < self.config.tds_range.0 {
            warnings.push(Warning {
                parameter: "tds",
                value: reading.tds,
                message: "TDS too low - may lack essential minerals".to_string(),
            });
        }

        if reading.turbidity > self.config.turbidity_max {
            warnings.push(Warning {
                parameter: "turbidity",
                value: reading.turbidity,
                message: "Turbidity too high - water appears cloudy".to_string(),
            });
        }

        if reading.orp < self.config.orp_range.0 {
            warnings.push(Warning {
                parameter: "orp",
                value: reading.orp,
                message: "ORP too low - poor disinfection potential".to_string(),
            });
        } else if reading.orp > self.config.orp_range.1 {
            warnings.push(Warning {
                parameter: "orp",
                value: reading.orp,
                message: "ORP too high - over-oxidized water".to_string(),
            });
        }

        warnings
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
