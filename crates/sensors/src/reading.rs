//! Sensor Reading Type and Frame Parsing

use crate::SensorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single reading from the water-quality sensor array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Total Dissolved Solids (ppm)
    pub tds: f64,
    /// pH level (0-14)
    pub ph: f64,
    /// Oxidation Reduction Potential (mV)
    pub orp: f64,
    /// Turbidity (NTU)
    pub turbidity: f64,
    /// Temperature (°C)
    pub temperature: f64,
}

impl SensorReading {
    /// Create a reading stamped with the current time
    pub fn now(tds: f64, ph: f64, orp: f64, turbidity: f64, temperature: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            tds,
            ph,
            orp,
            turbidity,
            temperature,
        }
    }

    /// Parse a hardware frame of the form
    /// `"TDS:250.5,pH:7.2,ORP:350.0,TURB:0.5,TEMP:22.5"`.
    ///
    /// Keys are case-insensitive. Missing parameters fall back to neutral
    /// defaults; a pair without a `:` or with a non-numeric value is an error.
    pub fn parse_frame(frame: &str) -> Result<Self, SensorError> {
        let frame = frame.trim();
        if frame.is_empty() {
            return Err(SensorError::InvalidFrame("empty frame".to_string()));
        }

        let mut tds = 0.0;
        let mut ph = 7.0;
        let mut orp = 0.0;
        let mut turbidity = 0.0;
        let mut temperature = 20.0;

        for pair in frame.split(',') {
            let (key, value) = pair
                .split_once(':')
                .ok_or_else(|| SensorError::InvalidFrame(pair.to_string()))?;
            let key = key.trim().to_ascii_lowercase();
            let raw = value.trim();
            let value: f64 = raw.parse().map_err(|_| SensorError::InvalidValue {
                field: key.clone(),
                raw: raw.to_string(),
            })?;

            match key.as_str() {
                "tds" => tds = value,
                "ph" => ph = value,
                "orp" => orp = value,
                "turb" => turbidity = value,
                "temp" => temperature = value,
                // Unknown keys are tolerated so firmware can add fields
                _ => {}
            }
        }

        Ok(Self::now(tds, ph, orp, turbidity, temperature))
    }

    /// Whether every parameter is a finite number
    pub fn is_finite(&self) -> bool {
        self.tds.is_finite()
            && self.ph.is_finite()
            && self.orp.is_finite()
            && self.turbidity.is_finite()
            && self.temperature.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_frame() {
        let reading =
            SensorReading::parse_frame("TDS:250.5,pH:7.2,ORP:350.0,TURB:0.5,TEMP:22.5").unwrap();
        assert!((reading.tds - 250.5).abs() < 1e-9);
        assert!((reading.ph - 7.2).abs() < 1e-9);
        assert!((reading.orp - 350.0).abs() < 1e-9);
        assert!((reading.turbidity - 0.5).abs() < 1e-9);
        assert!((reading.temperature - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_missing_keys_use_defaults() {
        let reading = SensorReading::parse_frame("TDS:180.0").unwrap();
        assert!((reading.tds - 180.0).abs() < 1e-9);
        assert!((reading.ph - 7.0).abs() < 1e-9);
        assert!((reading.temperature - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let reading = SensorReading::parse_frame("tds:100,PH:6.8").unwrap();
        assert!((reading.ph - 6.8).abs() < 1e-9);
    }

    #[test]
    fn test_parse_malformed_pair() {
        assert!(SensorReading::parse_frame("TDS=250").is_err());
        assert!(SensorReading::parse_frame("").is_err());
    }

    #[test]
    fn test_parse_non_numeric_value() {
        let err = SensorReading::parse_frame("TDS:abc").unwrap_err();
        assert!(matches!(err, SensorError::InvalidValue { .. }));
    }
}
