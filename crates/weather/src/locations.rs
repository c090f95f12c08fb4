//! Monitoring Location Registry and Weather Alerts

use crate::{AreaType, CurrentWeather, WeatherError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Alert thresholds applied at every location
const RAINFALL_ALERT_MM_H: f64 = 10.0;
const TEMPERATURE_MIN_C: f64 = 0.0;
const TEMPERATURE_MAX_C: f64 = 35.0;
const WIND_ALERT_M_S: f64 = 20.0;

/// A site whose weather is monitored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_type: AreaType,
}

/// A threshold breach at a monitored location
#[derive(Debug, Clone, Serialize)]
pub struct WeatherAlert {
    /// Stable alert type key
    pub alert_type: &'static str,
    /// Severity label matching the alerting crate vocabulary
    pub severity: &'static str,
    /// Location name
    pub location: String,
    /// Operator-facing message
    pub message: String,
    /// Offending value
    pub value: f64,
}

/// Registry of monitored locations with threshold alerting
#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a location for weather monitoring
    pub fn add(&mut self, name: impl Into<String>, latitude: f64, longitude: f64, area_type: AreaType) {
        let location = Location {
            name: name.into(),
            latitude,
            longitude,
            area_type,
        };
        info!(name = %location.name, "Added monitoring location");
        self.locations.push(location);
    }

    /// All registered locations
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Find a location by name, or fall back to the first registered one
    pub fn resolve(&self, name: Option<&str>) -> Result<&Location, WeatherError> {
        let fallback = self.locations.first().ok_or(WeatherError::NoLocations)?;
        Ok(name
            .and_then(|n| self.locations.iter().find(|l| l.name == n))
            .unwrap_or(fallback))
    }

    /// Check one location's weather against the alert thresholds
    pub fn check_alerts(&self, location: &Location, weather: &CurrentWeather) -> Vec<WeatherAlert> {
        let mut alerts = Vec::new();

        if weather.temperature < TEMPERATURE_MIN_C {
            alerts.push(WeatherAlert {
                alert_type: "low_temperature",
                severity: "medium",
                location: location.name.clone(),
                message: format!("Low temperature alert: {:.1}°C", weather.temperature),
                value: weather.temperature,
            });
        } else if weather.temperature > TEMPERATURE_MAX_C {
            alerts.push(WeatherAlert {
                alert_type: "high_temperature",
                severity: "medium",
                location: location.name.clone(),
                message: format!("High temperature alert: {:.1}°C", weather.temperature),
                value: weather.temperature,
            });
        }

        if weather.rainfall_1h > RAINFALL_ALERT_MM_H {
            alerts.push(WeatherAlert {
                alert_type: "heavy_rainfall",
                severity: "high",
                location: location.name.clone(),
                message: format!("Heavy rainfall alert: {:.1} mm/h", weather.rainfall_1h),
                value: weather.rainfall_1h,
            });
        }

        if weather.wind_speed > WIND_ALERT_M_S {
            alerts.push(WeatherAlert {
                alert_type: "high_wind",
                severity: "medium",
                location: location.name.clone(),
                message: format!("High wind speed alert: {:.1} m/s", weather.wind_speed),
                value: weather.wind_speed,
            });
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LocationRegistry {
        let mut registry = LocationRegistry::new();
        registry.add("Primary Site", 40.7128, -74.0060, AreaType::Urban);
        registry.add("Reservoir", 41.2, -73.9, AreaType::Rural);
        registry
    }

    fn weather(temperature: f64, rainfall: f64, wind: f64) -> CurrentWeather {
        CurrentWeather {
            temperature,
            humidity: 50.0,
            pressure: 1013.0,
            condition: "Clear".to_string(),
            description: String::new(),
            wind_speed: wind,
            rainfall_1h: rainfall,
        }
    }

    #[test]
    fn test_resolve_by_name_and_fallback() {
        let registry = registry();
        assert_eq!(registry.resolve(Some("Reservoir")).unwrap().name, "Reservoir");
        assert_eq!(registry.resolve(Some("nope")).unwrap().name, "Primary Site");
        assert_eq!(registry.resolve(None).unwrap().name, "Primary Site");
    }

    #[test]
    fn test_empty_registry_is_error() {
        let registry = LocationRegistry::new();
        assert!(matches!(registry.resolve(None), Err(WeatherError::NoLocations)));
    }

    #[test]
    fn test_no_alerts_in_calm_weather() {
        let registry = registry();
        let location = registry.resolve(None).unwrap();
        assert!(registry.check_alerts(location, &weather(20.0, 0.0, 5.0)).is_empty());
    }

    #[test]
    fn test_heavy_rain_is_high_severity() {
        let registry = registry();
        let location = registry.resolve(None).unwrap();
        let alerts = registry.check_alerts(location, &weather(20.0, 15.0, 5.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "heavy_rainfall");
        assert_eq!(alerts[0].severity, "high");
    }

    #[test]
    fn test_temperature_and_wind_alerts() {
        let registry = registry();
        let location = registry.resolve(None).unwrap();

        let cold = registry.check_alerts(location, &weather(-3.0, 0.0, 25.0));
        assert!(cold.iter().any(|a| a.alert_type == "low_temperature"));
        assert!(cold.iter().any(|a| a.alert_type == "high_wind"));

        let hot = registry.check_alerts(location, &weather(38.0, 0.0, 5.0));
        assert_eq!(hot[0].alert_type, "high_temperature");
    }
}
