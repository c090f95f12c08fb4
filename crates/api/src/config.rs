//! Service Configuration
//!
//! Settings are layered: built-in defaults, then an optional
//! `aquasentinel.toml` next to the binary, then `AQUA_`-prefixed
//! environment variables (`AQUA_SERVER__PORT=9000` overrides
//! `server.port`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use weather::AreaType;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite URL, e.g. `sqlite://aquasentinel.db`
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    /// Sampling interval in seconds
    pub interval_secs: u64,
    /// Backoff after a failed tick in seconds
    pub error_backoff_secs: u64,
    /// Run a full analysis pass every Nth reading
    pub analysis_every: u64,
    /// Hour window fed into the periodic analysis pass
    pub analysis_window_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    pub enabled: bool,
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSettings {
    /// OpenWeatherMap API key; weather features degrade to no-ops when empty
    pub api_key: String,
    /// Primary monitoring site
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_type: AreaType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Seconds to replenish one request cell
    pub per_second: u64,
    /// Requests that may be made back to back
    pub burst_size: u32,
}

/// Top-level service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub monitor: MonitorSettings,
    pub telemetry: TelemetrySettings,
    pub weather: WeatherSettings,
    pub rate_limit: RateLimitSettings,
}

impl Settings {
    /// Load settings from defaults, optional file and environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.url", "sqlite://aquasentinel.db")?
            .set_default("monitor.interval_secs", 30)?
            .set_default("monitor.error_backoff_secs", 60)?
            .set_default("monitor.analysis_every", 10)?
            .set_default("monitor.analysis_window_hours", 24)?
            .set_default("telemetry.enabled", false)?
            .set_default("telemetry.broker_host", "localhost")?
            .set_default("telemetry.broker_port", 1883)?
            .set_default("telemetry.client_id", "aquasentinel-backend")?
            .set_default("weather.api_key", "")?
            .set_default("weather.location_name", "Primary Site")?
            .set_default("weather.latitude", 40.7128)?
            .set_default("weather.longitude", -74.0060)?
            .set_default("weather.area_type", "urban")?
            .set_default("rate_limit.per_second", 1)?
            .set_default("rate_limit.burst_size", 30)?
            .add_source(File::with_name("aquasentinel").required(false))
            .add_source(Environment::with_prefix("AQUA").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let settings = Settings::load().unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.monitor.interval_secs, 30);
        assert_eq!(settings.monitor.analysis_every, 10);
        assert_eq!(settings.weather.area_type, AreaType::Urban);
        assert!(!settings.telemetry.enabled);
    }
}
