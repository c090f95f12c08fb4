//! OpenWeatherMap Client with TTL Cache

use crate::WeatherError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP request timeout for a single fetch
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration
#[derive(Debug, Clone)]
pub struct WeatherClientConfig {
    /// OpenWeatherMap API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Cache lifetime in seconds (default: 600)
    pub cache_ttl_secs: u64,
}

impl Default for WeatherClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            cache_ttl_secs: 600,
        }
    }
}

/// Current weather conditions, reduced to what treatment analysis needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Pressure (hPa)
    pub pressure: f64,
    /// Condition group, e.g. "Clear", "Rain", "Haze"
    pub condition: String,
    /// Human-readable description
    pub description: String,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Rainfall over the last hour (mm)
    pub rainfall_1h: f64,
}

/// Raw OpenWeatherMap response shape (subset)
#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    #[serde(default)]
    wind: OwmWind,
    #[serde(default)]
    rain: OwmRain,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    main: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

impl From<OwmResponse> for CurrentWeather {
    fn from(raw: OwmResponse) -> Self {
        let (condition, description) = raw
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .unwrap_or_else(|| ("Clear".to_string(), String::new()));

        Self {
            temperature: raw.main.temp,
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            condition,
            description,
            wind_speed: raw.wind.speed,
            rainfall_1h: raw.rain.one_hour,
        }
    }
}

/// Weather client with per-coordinate response caching
pub struct WeatherClient {
    config: WeatherClientConfig,
    http: reqwest::Client,
    cache: Mutex<HashMap<String, (Instant, CurrentWeather)>>,
}

impl WeatherClient {
    /// Create a new client
    pub fn new(config: WeatherClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            config,
            http,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get current weather, serving from cache when fresh
    ///
    /// Returns `None` on any failure so callers degrade to
    /// weather-agnostic operation instead of erroring out.
    pub async fn current_weather(&self, latitude: f64, longitude: f64) -> Option<CurrentWeather> {
        let key = format!("{latitude:.3},{longitude:.3}");

        if let Some(cached) = self.cached(&key) {
            debug!(key, "Returning cached weather data");
            return Some(cached);
        }

        match self.fetch(latitude, longitude).await {
            Ok(weather) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(key, (Instant::now(), weather.clone()));
                }
                info!(latitude, longitude, "Weather data retrieved");
                Some(weather)
            }
            Err(e) => {
                warn!(latitude, longitude, error = %e, "Weather fetch failed, continuing without");
                None
            }
        }
    }

    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather, WeatherError> {
        let url = format!("{}/weather", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.config.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::HttpStatus(response.status().as_u16()));
        }

        let raw: OwmResponse = response.json().await?;
        Ok(raw.into())
    }

    fn cached(&self, key: &str) -> Option<CurrentWeather> {
        let cache = self.cache.lock().ok()?;
        let (inserted, weather) = cache.get(key)?;
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);
        if inserted.elapsed() < ttl {
            Some(weather.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owm_response_parsing() {
        let raw = r#"{
            "main": {"temp": 18.4, "humidity": 72.0, "pressure": 1012.0},
            "weather": [{"main": "Rain", "description": "light rain"}],
            "wind": {"speed": 4.1},
            "rain": {"1h": 1.2}
        }"#;
        let parsed: OwmResponse = serde_json::from_str(raw).unwrap();
        let weather: CurrentWeather = parsed.into();
        assert_eq!(weather.condition, "Rain");
        assert!((weather.rainfall_1h - 1.2).abs() < 1e-9);
        assert!((weather.wind_speed - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_optional_sections_default() {
        let raw = r#"{"main": {"temp": 21.0, "humidity": 50.0, "pressure": 1013.0}}"#;
        let parsed: OwmResponse = serde_json::from_str(raw).unwrap();
        let weather: CurrentWeather = parsed.into();
        assert_eq!(weather.condition, "Clear");
        assert_eq!(weather.rainfall_1h, 0.0);
        assert_eq!(weather.wind_speed, 0.0);
    }

    #[tokio::test]
    async fn test_unreachable_api_returns_none() {
        let config = WeatherClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let client = WeatherClient::new(config);
        assert!(client.current_weather(40.7, -74.0).await.is_none());
    }
}
