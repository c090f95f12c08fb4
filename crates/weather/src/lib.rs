//! Weather Integration
//!
//! Pulls current conditions from OpenWeatherMap and turns them into
//! treatment impact analysis, adjustments and threshold alerts. Network
//! failure is never fatal: callers get `None` and fall back to
//! weather-agnostic operation.

mod analyzer;
mod client;
mod locations;

pub use analyzer::{
    AreaType, ConditionAnalysis, ImpactAssessment, RiskLevel, TreatmentAdjustments,
    WeatherAnalyzer,
};
pub use client::{CurrentWeather, WeatherClient, WeatherClientConfig};
pub use locations::{Location, LocationRegistry, WeatherAlert};

use thiserror::Error;

/// Errors from the weather layer
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The HTTP request failed (network, DNS, timeout)
    #[error("Weather request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-success status
    #[error("Weather API returned HTTP {0}")]
    HttpStatus(u16),

    /// No monitoring locations configured
    #[error("No monitoring locations configured")]
    NoLocations,
}
