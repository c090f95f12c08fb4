//! AquaSentinel API Server
//!
//! REST surface over the water-quality monitoring backend: sensor data,
//! rule-based analysis, alerting, hardware control and weather-informed
//! treatment recommendations.

use alerting::AlertManager;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use control::{ControllerReport, ControllerStatus, DroneController, DroneReport, HardwareController};
use quality::{MedianFilter, Validator};
use sensors::SensorSimulator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use telemetry::Telemetry;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use weather::{LocationRegistry, WeatherAnalyzer, WeatherClient};

pub mod config;
mod error;
pub mod pipeline;
pub mod rate_limit;
mod routes;

use crate::config::Settings;
use crate::error::ApiError;
use storage::Repository;

/// Application state shared across handlers and the pipeline
pub struct AppState {
    /// Storage repository
    pub repository: Repository,
    /// Simulator serving on-demand readings for `/sensors/current`
    pub simulator: SensorSimulator,
    /// Reading validator
    pub validator: Validator,
    /// Smooths single-tick turbidity spikes out of the monitored feed
    pub turbidity_filter: MedianFilter,
    /// Alert deduplication and throttling
    pub alerts: AlertManager,
    /// Simulated purification hardware
    pub hardware: HardwareController,
    /// Drone dispatch
    pub drone: DroneController,
    /// MQTT publisher
    pub telemetry: Telemetry,
    /// Weather API client
    pub weather: WeatherClient,
    /// Weather impact analyzer
    pub weather_analyzer: WeatherAnalyzer,
    /// Monitored sites
    pub locations: LocationRegistry,
    /// Whether the background pipeline is running
    pub monitoring_active: bool,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

/// Shared handle to the application state
pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    /// Assemble the state from loaded settings and connected components
    pub fn new(settings: &Settings, repository: Repository, telemetry: Telemetry) -> Self {
        let weather = WeatherClient::new(weather::WeatherClientConfig {
            api_key: settings.weather.api_key.clone(),
            ..Default::default()
        });

        let mut locations = LocationRegistry::new();
        locations.add(
            settings.weather.location_name.clone(),
            settings.weather.latitude,
            settings.weather.longitude,
            settings.weather.area_type,
        );

        Self {
            repository,
            simulator: SensorSimulator::new(sensors::SimulatorConfig::default()),
            validator: Validator::new(quality::ValidationConfig::default()),
            turbidity_filter: MedianFilter::new(5),
            alerts: AlertManager::default(),
            hardware: HardwareController::new(control::HardwareConfig::default()),
            drone: DroneController::new(),
            telemetry,
            weather,
            weather_analyzer: WeatherAnalyzer::new(),
            locations,
            monitoring_active: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    #[cfg(test)]
    pub(crate) async fn for_tests() -> Self {
        let settings = Settings::load().expect("default settings");
        let repository = Repository::in_memory().await.expect("in-memory database");
        let mut state = Self::new(&settings, repository, Telemetry::disabled());
        state.simulator = SensorSimulator::with_seed(sensors::SimulatorConfig::default(), 42);
        state
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub metrics: SystemMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub monitor: &'static str,
    pub controller: ControllerStatus,
    pub telemetry: &'static str,
    pub storage: &'static str,
}

/// Row counts surfaced by health and status
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub readings: i64,
    pub alerts: i64,
    pub unacknowledged_alerts: i64,
    pub control_actions: i64,
}

/// Comprehensive system status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub sensors: SensorStatus,
    pub controller: ControllerReport,
    pub drone: DroneReport,
    pub telemetry: TelemetryStatus,
    pub weather: WeatherSummary,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SensorStatus {
    pub monitoring_active: bool,
    pub readings_last_hour: usize,
}

#[derive(Debug, Serialize)]
pub struct TelemetryStatus {
    pub mqtt_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct WeatherSummary {
    pub monitoring_locations: usize,
}

/// Create the application router
///
/// The per-IP rate limiting layer is applied by the binary, where connect
/// info is available; see `rate_limit`.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/status", get(status_handler))
        .route("/api/v1/sensors/current", get(routes::sensors::get_current))
        .route("/api/v1/sensors/history", get(routes::sensors::get_history))
        .route("/api/v1/ml/analysis", get(routes::analysis::get_analysis))
        .route("/api/v1/predict", post(routes::analysis::predict))
        .route("/api/v1/control", post(routes::control::execute))
        .route("/api/v1/emergency/stop", post(routes::control::emergency_stop))
        .route("/api/v1/drone/status", get(routes::control::drone_status))
        .route("/api/v1/drone/missions/:id", get(routes::control::mission_status))
        .route("/api/v1/alerts", get(routes::alerts::list))
        .route("/api/v1/alerts/:id/ack", post(routes::alerts::acknowledge))
        .route("/api/v1/weather", get(routes::weather::get_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(
    State(state): State<SharedState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let state = state.read().await;
    let counts = state.repository.counts().await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            monitor: if state.monitoring_active { "running" } else { "idle" },
            controller: state.hardware.report().controller_status,
            telemetry: if state.telemetry.is_connected() { "connected" } else { "offline" },
            storage: "ok",
        },
        metrics: SystemMetrics {
            readings: counts.readings,
            alerts: counts.alerts,
            unacknowledged_alerts: counts.unacknowledged_alerts,
            control_actions: counts.control_actions,
        },
    }))
}

/// Comprehensive status handler
async fn status_handler(
    State(state): State<SharedState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut state = state.write().await;
    let readings_last_hour = state.repository.recent_readings(1).await?.len();

    Ok(Json(StatusResponse {
        sensors: SensorStatus {
            monitoring_active: state.monitoring_active,
            readings_last_hour,
        },
        controller: state.hardware.report(),
        drone: state.drone.report(),
        telemetry: TelemetryStatus {
            mqtt_connected: state.telemetry.is_connected(),
        },
        weather: WeatherSummary {
            monitoring_locations: state.locations.locations().len(),
        },
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
