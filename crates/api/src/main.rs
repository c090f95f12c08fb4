//! AquaSentinel Backend - Main Entry Point

use anyhow::Context;
use api::config::Settings;
use api::pipeline::{self, PipelineConfig};
use api::{create_router, init_logging, rate_limit, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use sensors::{MonitorConfig, SensorSimulator, SimulatorConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use storage::Repository;
use telemetry::{Telemetry, TelemetryConfig};
use tokio::sync::RwLock;
use tower_governor::GovernorLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = Settings::load().context("Failed to load configuration")?;

    info!("=== AquaSentinel Backend v{} ===", env!("CARGO_PKG_VERSION"));

    PrometheusBuilder::new()
        .install()
        .context("Failed to install metrics recorder")?;

    let repository = Repository::connect(&settings.database.url)
        .await
        .context("Failed to open database")?;

    let mut telemetry = Telemetry::new(TelemetryConfig {
        broker_host: settings.telemetry.broker_host.clone(),
        broker_port: settings.telemetry.broker_port,
        client_id: settings.telemetry.client_id.clone(),
        enabled: settings.telemetry.enabled,
    });
    telemetry.connect();

    let mut app_state = AppState::new(&settings, repository, telemetry);
    app_state.monitoring_active = true;
    let state = Arc::new(RwLock::new(app_state));

    // Background monitoring: its own simulator instance, so on-demand
    // reads never contend with the sampling cadence
    let pipeline_config = PipelineConfig {
        monitor: MonitorConfig {
            interval_secs: settings.monitor.interval_secs,
            error_backoff_secs: settings.monitor.error_backoff_secs,
        },
        analysis_every: settings.monitor.analysis_every,
        analysis_window_hours: settings.monitor.analysis_window_hours,
    };
    let simulator = SensorSimulator::new(SimulatorConfig::default());
    tokio::spawn(pipeline::run(state.clone(), pipeline_config, simulator));

    let governor = rate_limit::governor_config(&settings.rate_limit);
    let app = create_router(state).layer(GovernorLayer { config: governor });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
