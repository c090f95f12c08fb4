//! Telemetry Publishing
//!
//! MQTT publisher for sensor readings, alerts and control events. The hub
//! degrades gracefully: when the broker is unreachable or telemetry is
//! disabled, publishes become logged no-ops instead of errors, so the
//! monitoring pipeline never stalls on connectivity.

use alerting::Alert;
use chrono::Utc;
use rumqttc::{AsyncClient, Event, MqttOptions, QoS};
use sensors::SensorReading;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Topic for sensor data frames
const TOPIC_SENSORS: &str = "aquasentinel/sensors/data";
/// Topic for alert notifications
const TOPIC_ALERTS: &str = "aquasentinel/alerts";
/// Topic for drone dispatch commands
const TOPIC_DRONE: &str = "aquasentinel/drone/dispatch";

/// Telemetry error types
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Telemetry hub configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// MQTT broker host
    pub broker_host: String,
    /// MQTT broker port
    pub broker_port: u16,
    /// Client ID presented to the broker
    pub client_id: String,
    /// Whether telemetry is enabled at all
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "aquasentinel-backend".to_string(),
            enabled: true,
        }
    }
}

/// MQTT publisher for the monitoring pipeline
pub struct Telemetry {
    config: TelemetryConfig,
    client: Option<AsyncClient>,
}

impl Telemetry {
    /// Create a hub that is not yet connected
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Create a hub with telemetry turned off
    pub fn disabled() -> Self {
        Self {
            config: TelemetryConfig {
                enabled: false,
                ..Default::default()
            },
            client: None,
        }
    }

    /// Connect to the broker and spawn the event loop
    ///
    /// Connection problems surface later through the event loop, which
    /// retries with a delay; a hub that never manages to connect still
    /// accepts publishes and drops them.
    pub fn connect(&mut self) {
        if !self.config.enabled {
            info!("Telemetry disabled, publishes will be dropped");
            return;
        }

        let mut options = MqttOptions::new(
            &self.config.client_id,
            &self.config.broker_host,
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(incoming)) => {
                        debug!("MQTT incoming: {:?}", incoming);
                    }
                    Err(e) => {
                        error!("MQTT error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    _ => {}
                }
            }
        });

        self.client = Some(client);
        info!(
            broker = %self.config.broker_host,
            port = self.config.broker_port,
            "Telemetry connected"
        );
    }

    /// Whether a broker connection has been established
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Publish a sensor reading
    pub async fn publish_reading(&self, reading: &SensorReading) -> Result<(), TelemetryError> {
        self.publish(TOPIC_SENSORS, serde_json::to_vec(reading)?)
            .await
    }

    /// Publish an alert notification
    pub async fn publish_alert(&self, alert: &Alert) -> Result<(), TelemetryError> {
        self.publish(TOPIC_ALERTS, serde_json::to_vec(alert)?).await
    }

    /// Publish an executed hardware command
    pub async fn publish_hardware_command(
        &self,
        device: &str,
        command: &str,
    ) -> Result<(), TelemetryError> {
        let payload = serde_json::json!({
            "device": device,
            "command": command,
            "timestamp": Utc::now().to_rfc3339(),
        });
        let topic = format!("aquasentinel/hardware/{device}");
        self.publish(&topic, serde_json::to_vec(&payload)?).await
    }

    /// Publish a drone dispatch command
    pub async fn publish_drone_dispatch(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), TelemetryError> {
        let payload = serde_json::json!({
            "command": "dispatch",
            "latitude": latitude,
            "longitude": longitude,
            "timestamp": Utc::now().to_rfc3339(),
        });
        self.publish(TOPIC_DRONE, serde_json::to_vec(&payload)?)
            .await
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TelemetryError> {
        let Some(client) = &self.client else {
            debug!(topic, "Telemetry offline, publish dropped");
            return Ok(());
        };

        client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| TelemetryError::Publish(e.to_string()))?;

        debug!(topic, "Telemetry published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::Severity;

    #[tokio::test]
    async fn test_disconnected_publish_is_noop() {
        let hub = Telemetry::new(TelemetryConfig::default());
        assert!(!hub.is_connected());

        let reading = SensorReading::now(250.0, 7.2, 450.0, 0.3, 22.0);
        hub.publish_reading(&reading).await.unwrap();

        let alert = Alert::new("water_quality", Severity::Medium, "score low");
        hub.publish_alert(&alert).await.unwrap();
        hub.publish_hardware_command("valve", "0").await.unwrap();
        hub.publish_drone_dispatch(40.7, -74.0).await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_connect_stays_offline() {
        let mut hub = Telemetry::disabled();
        hub.connect();
        assert!(!hub.is_connected());
    }
}
