//! Background Monitoring Loop

use crate::{SensorReading, SensorSimulator};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Configuration for the monitoring loop
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sampling interval in seconds (default: 30)
    pub interval_secs: u64,
    /// Backoff after a failed tick in seconds (default: 60)
    pub error_backoff_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            error_backoff_secs: 60,
        }
    }
}

/// Timer-driven monitor that samples the simulator and forwards readings
///
/// Consumers receive readings over an mpsc channel; persistence, validation,
/// alerting and analysis all happen downstream. A send only fails once the
/// receiver is gone, at which point the loop stops.
pub struct Monitor {
    config: MonitorConfig,
    simulator: SensorSimulator,
    running: bool,
}

impl Monitor {
    /// Create a new monitor
    pub fn new(config: MonitorConfig, simulator: SensorSimulator) -> Self {
        Self {
            config,
            simulator,
            running: false,
        }
    }

    /// Take a single reading immediately, outside the loop cadence
    pub fn sample_now(&mut self) -> SensorReading {
        self.simulator.next_reading()
    }

    /// Run the monitoring loop until the receiver is dropped
    pub async fn run(&mut self, tx: mpsc::Sender<SensorReading>) {
        info!(
            interval_secs = self.config.interval_secs,
            "Starting sensor monitoring loop"
        );
        self.running = true;
        let interval = Duration::from_secs(self.config.interval_secs);

        while self.running {
            let reading = self.simulator.next_reading();

            if tx.send(reading).await.is_err() {
                info!("Reading channel closed, stopping monitor");
                break;
            }
            tokio::time::sleep(interval).await;
        }

        self.running = false;
        info!("Sensor monitoring loop stopped");
    }

    /// Request the loop to stop after the current tick
    pub fn stop(&mut self) {
        info!("Stopping sensor monitor");
        self.running = false;
    }

    /// Whether the loop is active
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulatorConfig;

    #[tokio::test(start_paused = true)]
    async fn test_monitor_forwards_readings() {
        let config = MonitorConfig {
            interval_secs: 1,
            error_backoff_secs: 1,
        };
        let sim = SensorSimulator::with_seed(SimulatorConfig::default(), 1);
        let mut monitor = Monitor::new(config, sim);
        let (tx, mut rx) = mpsc::channel(8);

        let handle = tokio::spawn(async move { monitor.run(tx).await });

        let first = rx.recv().await.expect("first reading");
        assert!(first.is_finite());
        let second = rx.recv().await.expect("second reading");
        assert!(second.timestamp >= first.timestamp);

        drop(rx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_monitor_stops_when_channel_closed() {
        let config = MonitorConfig {
            interval_secs: 0,
            error_backoff_secs: 0,
        };
        let sim = SensorSimulator::with_seed(SimulatorConfig::default(), 2);
        let mut monitor = Monitor::new(config, sim);
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // Must return rather than spin forever
        monitor.run(tx).await;
    }
}
