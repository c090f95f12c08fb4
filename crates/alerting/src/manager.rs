//! Alert Manager Implementation

use crate::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Alert manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Cooldown period between duplicate alert types (seconds)
    pub cooldown_seconds: u64,
    /// Maximum alerts per hour before throttling
    pub max_alerts_per_hour: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 1800, // 30 minutes
            max_alerts_per_hour: 20,
        }
    }
}

/// State of one alert type
#[derive(Debug, Clone)]
pub struct AlertState {
    /// Last time this alert type was fired
    pub last_fired: Instant,
    /// Number of times fired
    pub fire_count: usize,
    /// Whether the latest occurrence is acknowledged
    pub acknowledged: bool,
}

/// Alert manager for deduplication and throttling
///
/// Critical alerts bypass both the cooldown and the hourly cap.
pub struct AlertManager {
    config: AlertConfig,
    /// Alert states by alert type
    states: HashMap<String, AlertState>,
    /// Alerts fired in current hour
    hourly_count: usize,
    /// Hour start time
    hour_start: Instant,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
            hourly_count: 0,
            hour_start: Instant::now(),
        }
    }

    /// Check if an alert should be fired given cooldown and throttle state
    pub fn should_fire(&mut self, alert_type: &str, severity: Severity) -> bool {
        if severity == Severity::Critical {
            return true;
        }

        // Reset hourly counter if needed
        if self.hour_start.elapsed() > Duration::from_secs(3600) {
            self.hourly_count = 0;
            self.hour_start = Instant::now();
        }

        if self.hourly_count >= self.config.max_alerts_per_hour {
            warn!("Alert throttled: max alerts per hour reached");
            return false;
        }

        if let Some(state) = self.states.get(alert_type) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            if state.last_fired.elapsed() < cooldown {
                debug!(alert_type, "Alert suppressed: in cooldown period");
                return false;
            }
        }

        true
    }

    /// Record that an alert was fired
    pub fn record_fire(&mut self, alert_type: &str) {
        self.hourly_count += 1;

        let state = self.states.entry(alert_type.to_string()).or_insert(AlertState {
            last_fired: Instant::now(),
            fire_count: 0,
            acknowledged: false,
        });

        state.last_fired = Instant::now();
        state.fire_count += 1;
        state.acknowledged = false;

        info!(alert_type, count = state.fire_count, "Alert recorded");
    }

    /// Acknowledge an alert type
    pub fn acknowledge(&mut self, alert_type: &str) -> bool {
        if let Some(state) = self.states.get_mut(alert_type) {
            state.acknowledged = true;
            info!(alert_type, "Alert acknowledged");
            true
        } else {
            false
        }
    }

    /// Get pending (unacknowledged) alert types
    pub fn get_pending(&self) -> Vec<(&str, &AlertState)> {
        self.states
            .iter()
            .filter(|(_, state)| !state.acknowledged)
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }

    /// Get hourly alert count
    pub fn hourly_count(&self) -> usize {
        self.hourly_count
    }

    /// Clear all alert states
    pub fn clear(&mut self) {
        self.states.clear();
        self.hourly_count = 0;
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fire_allowed() {
        let mut manager = AlertManager::default();
        assert!(manager.should_fire("sensor_warning_ph", Severity::Medium));
    }

    #[test]
    fn test_deduplication() {
        let config = AlertConfig {
            cooldown_seconds: 60,
            ..Default::default()
        };
        let mut manager = AlertManager::new(config);

        assert!(manager.should_fire("sensor_warning_ph", Severity::Medium));
        manager.record_fire("sensor_warning_ph");

        // Immediate duplicate should not fire
        assert!(!manager.should_fire("sensor_warning_ph", Severity::Medium));
        // A different alert type is unaffected
        assert!(manager.should_fire("sensor_warning_tds", Severity::Medium));
    }

    #[test]
    fn test_critical_bypasses_cooldown() {
        let mut manager = AlertManager::default();
        manager.record_fire("emergency_stop");
        assert!(manager.should_fire("emergency_stop", Severity::Critical));
    }

    #[test]
    fn test_hourly_throttle() {
        let config = AlertConfig {
            cooldown_seconds: 0,
            max_alerts_per_hour: 3,
        };
        let mut manager = AlertManager::new(config);

        for i in 0..3 {
            let alert_type = format!("alert_{i}");
            assert!(manager.should_fire(&alert_type, Severity::Medium));
            manager.record_fire(&alert_type);
        }
        assert!(!manager.should_fire("alert_overflow", Severity::Medium));
        assert_eq!(manager.hourly_count(), 3);
    }

    #[test]
    fn test_acknowledgement() {
        let mut manager = AlertManager::default();
        manager.record_fire("filter_replacement");

        assert_eq!(manager.get_pending().len(), 1);
        assert!(manager.acknowledge("filter_replacement"));
        assert!(manager.get_pending().is_empty());
        assert!(!manager.acknowledge("unknown_type"));
    }
}
