//! Drone Dispatch and Mission Tracking

use crate::ControlError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Estimated flight time to any site (minutes)
const ESTIMATED_FLIGHT_MINUTES: i64 = 15;

/// Drone availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroneStatus {
    Available,
    Dispatched,
    Maintenance,
}

impl DroneStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DroneStatus::Available => "available",
            DroneStatus::Dispatched => "dispatched",
            DroneStatus::Maintenance => "maintenance",
        }
    }
}

impl Default for DroneStatus {
    fn default() -> Self {
        DroneStatus::Available
    }
}

/// Mission lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    Dispatched,
    Completed,
}

/// One drone mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub mission_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: MissionStatus,
    pub dispatch_time: DateTime<Utc>,
    pub estimated_arrival: DateTime<Utc>,
    pub completion_time: Option<DateTime<Utc>>,
}

/// Report returned on a successful dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub mission_id: Uuid,
    pub message: String,
    pub latitude: f64,
    pub longitude: f64,
    pub estimated_arrival: DateTime<Utc>,
}

/// Drone status summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneReport {
    pub status: DroneStatus,
    pub active_missions: usize,
    pub total_missions: usize,
    pub recent_missions: Vec<Mission>,
}

/// Controller for drone dispatch and coordination
///
/// Missions complete on their own once the estimated arrival passes; the
/// check runs lazily whenever the controller is consulted, so no timer
/// task is needed.
#[derive(Debug)]
pub struct DroneController {
    missions: HashMap<Uuid, Mission>,
    status: DroneStatus,
    /// Dispatch order, newest last, for the recent-missions view
    order: Vec<Uuid>,
    flight_minutes: i64,
}

impl Default for DroneController {
    fn default() -> Self {
        Self::new()
    }
}

impl DroneController {
    /// Create a new controller with an available drone
    pub fn new() -> Self {
        Self::with_flight_minutes(ESTIMATED_FLIGHT_MINUTES)
    }

    /// Create a controller with a custom flight-time estimate
    pub fn with_flight_minutes(flight_minutes: i64) -> Self {
        Self {
            missions: HashMap::new(),
            status: DroneStatus::Available,
            order: Vec::new(),
            flight_minutes,
        }
    }

    /// Dispatch the drone to the given coordinates
    pub fn dispatch(
        &mut self,
        latitude: f64,
        longitude: f64,
        mission_type: &str,
    ) -> Result<DispatchReport, ControlError> {
        self.complete_due_missions();

        if self.status != DroneStatus::Available {
            return Err(ControlError::DroneUnavailable(
                self.status.as_str().to_string(),
            ));
        }

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ControlError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        let now = Utc::now();
        let mission = Mission {
            id: Uuid::new_v4(),
            mission_type: mission_type.to_string(),
            latitude,
            longitude,
            status: MissionStatus::Dispatched,
            dispatch_time: now,
            estimated_arrival: now + Duration::minutes(self.flight_minutes),
            completion_time: None,
        };

        let report = DispatchReport {
            mission_id: mission.id,
            message: format!("Drone dispatched for {mission_type}"),
            latitude,
            longitude,
            estimated_arrival: mission.estimated_arrival,
        };

        info!(
            mission_id = %mission.id,
            latitude,
            longitude,
            mission_type,
            "Drone dispatched"
        );

        self.order.push(mission.id);
        self.missions.insert(mission.id, mission);
        self.status = DroneStatus::Dispatched;

        Ok(report)
    }

    /// Mark a mission completed, returning the drone to the pool
    pub fn complete_mission(&mut self, mission_id: Uuid) -> Result<(), ControlError> {
        let mission = self
            .missions
            .get_mut(&mission_id)
            .ok_or_else(|| ControlError::MissionNotFound(mission_id.to_string()))?;

        mission.status = MissionStatus::Completed;
        mission.completion_time = Some(Utc::now());
        self.status = DroneStatus::Available;

        info!(mission_id = %mission_id, "Mission completed");
        Ok(())
    }

    /// Look up one mission
    pub fn mission(&mut self, mission_id: Uuid) -> Result<&Mission, ControlError> {
        self.complete_due_missions();
        self.missions
            .get(&mission_id)
            .ok_or_else(|| ControlError::MissionNotFound(mission_id.to_string()))
    }

    /// Get the drone status summary
    pub fn report(&mut self) -> DroneReport {
        self.complete_due_missions();
        let active = self
            .missions
            .values()
            .filter(|m| m.status == MissionStatus::Dispatched)
            .count();
        let recent = self
            .order
            .iter()
            .rev()
            .take(5)
            .rev()
            .filter_map(|id| self.missions.get(id).cloned())
            .collect();

        DroneReport {
            status: self.status,
            active_missions: active,
            total_missions: self.missions.len(),
            recent_missions: recent,
        }
    }

    /// Complete every dispatched mission whose estimated arrival has passed
    fn complete_due_missions(&mut self) {
        let now = Utc::now();
        for mission in self.missions.values_mut() {
            if mission.status == MissionStatus::Dispatched && mission.estimated_arrival <= now {
                mission.status = MissionStatus::Completed;
                mission.completion_time = Some(now);
                info!(mission_id = %mission.id, "Mission completed");
            }
        }
        if self.status == DroneStatus::Dispatched
            && self
                .missions
                .values()
                .all(|m| m.status != MissionStatus::Dispatched)
        {
            self.status = DroneStatus::Available;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_and_complete() {
        let mut controller = DroneController::new();
        let report = controller.dispatch(40.7128, -74.0060, "delivery").unwrap();
        assert_eq!(controller.report().status, DroneStatus::Dispatched);
        assert_eq!(controller.report().active_missions, 1);

        controller.complete_mission(report.mission_id).unwrap();
        assert_eq!(controller.report().status, DroneStatus::Available);
        assert_eq!(controller.report().active_missions, 0);

        let mission = controller.mission(report.mission_id).unwrap();
        assert_eq!(mission.status, MissionStatus::Completed);
        assert!(mission.completion_time.is_some());
    }

    #[test]
    fn test_busy_drone_rejects_dispatch() {
        let mut controller = DroneController::new();
        controller.dispatch(0.0, 0.0, "delivery").unwrap();
        let err = controller.dispatch(1.0, 1.0, "delivery").unwrap_err();
        assert!(matches!(err, ControlError::DroneUnavailable(_)));
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let mut controller = DroneController::new();
        assert!(matches!(
            controller.dispatch(91.0, 0.0, "delivery"),
            Err(ControlError::InvalidCoordinates { .. })
        ));
        assert!(matches!(
            controller.dispatch(0.0, -181.0, "delivery"),
            Err(ControlError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_unknown_mission() {
        let mut controller = DroneController::new();
        assert!(matches!(
            controller.mission(Uuid::new_v4()),
            Err(ControlError::MissionNotFound(_))
        ));
    }

    #[test]
    fn test_missions_complete_after_eta() {
        // Zero flight time: the ETA has passed by the next call
        let mut controller = DroneController::with_flight_minutes(0);
        let first = controller.dispatch(40.7, -74.0, "delivery").unwrap();

        // The drone frees up on its own, so a second dispatch succeeds
        controller.dispatch(41.0, -73.5, "sampling").unwrap();

        let done = controller.mission(first.mission_id).unwrap();
        assert_eq!(done.status, MissionStatus::Completed);
        assert!(done.completion_time.is_some());

        let report = controller.report();
        assert_eq!(report.status, DroneStatus::Available);
        assert_eq!(report.active_missions, 0);
        assert_eq!(report.total_missions, 2);
    }

    #[test]
    fn test_pending_mission_stays_dispatched() {
        let mut controller = DroneController::new();
        let dispatched = controller.dispatch(40.7, -74.0, "delivery").unwrap();

        // ETA is 15 minutes out, nothing should complete yet
        let report = controller.report();
        assert_eq!(report.status, DroneStatus::Dispatched);
        let mission = controller.mission(dispatched.mission_id).unwrap();
        assert_eq!(mission.status, MissionStatus::Dispatched);
    }
}
