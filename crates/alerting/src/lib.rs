//! Alerting System
//!
//! Provides alert records, deduplication via cooldown, hourly throttling and
//! severity mapping for water-quality alerts.

mod alert;
mod manager;

pub use alert::{Alert, Severity};
pub use manager::{AlertConfig, AlertManager, AlertState};
