//! Route Handlers

pub mod alerts;
pub mod analysis;
pub mod control;
pub mod sensors;
pub mod weather;
