//! Host for the placement engine: configuration, boundary-to-grid
//! generation, intent resolution, the editing session and its observers.

pub mod boundary;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod event_bus;
pub mod intent;
pub mod persistence;
pub mod session;
