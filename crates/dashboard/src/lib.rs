//! Headless MBTA delay dashboard.
//!
//! Loads the city and trip data from the backend, summarises it, and
//! drives the notebook panel's job runs through [`mbta_jobs::JobSession`].

pub mod app;
pub mod cities;
pub mod config;
pub mod panel;
pub mod trips;

pub use app::{run, DashboardError, DashboardReport};
pub use config::DashboardConfig;
