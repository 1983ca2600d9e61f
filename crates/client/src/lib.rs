//! HTTP client for the MBTA delay backend.
//!
//! Wraps the notebook job endpoints (`/api/run_notebook`,
//! `/api/notebook_status`) and the read-only trip data endpoints behind a
//! typed [`DashboardApi`]. The job orchestration layer talks to the
//! backend through the [`NotebookBackend`] trait so it can be driven by an
//! in-memory fake in tests.

pub mod api;
pub mod backend;
pub mod error;
pub mod models;

pub use api::DashboardApi;
pub use backend::NotebookBackend;
pub use error::ClientError;
pub use models::{StatusReport, SubmitReply, Trip, TripDetails, TripQuery};
