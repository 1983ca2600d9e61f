//! Domain types shared by the MBTA dashboard crates.
//!
//! Everything here is plain data plus pure functions: the notebook job
//! model tracked per job name, the notebook catalogue, and the shared
//! error type. No I/O lives in this crate.

pub mod error;
pub mod job;
pub mod notebook;
pub mod types;

pub use error::CoreError;
pub use job::{JobId, JobMessage, JobName, JobState, JobStatus, JobUpdate};
