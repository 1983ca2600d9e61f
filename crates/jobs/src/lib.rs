//! Notebook job orchestration for the dashboard.
//!
//! The backend offers fire-and-forget submission plus a status query, so
//! every run is driven from here:
//!
//! - [`JobRegistry`]: one [`JobState`](mbta_core::JobState) per job name,
//!   with change notifications scoped to the affected name.
//! - [`Launcher`]: guarded one-shot submission that seeds a run.
//! - [`PollScheduler`]: at most one cancellable poll timer per job name.
//! - [`StatusReducer`]: turns each poll result into a state transition.
//! - [`LifecycleGuard`]: stops every timer exactly once at teardown.
//! - [`JobSession`]: wires the above together for one dashboard view.

pub mod guard;
pub mod launcher;
pub mod reducer;
pub mod registry;
pub mod scheduler;
pub mod session;

pub use guard::LifecycleGuard;
pub use launcher::{Launcher, SubmitOutcome};
pub use reducer::{PollDirective, PollFailure, StatusReducer};
pub use registry::{JobChange, JobRegistry};
pub use scheduler::{Generation, PollScheduler};
pub use session::{JobSession, SessionConfig};
