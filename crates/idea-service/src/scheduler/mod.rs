//! Deadline handling
//!
//! The [`DeadlineScheduler`] closes ideas as their deadlines pass while the
//! process runs; [`sweep`] catches up on deadlines missed while it did not.
//! Both hand the actual closing to an [`IdeaCloser`].

mod closer;
mod deadline;
mod sweep;
mod window;

pub use closer::IdeaCloser;
pub use deadline::{DeadlineScheduler, SchedulerConfig};
pub use sweep::{sweep, SweepConfig};
pub use window::{DeadlineKey, DeadlineWindow};
