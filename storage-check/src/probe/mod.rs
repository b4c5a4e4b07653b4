//! Storage probe lifecycle.
//!
//! - [`Reconciler`] sweeps probe-owned resources left over from earlier runs.
//! - [`CheckOrchestrator`] runs a single provision → observe → reclaim cycle.
//! - [`CycleDriver`] runs both, in that order, once per interval.

mod driver;
mod model;
mod orchestrator;
mod reconciler;

pub use driver::CycleDriver;
pub use model::{CleanupTally, CycleOutcome, CyclePhase, ProbeResource};
pub use orchestrator::{CheckOrchestrator, PollPolicy, ProbeSettings};
pub use reconciler::Reconciler;
