//! Termination conditions for solving and for single phases.
//!
//! Terminations are polled only at step boundaries. The solver scope and
//! each phase scope build a [`TerminationContext`] snapshot measured from
//! their own start, so the same condition works at either level.

mod best_score;
mod composite;
mod external;
mod step_count;
mod time;

#[cfg(test)]
mod tests;

use std::fmt::Debug;
use std::time::Duration;

use planforge_core::Score;

pub use best_score::{BestScoreFeasibleTermination, BestScoreTermination};
pub use composite::{AndTermination, OrTermination};
pub use external::ExternalTermination;
pub use step_count::{StepCountTermination, UnimprovedStepCountTermination};
pub use time::TimeTermination;

/// Progress measured from the start of a solver or phase scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationContext<Sc: Score> {
    pub elapsed: Duration,
    pub step_count: u64,
    /// Steps since the best score last improved.
    pub unimproved_step_count: u64,
    pub best_score: Option<Sc>,
}

/// Trait for determining when to stop solving.
pub trait Termination<Sc: Score>: Send + Debug {
    /// Returns true if solving should terminate.
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool;
}
