//! Step count terminations.

use planforge_core::Score;

use super::{Termination, TerminationContext};

/// Terminates after a step count.
///
/// # Example
///
/// ```
/// use planforge_solver::termination::StepCountTermination;
///
/// // Terminate after 1000 steps
/// let term = StepCountTermination::new(1000);
/// ```
#[derive(Debug, Clone)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<Sc: Score> Termination<Sc> for StepCountTermination {
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool {
        context.step_count >= self.limit
    }
}

/// Terminates after a number of steps without a new best score.
#[derive(Debug, Clone)]
pub struct UnimprovedStepCountTermination {
    limit: u64,
}

impl UnimprovedStepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<Sc: Score> Termination<Sc> for UnimprovedStepCountTermination {
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool {
        context.unimproved_step_count >= self.limit
    }
}
