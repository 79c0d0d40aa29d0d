//! Score-target terminations.

use planforge_core::Score;

use super::{Termination, TerminationContext};

/// Terminates once the best score reaches a target.
#[derive(Debug, Clone)]
pub struct BestScoreTermination<Sc: Score> {
    target: Sc,
}

impl<Sc: Score> BestScoreTermination<Sc> {
    pub fn new(target: Sc) -> Self {
        Self { target }
    }
}

impl<Sc: Score> Termination<Sc> for BestScoreTermination<Sc> {
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool {
        context
            .best_score
            .is_some_and(|best| best.is_not_worse_than(&self.target))
    }
}

/// Terminates once the best solution is feasible.
#[derive(Debug, Clone, Default)]
pub struct BestScoreFeasibleTermination;

impl<Sc: Score> Termination<Sc> for BestScoreFeasibleTermination {
    fn is_terminated(&self, context: &TerminationContext<Sc>) -> bool {
        context.best_score.is_some_and(|best| best.is_feasible())
    }
}
