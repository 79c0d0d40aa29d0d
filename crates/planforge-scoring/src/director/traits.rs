//! Score director trait definition.

use planforge_core::{PlanningSolution, Result, SolverError};

/// Owns the working solution and computes its score.
///
/// Every change to a planning variable must be bracketed by
/// [`before_variable_changed`](Self::before_variable_changed) and
/// [`after_variable_changed`](Self::after_variable_changed). Scores read
/// through [`calculate_score`](Self::calculate_score) always reflect every
/// change reported so far.
pub trait ScoreDirector<S: PlanningSolution>: Send {
    fn working_solution(&self) -> &S;

    /// Mutable access for moves, which must report what they change.
    fn working_solution_mut(&mut self) -> &mut S;

    fn clone_working_solution(&self) -> S {
        self.working_solution().clone()
    }

    /// Replaces the working solution and rebuilds all scoring state.
    fn reset_working_solution(&mut self, solution: S);

    /// Settles pending changes and returns the current score.
    fn calculate_score(&mut self) -> S::Score;

    /// Recomputes the score of the working solution from scratch.
    ///
    /// Leaves incremental state untouched. Used for integrity checks.
    fn calculate_full_score(&self) -> S::Score;

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    );

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    );

    /// Called after an entity or fact was appended to the solution.
    fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize);

    /// Called before the last entity or fact of a class is removed.
    fn before_entity_removed(&mut self, descriptor_index: usize, entity_index: usize);

    fn entity_count(&self, descriptor_index: usize) -> usize {
        self.working_solution().entity_count(descriptor_index)
    }

    /// Number of score calculations performed so far.
    fn calculation_count(&self) -> u64;

    fn is_incremental(&self) -> bool {
        false
    }

    /// Compares the current score with a full recalculation.
    ///
    /// Returns the score when both agree and
    /// [`SolverError::ScoreCorruption`] when they do not.
    fn assert_score_integrity(&mut self, context: &str) -> Result<S::Score> {
        let incremental = self.calculate_score();
        let full = self.calculate_full_score();
        if incremental != full {
            return Err(SolverError::ScoreCorruption {
                context: context.to_string(),
                incremental: incremental.to_string(),
                full: full.to_string(),
            });
        }
        Ok(incremental)
    }
}
