//! Core move trait.

use std::fmt::Debug;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

/// A reversible change to the working solution.
///
/// Every write goes through the director's before/after notifications so an
/// incremental score stays consistent.
pub trait Move<S: PlanningSolution>: Send + Sync + Debug {
    /// False when doing the move would be illegal or a no-op.
    fn is_doable<D: ScoreDirector<S>>(&self, score_director: &D) -> bool;

    fn do_move<D: ScoreDirector<S>>(&self, score_director: &mut D);

    /// The move that restores the current state once this one is done.
    ///
    /// Must be called before [`Move::do_move`].
    fn create_undo_move<D: ScoreDirector<S>>(&self, score_director: &D) -> Self
    where
        Self: Sized;
}
