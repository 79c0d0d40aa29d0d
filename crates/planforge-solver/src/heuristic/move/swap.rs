//! SwapMove: exchanges one variable's values between two entities.

use std::fmt::{self, Debug};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::Move;
use crate::heuristic::variable::{PlanningValue, PlanningVariable};

pub struct SwapMove<S, V> {
    variable: PlanningVariable<S, V>,
    left: usize,
    right: usize,
}

impl<S, V> SwapMove<S, V> {
    pub fn new(variable: PlanningVariable<S, V>, left: usize, right: usize) -> Self {
        Self {
            variable,
            left,
            right,
        }
    }

    pub fn variable(&self) -> &PlanningVariable<S, V> {
        &self.variable
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn right(&self) -> usize {
        self.right
    }
}

impl<S, V> Clone for SwapMove<S, V> {
    fn clone(&self) -> Self {
        Self {
            variable: self.variable,
            left: self.left,
            right: self.right,
        }
    }
}

impl<S, V> Debug for SwapMove<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] <-> {}[{}]",
            self.variable.name(),
            self.left,
            self.variable.name(),
            self.right
        )
    }
}

impl<S, V> Move<S> for SwapMove<S, V>
where
    S: PlanningSolution,
    V: PlanningValue,
{
    fn is_doable<D: ScoreDirector<S>>(&self, score_director: &D) -> bool {
        let solution = score_director.working_solution();
        let descriptor = self.variable.descriptor_index();
        let count = solution.entity_count(descriptor);
        self.left != self.right
            && self.left < count
            && self.right < count
            && !solution.is_pinned(descriptor, self.left)
            && !solution.is_pinned(descriptor, self.right)
            && self.variable.get(solution, self.left) != self.variable.get(solution, self.right)
    }

    fn do_move<D: ScoreDirector<S>>(&self, score_director: &mut D) {
        let solution = score_director.working_solution();
        let left_value = self.variable.get(solution, self.left);
        let right_value = self.variable.get(solution, self.right);
        self.variable.assign(score_director, self.left, right_value);
        self.variable.assign(score_director, self.right, left_value);
    }

    /// A swap is its own inverse.
    fn create_undo_move<D: ScoreDirector<S>>(&self, _score_director: &D) -> Self {
        self.clone()
    }
}
