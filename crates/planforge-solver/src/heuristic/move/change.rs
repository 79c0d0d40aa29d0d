//! ChangeMove: assigns a value to one planning variable of one entity.

use std::fmt::{self, Debug};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::Move;
use crate::heuristic::variable::{PlanningValue, PlanningVariable};

pub struct ChangeMove<S, V> {
    variable: PlanningVariable<S, V>,
    entity_index: usize,
    to_value: Option<V>,
}

impl<S, V> ChangeMove<S, V> {
    pub fn new(variable: PlanningVariable<S, V>, entity_index: usize, to_value: Option<V>) -> Self {
        Self {
            variable,
            entity_index,
            to_value,
        }
    }

    pub fn variable(&self) -> &PlanningVariable<S, V> {
        &self.variable
    }

    pub fn entity_index(&self) -> usize {
        self.entity_index
    }

    pub fn to_value(&self) -> Option<&V> {
        self.to_value.as_ref()
    }
}

impl<S, V: Clone> Clone for ChangeMove<S, V> {
    fn clone(&self) -> Self {
        Self {
            variable: self.variable,
            entity_index: self.entity_index,
            to_value: self.to_value.clone(),
        }
    }
}

impl<S, V: Debug> Debug for ChangeMove<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] -> {:?}",
            self.variable.name(),
            self.entity_index,
            self.to_value
        )
    }
}

impl<S, V> Move<S> for ChangeMove<S, V>
where
    S: PlanningSolution,
    V: PlanningValue,
{
    fn is_doable<D: ScoreDirector<S>>(&self, score_director: &D) -> bool {
        let solution = score_director.working_solution();
        let descriptor = self.variable.descriptor_index();
        self.entity_index < solution.entity_count(descriptor)
            && !solution.is_pinned(descriptor, self.entity_index)
            && self.variable.get(solution, self.entity_index) != self.to_value
    }

    fn do_move<D: ScoreDirector<S>>(&self, score_director: &mut D) {
        self.variable
            .assign(score_director, self.entity_index, self.to_value.clone());
    }

    fn create_undo_move<D: ScoreDirector<S>>(&self, score_director: &D) -> Self {
        let current = self
            .variable
            .get(score_director.working_solution(), self.entity_index);
        ChangeMove::new(self.variable, self.entity_index, current)
    }
}
