//! CompositeMove: several moves applied as one.

use std::fmt::{self, Debug};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{CandidateMove, ChangeMove, Move};
use crate::heuristic::variable::{PlanningValue, PlanningVariable};

/// Moves applied in order.
///
/// Parts come from selectors, which never offer pinned entities.
///
/// The undo restores every variable any part touched to the value it held
/// before the composite ran. Restoring absolute values keeps the undo
/// correct even when parts overlap on the same entity.
pub struct CompositeMove<S, V> {
    moves: Vec<CandidateMove<S, V>>,
}

impl<S, V> CompositeMove<S, V> {
    pub fn new(moves: Vec<CandidateMove<S, V>>) -> Self {
        Self { moves }
    }

    pub fn moves(&self) -> &[CandidateMove<S, V>] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl<S, V: Clone> Clone for CompositeMove<S, V> {
    fn clone(&self) -> Self {
        Self {
            moves: self.moves.clone(),
        }
    }
}

impl<S, V: Debug> Debug for CompositeMove<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.moves).finish()
    }
}

impl<S, V> Move<S> for CompositeMove<S, V>
where
    S: PlanningSolution,
    V: PlanningValue,
{
    /// Doable when any part changes something. A part that would keep its
    /// variable as is still runs, as a no-op.
    fn is_doable<D: ScoreDirector<S>>(&self, score_director: &D) -> bool {
        self.moves.iter().any(|m| m.is_doable(score_director))
    }

    fn do_move<D: ScoreDirector<S>>(&self, score_director: &mut D) {
        for m in &self.moves {
            m.do_move(score_director);
        }
    }

    fn create_undo_move<D: ScoreDirector<S>>(&self, score_director: &D) -> Self {
        let mut touched: Vec<(PlanningVariable<S, V>, usize)> = Vec::new();
        for m in &self.moves {
            m.touched(&mut touched);
        }

        let solution = score_director.working_solution();
        let mut restores: Vec<CandidateMove<S, V>> = Vec::with_capacity(touched.len());
        for (i, (variable, entity_index)) in touched.iter().enumerate() {
            let seen = touched[..i]
                .iter()
                .any(|(v, e)| e == entity_index && v.same_as(variable));
            if !seen {
                let value = variable.get(solution, *entity_index);
                restores.push(ChangeMove::new(*variable, *entity_index, value).into());
            }
        }
        CompositeMove::new(restores)
    }
}
