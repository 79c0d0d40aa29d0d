//! The closed set of moves selectors produce.

use std::fmt::{self, Debug};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{ChangeMove, CompositeMove, Move, SwapMove};
use crate::heuristic::variable::{PlanningValue, PlanningVariable};

/// Any move a selector can yield.
pub enum CandidateMove<S, V> {
    Change(ChangeMove<S, V>),
    Swap(SwapMove<S, V>),
    Composite(CompositeMove<S, V>),
}

impl<S, V> CandidateMove<S, V> {
    /// Appends every (variable, entity) slot this move writes.
    pub(crate) fn touched(&self, out: &mut Vec<(PlanningVariable<S, V>, usize)>) {
        match self {
            CandidateMove::Change(m) => out.push((*m.variable(), m.entity_index())),
            CandidateMove::Swap(m) => {
                out.push((*m.variable(), m.left()));
                out.push((*m.variable(), m.right()));
            }
            CandidateMove::Composite(m) => {
                for part in m.moves() {
                    part.touched(out);
                }
            }
        }
    }
}

impl<S, V: Clone> Clone for CandidateMove<S, V> {
    fn clone(&self) -> Self {
        match self {
            CandidateMove::Change(m) => CandidateMove::Change(m.clone()),
            CandidateMove::Swap(m) => CandidateMove::Swap(m.clone()),
            CandidateMove::Composite(m) => CandidateMove::Composite(m.clone()),
        }
    }
}

impl<S, V: Debug> Debug for CandidateMove<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateMove::Change(m) => m.fmt(f),
            CandidateMove::Swap(m) => m.fmt(f),
            CandidateMove::Composite(m) => m.fmt(f),
        }
    }
}

impl<S, V> Move<S> for CandidateMove<S, V>
where
    S: PlanningSolution,
    V: PlanningValue,
{
    fn is_doable<D: ScoreDirector<S>>(&self, score_director: &D) -> bool {
        match self {
            CandidateMove::Change(m) => m.is_doable(score_director),
            CandidateMove::Swap(m) => m.is_doable(score_director),
            CandidateMove::Composite(m) => m.is_doable(score_director),
        }
    }

    fn do_move<D: ScoreDirector<S>>(&self, score_director: &mut D) {
        match self {
            CandidateMove::Change(m) => m.do_move(score_director),
            CandidateMove::Swap(m) => m.do_move(score_director),
            CandidateMove::Composite(m) => m.do_move(score_director),
        }
    }

    fn create_undo_move<D: ScoreDirector<S>>(&self, score_director: &D) -> Self {
        match self {
            CandidateMove::Change(m) => m.create_undo_move(score_director).into(),
            CandidateMove::Swap(m) => m.create_undo_move(score_director).into(),
            CandidateMove::Composite(m) => m.create_undo_move(score_director).into(),
        }
    }
}

impl<S, V> From<ChangeMove<S, V>> for CandidateMove<S, V> {
    fn from(m: ChangeMove<S, V>) -> Self {
        CandidateMove::Change(m)
    }
}

impl<S, V> From<SwapMove<S, V>> for CandidateMove<S, V> {
    fn from(m: SwapMove<S, V>) -> Self {
        CandidateMove::Swap(m)
    }
}

impl<S, V> From<CompositeMove<S, V>> for CandidateMove<S, V> {
    fn from(m: CompositeMove<S, V>) -> Self {
        CandidateMove::Composite(m)
    }
}
