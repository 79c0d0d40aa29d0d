//! Late acceptance acceptor.

use std::fmt::Debug;

use planforge_core::PlanningSolution;

use super::Acceptor;
use crate::event::{LifecycleContext, LifecycleEvent};

/// Late acceptance acceptor - accepts moves that improve on a historical score.
///
/// Maintains a circular buffer of recent step scores and accepts moves that
/// are no worse than the last step or than the score from N steps ago.
///
/// # Example
///
/// ```
/// use planforge_solver::phase::localsearch::LateAcceptanceAcceptor;
/// use planforge_core::{PlanningSolution, SimpleScore};
///
/// #[derive(Clone, Debug)]
/// struct MySolution;
/// impl PlanningSolution for MySolution {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { None }
///     fn set_score(&mut self, _: Option<Self::Score>) {}
///     fn entity_count(&self, _: usize) -> usize { 0 }
/// }
///
/// let acceptor = LateAcceptanceAcceptor::<MySolution>::new(400);
/// ```
pub struct LateAcceptanceAcceptor<S: PlanningSolution> {
    late_acceptance_size: usize,
    score_history: Vec<Option<S::Score>>,
    current_index: usize,
}

impl<S: PlanningSolution> Debug for LateAcceptanceAcceptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LateAcceptanceAcceptor")
            .field("late_acceptance_size", &self.late_acceptance_size)
            .field("current_index", &self.current_index)
            .finish()
    }
}

impl<S: PlanningSolution> Clone for LateAcceptanceAcceptor<S> {
    fn clone(&self) -> Self {
        Self {
            late_acceptance_size: self.late_acceptance_size,
            score_history: self.score_history.clone(),
            current_index: self.current_index,
        }
    }
}

impl<S: PlanningSolution> LateAcceptanceAcceptor<S> {
    /// A size of zero is treated as one.
    pub fn new(late_acceptance_size: usize) -> Self {
        let late_acceptance_size = late_acceptance_size.max(1);
        Self {
            late_acceptance_size,
            score_history: vec![None; late_acceptance_size],
            current_index: 0,
        }
    }

    pub fn late_acceptance_size(&self) -> usize {
        self.late_acceptance_size
    }
}

impl<S: PlanningSolution> Default for LateAcceptanceAcceptor<S> {
    fn default() -> Self {
        Self::new(400)
    }
}

impl<S: PlanningSolution> Acceptor<S> for LateAcceptanceAcceptor<S> {
    fn is_accepted(&mut self, last_step_score: &S::Score, move_score: &S::Score) -> bool {
        if move_score >= last_step_score {
            return true;
        }
        match &self.score_history[self.current_index] {
            Some(late_score) => move_score >= late_score,
            None => true,
        }
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent, context: &LifecycleContext<'_, S>) {
        match event {
            LifecycleEvent::PhaseStarted => {
                for slot in &mut self.score_history {
                    *slot = context.step_score;
                }
                self.current_index = 0;
            }
            LifecycleEvent::StepEnded => {
                if let Some(score) = context.step_score {
                    self.score_history[self.current_index] = Some(score);
                    self.current_index = (self.current_index + 1) % self.late_acceptance_size;
                }
            }
            _ => {}
        }
    }
}
