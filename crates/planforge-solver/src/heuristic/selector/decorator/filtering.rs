//! Filtering decorator.

use std::fmt::{self, Debug};
use std::sync::Arc;

use rand::RngCore;

use planforge_core::PlanningSolution;

use crate::heuristic::selector::MoveSelector;
use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};
use crate::heuristic::r#move::CandidateMove;
use crate::heuristic::variable::PlanningValue;

/// Predicate deciding whether a candidate reaches the phase.
pub type MoveFilter<S, V> = Arc<dyn Fn(&S, &CandidateMove<S, V>) -> bool + Send + Sync>;

/// Rejected draws tolerated from a never-ending child before giving up.
const BAIL_OUT_ATTEMPTS: usize = 10_000;

/// Passes through only the child's moves that satisfy a filter.
pub struct FilteringMoveSelector<S, V> {
    child: Box<MoveSelector<S, V>>,
    filter: MoveFilter<S, V>,
}

impl<S: PlanningSolution, V: PlanningValue> FilteringMoveSelector<S, V> {
    pub fn new<F>(child: MoveSelector<S, V>, filter: F) -> Self
    where
        F: Fn(&S, &CandidateMove<S, V>) -> bool + Send + Sync + 'static,
    {
        Self {
            child: Box::new(child),
            filter: Arc::new(filter),
        }
    }

    pub fn next(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        let never_ending = self.child.is_never_ending();
        let mut attempts = 0;
        loop {
            let m = self.child.next(solution, random)?;
            if (self.filter)(solution, &m) {
                return Some(m);
            }
            attempts += 1;
            if never_ending && attempts >= BAIL_OUT_ATTEMPTS {
                return None;
            }
        }
    }

    pub fn reset(&mut self) {
        self.child.reset();
    }

    /// Upper bound: the child's size.
    pub fn size(&self, solution: &S) -> Option<usize> {
        self.child.size(solution)
    }

    pub fn is_never_ending(&self) -> bool {
        self.child.is_never_ending()
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        self.child.on_lifecycle(event, context);
    }

    pub(crate) fn collect_trackers<'a>(&'a self, out: &mut Vec<&'a LifecycleTracker>) {
        self.child.collect_trackers(out);
    }
}

impl<S, V: Clone> Clone for FilteringMoveSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            child: self.child.clone(),
            filter: Arc::clone(&self.filter),
        }
    }
}

impl<S, V: Debug> Debug for FilteringMoveSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteringMoveSelector")
            .field("child", &self.child)
            .finish()
    }
}
