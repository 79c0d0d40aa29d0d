//! Entity selector: enumerates the movable entities of one class.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use planforge_core::PlanningSolution;

use super::SelectionOrder;
use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};

/// Yields indices of unpinned entities in the configured order.
///
/// `Original` and `Shuffled` end after each entity was yielded once;
/// `Random` never ends.
#[derive(Debug, Clone)]
pub struct EntitySelector {
    descriptor_index: usize,
    order: SelectionOrder,
    candidates: Vec<usize>,
    cursor: usize,
    stale: bool,
    tracker: LifecycleTracker,
}

impl EntitySelector {
    /// `Inherit` resolves to `Random`.
    pub fn new(descriptor_index: usize, order: SelectionOrder) -> Self {
        Self {
            descriptor_index,
            order: order.resolve(SelectionOrder::Inherit),
            candidates: Vec::new(),
            cursor: 0,
            stale: true,
            tracker: LifecycleTracker::new(),
        }
    }

    pub fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    pub fn order(&self) -> SelectionOrder {
        self.order
    }

    /// Unpinned entity indices in original order.
    pub fn movable<S: PlanningSolution>(&self, solution: &S) -> Vec<usize> {
        (0..solution.entity_count(self.descriptor_index))
            .filter(|&i| !solution.is_pinned(self.descriptor_index, i))
            .collect()
    }

    fn refresh<S: PlanningSolution>(&mut self, solution: &S, random: &mut dyn RngCore) {
        self.candidates = self.movable(solution);
        if self.order == SelectionOrder::Shuffled {
            self.candidates.shuffle(random);
        }
        self.cursor = 0;
        self.stale = false;
    }

    pub fn next<S: PlanningSolution>(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<usize> {
        if self.stale {
            self.refresh(solution, random);
        }
        if self.order.is_random() {
            if self.candidates.is_empty() {
                return None;
            }
            let pick = random.random_range(0..self.candidates.len());
            return Some(self.candidates[pick]);
        }
        let entity = self.candidates.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(entity)
    }

    /// Restarts iteration; the candidate list is rebuilt on the next draw.
    pub fn reset(&mut self) {
        self.stale = true;
    }

    pub fn size<S: PlanningSolution>(&self, solution: &S) -> usize {
        self.movable(solution).len()
    }

    pub fn is_never_ending(&self) -> bool {
        self.order.is_random()
    }

    pub fn on_lifecycle<S: PlanningSolution>(
        &mut self,
        event: LifecycleEvent,
        _context: &mut LifecycleContext<'_, S>,
    ) {
        self.tracker.record(event);
        if matches!(event, LifecycleEvent::PhaseStarted | LifecycleEvent::StepStarted) {
            self.reset();
        }
    }

    pub fn tracker(&self) -> &LifecycleTracker {
        &self.tracker
    }
}
