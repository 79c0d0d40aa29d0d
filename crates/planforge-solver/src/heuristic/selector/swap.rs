//! Swap move selector: pairs of entities of one class.

use std::fmt::{self, Debug};

use rand::seq::SliceRandom;
use rand::RngCore;

use planforge_core::PlanningSolution;

use super::{EntitySelector, SelectionOrder};
use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};
use crate::heuristic::r#move::{CandidateMove, SwapMove};
use crate::heuristic::variable::{PlanningValue, PlanningVariable};

/// Yields a [`SwapMove`] for every unordered pair of movable entities.
///
/// `Random` draws both sides independently and never ends.
pub struct SwapMoveSelector<S, V> {
    variable: PlanningVariable<S, V>,
    entity_selector: EntitySelector,
    order: SelectionOrder,
    entities: Vec<usize>,
    left: usize,
    right: usize,
    stale: bool,
}

impl<S: PlanningSolution, V: PlanningValue> SwapMoveSelector<S, V> {
    pub fn new(variable: PlanningVariable<S, V>, order: SelectionOrder) -> Self {
        let order = order.resolve(SelectionOrder::Inherit);
        Self {
            variable,
            entity_selector: EntitySelector::new(variable.descriptor_index(), order),
            order,
            entities: Vec::new(),
            left: 0,
            right: 1,
            stale: true,
        }
    }

    pub fn order(&self) -> SelectionOrder {
        self.order
    }

    pub fn next(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        if self.order.is_random() {
            let left = self.entity_selector.next(solution, random)?;
            let right = self.entity_selector.next(solution, random)?;
            return Some(SwapMove::new(self.variable, left, right).into());
        }

        if self.stale {
            self.entities = self.entity_selector.movable(solution);
            if self.order == SelectionOrder::Shuffled {
                self.entities.shuffle(random);
            }
            self.left = 0;
            self.right = 1;
            self.stale = false;
        }
        if self.right >= self.entities.len() {
            self.left += 1;
            self.right = self.left + 1;
        }
        if self.right >= self.entities.len() {
            return None;
        }
        let m = SwapMove::new(self.variable, self.entities[self.left], self.entities[self.right]);
        self.right += 1;
        Some(m.into())
    }

    pub fn reset(&mut self) {
        self.entity_selector.reset();
        self.stale = true;
    }

    pub fn size(&self, solution: &S) -> usize {
        let n = self.entity_selector.size(solution);
        n * n.saturating_sub(1) / 2
    }

    pub fn is_never_ending(&self) -> bool {
        self.order.is_random()
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        self.entity_selector.on_lifecycle(event, context);
        if matches!(event, LifecycleEvent::PhaseStarted | LifecycleEvent::StepStarted) {
            self.stale = true;
        }
    }

    pub(crate) fn collect_trackers<'a>(&'a self, out: &mut Vec<&'a LifecycleTracker>) {
        out.push(self.entity_selector.tracker());
    }
}

impl<S, V> Clone for SwapMoveSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            variable: self.variable,
            entity_selector: self.entity_selector.clone(),
            order: self.order,
            entities: self.entities.clone(),
            left: self.left,
            right: self.right,
            stale: self.stale,
        }
    }
}

impl<S, V> Debug for SwapMoveSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapMoveSelector")
            .field("variable", &self.variable)
            .field("order", &self.order)
            .finish()
    }
}
