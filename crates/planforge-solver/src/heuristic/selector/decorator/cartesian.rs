//! Cartesian product move selector.

use std::fmt::{self, Debug};

use rand::RngCore;

use planforge_core::PlanningSolution;

use crate::heuristic::selector::{forward_lifecycle, MoveSelector, SelectionOrder};
use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};
use crate::heuristic::r#move::{CandidateMove, CompositeMove};
use crate::heuristic::variable::PlanningValue;

/// Combines one move from each child into a [`CompositeMove`].
///
/// Ending mode walks the full product like nested loops, the last child
/// varying fastest. Random mode draws one move from every child per
/// request and ends as soon as any child does.
pub struct CartesianMoveSelector<S, V> {
    children: Vec<MoveSelector<S, V>>,
    random: bool,
    current: Vec<CandidateMove<S, V>>,
    done: bool,
}

impl<S: PlanningSolution, V: PlanningValue> CartesianMoveSelector<S, V> {
    /// `Inherit` resolves to `Random`.
    pub fn new(children: Vec<MoveSelector<S, V>>, order: SelectionOrder) -> Self {
        Self {
            children,
            random: order.resolve(SelectionOrder::Inherit).is_random(),
            current: Vec::new(),
            done: false,
        }
    }

    pub fn children(&self) -> &[MoveSelector<S, V>] {
        &self.children
    }

    pub fn next(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        if self.children.is_empty() || self.done {
            return None;
        }
        if self.random {
            let mut parts = Vec::with_capacity(self.children.len());
            for child in &mut self.children {
                parts.push(child.next(solution, random)?);
            }
            return Some(CompositeMove::new(parts).into());
        }

        if self.current.is_empty() {
            for child in &mut self.children {
                match child.next(solution, random) {
                    Some(m) => self.current.push(m),
                    None => {
                        self.done = true;
                        self.current.clear();
                        return None;
                    }
                }
            }
            return Some(CompositeMove::new(self.current.clone()).into());
        }

        // Advance the odometer from the last position.
        let mut position = self.children.len() - 1;
        loop {
            if let Some(m) = self.children[position].next(solution, random) {
                self.current[position] = m;
                for inner in position + 1..self.children.len() {
                    self.children[inner].reset();
                    match self.children[inner].next(solution, random) {
                        Some(m) => self.current[inner] = m,
                        None => {
                            self.done = true;
                            return None;
                        }
                    }
                }
                return Some(CompositeMove::new(self.current.clone()).into());
            }
            if position == 0 {
                self.done = true;
                return None;
            }
            position -= 1;
        }
    }

    pub fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.current.clear();
        self.done = false;
    }

    /// Product of the children's sizes, if all are countable.
    pub fn size(&self, solution: &S) -> Option<usize> {
        if self.children.is_empty() {
            return Some(0);
        }
        self.children
            .iter()
            .try_fold(1usize, |acc, c| c.size(solution).map(|n| acc.saturating_mul(n)))
    }

    /// Random mode ends with its first ending child; ordered mode never
    /// gets past a never-ending child.
    pub fn is_never_ending(&self) -> bool {
        if self.children.is_empty() {
            false
        } else if self.random {
            self.children.iter().all(|c| c.is_never_ending())
        } else {
            self.children.iter().any(|c| c.is_never_ending())
        }
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        forward_lifecycle(&mut self.children, event, context);
        if matches!(event, LifecycleEvent::PhaseStarted | LifecycleEvent::StepStarted) {
            self.current.clear();
            self.done = false;
        }
    }

    pub(crate) fn collect_trackers<'a>(&'a self, out: &mut Vec<&'a LifecycleTracker>) {
        for child in &self.children {
            child.collect_trackers(out);
        }
    }
}

impl<S, V: Clone> Clone for CartesianMoveSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            random: self.random,
            current: self.current.clone(),
            done: self.done,
        }
    }
}

impl<S, V: Debug> Debug for CartesianMoveSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartesianMoveSelector")
            .field("children", &self.children)
            .field("random", &self.random)
            .finish()
    }
}
