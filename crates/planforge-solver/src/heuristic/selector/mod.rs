//! Selectors: lazy, resumable producers of candidates.
//!
//! Leaf selectors enumerate entities and values; move selectors combine
//! them into moves. Composites ([`UnionMoveSelector`],
//! [`CartesianMoveSelector`], [`FilteringMoveSelector`]) hold their children
//! by value and forward every lifecycle event to them, start events in
//! child order and end events in reverse.
//!
//! A selector in `Original` or `Shuffled` order is *ending*: `next` returns
//! `None` once exhausted and the selector restarts at the next step. A
//! `Random` selector is *never-ending* and the phase bounds it instead.

pub mod decorator;

mod change;
mod entity;
mod swap;
mod value;


use std::fmt::{self, Debug};

use rand::RngCore;

use planforge_core::PlanningSolution;

pub use change::ChangeMoveSelector;
pub use decorator::{
    CartesianMoveSelector, FilteringMoveSelector, MoveFilter, UnionMoveSelector, UnionWeights,
};
pub use entity::EntitySelector;
pub use planforge_config::SelectionOrder;
pub use swap::SwapMoveSelector;
pub use value::ValueSelector;

use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};
use crate::heuristic::r#move::CandidateMove;
use crate::heuristic::variable::PlanningValue;

/// Any move selector.
pub enum MoveSelector<S, V> {
    Change(ChangeMoveSelector<S, V>),
    Swap(SwapMoveSelector<S, V>),
    Union(UnionMoveSelector<S, V>),
    Cartesian(CartesianMoveSelector<S, V>),
    Filtering(FilteringMoveSelector<S, V>),
}

impl<S: PlanningSolution, V: PlanningValue> MoveSelector<S, V> {
    /// The next candidate, or `None` when an ending selector is exhausted.
    pub fn next(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        match self {
            MoveSelector::Change(s) => s.next(solution, random),
            MoveSelector::Swap(s) => s.next(solution, random),
            MoveSelector::Union(s) => s.next(solution, random),
            MoveSelector::Cartesian(s) => s.next(solution, random),
            MoveSelector::Filtering(s) => s.next(solution, random),
        }
    }

    /// Restarts iteration from the beginning.
    pub fn reset(&mut self) {
        match self {
            MoveSelector::Change(s) => s.reset(),
            MoveSelector::Swap(s) => s.reset(),
            MoveSelector::Union(s) => s.reset(),
            MoveSelector::Cartesian(s) => s.reset(),
            MoveSelector::Filtering(s) => s.reset(),
        }
    }

    /// Number of distinct candidates, when countable.
    pub fn size(&self, solution: &S) -> Option<usize> {
        match self {
            MoveSelector::Change(s) => Some(s.size(solution)),
            MoveSelector::Swap(s) => Some(s.size(solution)),
            MoveSelector::Union(s) => s.size(solution),
            MoveSelector::Cartesian(s) => s.size(solution),
            MoveSelector::Filtering(s) => s.size(solution),
        }
    }

    pub fn is_countable(&self, solution: &S) -> bool {
        self.size(solution).is_some()
    }

    pub fn is_never_ending(&self) -> bool {
        match self {
            MoveSelector::Change(s) => s.is_never_ending(),
            MoveSelector::Swap(s) => s.is_never_ending(),
            MoveSelector::Union(s) => s.is_never_ending(),
            MoveSelector::Cartesian(s) => s.is_never_ending(),
            MoveSelector::Filtering(s) => s.is_never_ending(),
        }
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        match self {
            MoveSelector::Change(s) => s.on_lifecycle(event, context),
            MoveSelector::Swap(s) => s.on_lifecycle(event, context),
            MoveSelector::Union(s) => s.on_lifecycle(event, context),
            MoveSelector::Cartesian(s) => s.on_lifecycle(event, context),
            MoveSelector::Filtering(s) => s.on_lifecycle(event, context),
        }
    }

    /// Lifecycle trackers of every leaf, in tree order.
    pub fn trackers(&self) -> Vec<&LifecycleTracker> {
        let mut out = Vec::new();
        self.collect_trackers(&mut out);
        out
    }

    pub(crate) fn collect_trackers<'a>(&'a self, out: &mut Vec<&'a LifecycleTracker>) {
        match self {
            MoveSelector::Change(s) => s.collect_trackers(out),
            MoveSelector::Swap(s) => s.collect_trackers(out),
            MoveSelector::Union(s) => s.collect_trackers(out),
            MoveSelector::Cartesian(s) => s.collect_trackers(out),
            MoveSelector::Filtering(s) => s.collect_trackers(out),
        }
    }
}

/// Start events go to children in order, end events in reverse.
pub(crate) fn forward_lifecycle<S: PlanningSolution, V: PlanningValue>(
    children: &mut [MoveSelector<S, V>],
    event: LifecycleEvent,
    context: &mut LifecycleContext<'_, S>,
) {
    if event.is_start() {
        for child in children.iter_mut() {
            child.on_lifecycle(event, context);
        }
    } else {
        for child in children.iter_mut().rev() {
            child.on_lifecycle(event, context);
        }
    }
}

impl<S, V: Clone> Clone for MoveSelector<S, V> {
    fn clone(&self) -> Self {
        match self {
            MoveSelector::Change(s) => MoveSelector::Change(s.clone()),
            MoveSelector::Swap(s) => MoveSelector::Swap(s.clone()),
            MoveSelector::Union(s) => MoveSelector::Union(s.clone()),
            MoveSelector::Cartesian(s) => MoveSelector::Cartesian(s.clone()),
            MoveSelector::Filtering(s) => MoveSelector::Filtering(s.clone()),
        }
    }
}

impl<S, V: Debug> Debug for MoveSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveSelector::Change(s) => s.fmt(f),
            MoveSelector::Swap(s) => s.fmt(f),
            MoveSelector::Union(s) => s.fmt(f),
            MoveSelector::Cartesian(s) => s.fmt(f),
            MoveSelector::Filtering(s) => s.fmt(f),
        }
    }
}

impl<S, V> From<ChangeMoveSelector<S, V>> for MoveSelector<S, V> {
    fn from(s: ChangeMoveSelector<S, V>) -> Self {
        MoveSelector::Change(s)
    }
}

impl<S, V> From<SwapMoveSelector<S, V>> for MoveSelector<S, V> {
    fn from(s: SwapMoveSelector<S, V>) -> Self {
        MoveSelector::Swap(s)
    }
}

impl<S, V> From<UnionMoveSelector<S, V>> for MoveSelector<S, V> {
    fn from(s: UnionMoveSelector<S, V>) -> Self {
        MoveSelector::Union(s)
    }
}

impl<S, V> From<CartesianMoveSelector<S, V>> for MoveSelector<S, V> {
    fn from(s: CartesianMoveSelector<S, V>) -> Self {
        MoveSelector::Cartesian(s)
    }
}

impl<S, V> From<FilteringMoveSelector<S, V>> for MoveSelector<S, V> {
    fn from(s: FilteringMoveSelector<S, V>) -> Self {
        MoveSelector::Filtering(s)
    }
}
