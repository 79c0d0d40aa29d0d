//! Lifecycle events for solver participants and external listeners.
//!
//! A solve is a nesting of scopes: solving contains phases, a phase contains
//! steps. Every boundary is a [`LifecycleEvent`]. The phase driver walks the
//! participants it owns (selectors, acceptor, forager) and hands each one the
//! same [`LifecycleContext`], which carries the working solution, the shared
//! random source and the scores known at that point.
//!
//! Composites forward start events to their children in order and end events
//! in reverse order, so scopes close in the opposite order they opened.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use planforge_solver::event::{CountingEventListener, LifecycleEvent, SolverEventSupport};
//! use planforge_core::{PlanningSolution, SimpleScore};
//!
//! #[derive(Clone, Debug)]
//! struct Plan { score: Option<SimpleScore> }
//! impl PlanningSolution for Plan {
//!     type Score = SimpleScore;
//!     fn score(&self) -> Option<SimpleScore> { self.score }
//!     fn set_score(&mut self, score: Option<SimpleScore>) { self.score = score; }
//!     fn entity_count(&self, _: usize) -> usize { 0 }
//! }
//!
//! let listener = Arc::new(CountingEventListener::new());
//! let mut support = SolverEventSupport::<Plan>::new();
//! support.add_listener(listener.clone());
//! support.fire_best_solution_changed(&Plan { score: None }, &SimpleScore::of(-1));
//! assert_eq!(listener.best_solution_count(), 1);
//! assert_eq!(listener.count(LifecycleEvent::StepStarted), 0);
//! ```

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::RngCore;

use planforge_core::PlanningSolution;

/// A scope boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    SolvingStarted,
    PhaseStarted,
    StepStarted,
    StepEnded,
    PhaseEnded,
    SolvingEnded,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::SolvingStarted,
        LifecycleEvent::PhaseStarted,
        LifecycleEvent::StepStarted,
        LifecycleEvent::StepEnded,
        LifecycleEvent::PhaseEnded,
        LifecycleEvent::SolvingEnded,
    ];

    pub fn is_start(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::SolvingStarted
                | LifecycleEvent::PhaseStarted
                | LifecycleEvent::StepStarted
        )
    }

    /// Scope depth that must be open before this event fires.
    fn depth_before(&self) -> u8 {
        match self {
            LifecycleEvent::SolvingStarted => 0,
            LifecycleEvent::PhaseStarted | LifecycleEvent::SolvingEnded => 1,
            LifecycleEvent::StepStarted | LifecycleEvent::PhaseEnded => 2,
            LifecycleEvent::StepEnded => 3,
        }
    }

    fn ordinal(&self) -> usize {
        match self {
            LifecycleEvent::SolvingStarted => 0,
            LifecycleEvent::PhaseStarted => 1,
            LifecycleEvent::StepStarted => 2,
            LifecycleEvent::StepEnded => 3,
            LifecycleEvent::PhaseEnded => 4,
            LifecycleEvent::SolvingEnded => 5,
        }
    }
}

/// What a participant sees when a lifecycle event reaches it.
pub struct LifecycleContext<'a, S: PlanningSolution> {
    /// The working solution at the boundary.
    pub solution: &'a S,
    /// The solver's single random source.
    pub random: &'a mut dyn RngCore,
    pub best_score: Option<S::Score>,
    /// Score of the last completed step, or of the phase start.
    pub step_score: Option<S::Score>,
    pub phase_index: usize,
    pub step_index: u64,
}

impl<'a, S: PlanningSolution> LifecycleContext<'a, S> {
    pub fn new(solution: &'a S, random: &'a mut dyn RngCore) -> Self {
        LifecycleContext {
            solution,
            random,
            best_score: None,
            step_score: None,
            phase_index: 0,
            step_index: 0,
        }
    }
}

impl<S: PlanningSolution> Debug for LifecycleContext<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleContext")
            .field("best_score", &self.best_score)
            .field("step_score", &self.step_score)
            .field("phase_index", &self.phase_index)
            .field("step_index", &self.step_index)
            .finish()
    }
}

/// Counts lifecycle events and checks they nest properly.
///
/// Leaf selectors embed one so tests can verify every child of a composite
/// saw each scope open and close exactly as often as its parent.
#[derive(Debug, Clone, Default)]
pub struct LifecycleTracker {
    counts: [u64; 6],
    depth: u8,
    violations: u64,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: LifecycleEvent) {
        let expected = event.depth_before();
        if self.depth != expected {
            self.violations += 1;
        }
        self.depth = if event.is_start() {
            expected + 1
        } else {
            expected.saturating_sub(1)
        };
        self.counts[event.ordinal()] += 1;
    }

    pub fn count(&self, event: LifecycleEvent) -> u64 {
        self.counts[event.ordinal()]
    }

    /// Events that arrived in a scope where they could not occur.
    pub fn violations(&self) -> u64 {
        self.violations
    }

    /// True once every opened scope has closed without violations.
    pub fn is_balanced(&self) -> bool {
        self.violations == 0 && self.depth == 0
    }
}

/// Observer of a running solver.
pub trait SolverEventListener<S: PlanningSolution>: Send + Sync + Debug {
    /// Called each time the best solution improves.
    fn on_best_solution_changed(&self, solution: &S, score: &S::Score);

    fn on_lifecycle(&self, _event: LifecycleEvent, _context: &LifecycleContext<'_, S>) {}
}

/// Registry of external listeners.
pub struct SolverEventSupport<S: PlanningSolution> {
    listeners: Vec<Arc<dyn SolverEventListener<S>>>,
}

impl<S: PlanningSolution> SolverEventSupport<S> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SolverEventListener<S>>) {
        self.listeners.push(listener);
    }

    pub fn fire_best_solution_changed(&self, solution: &S, score: &S::Score) {
        for listener in &self.listeners {
            listener.on_best_solution_changed(solution, score);
        }
    }

    pub fn fire_lifecycle(&self, event: LifecycleEvent, context: &LifecycleContext<'_, S>) {
        for listener in &self.listeners {
            listener.on_lifecycle(event, context);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl<S: PlanningSolution> Default for SolverEventSupport<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> Clone for SolverEventSupport<S> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<S: PlanningSolution> Debug for SolverEventSupport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverEventSupport")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

/// Listener that only counts what it hears.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    best_solution_count: AtomicU64,
    lifecycle_counts: [AtomicU64; 6],
}

impl CountingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_solution_count(&self) -> u64 {
        self.best_solution_count.load(Ordering::SeqCst)
    }

    pub fn count(&self, event: LifecycleEvent) -> u64 {
        self.lifecycle_counts[event.ordinal()].load(Ordering::SeqCst)
    }
}

impl<S: PlanningSolution> SolverEventListener<S> for CountingEventListener {
    fn on_best_solution_changed(&self, _solution: &S, _score: &S::Score) {
        self.best_solution_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_lifecycle(&self, event: LifecycleEvent, _context: &LifecycleContext<'_, S>) {
        self.lifecycle_counts[event.ordinal()].fetch_add(1, Ordering::SeqCst);
    }
}
