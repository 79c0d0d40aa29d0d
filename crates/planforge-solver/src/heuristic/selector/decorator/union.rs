//! Union move selector: several child selectors behind one stream.

use std::fmt::{self, Debug};

use rand::{Rng, RngCore};

use planforge_core::PlanningSolution;

use crate::heuristic::selector::{forward_lifecycle, MoveSelector, SelectionOrder};
use crate::event::{LifecycleContext, LifecycleEvent, LifecycleTracker};
use crate::heuristic::r#move::CandidateMove;
use crate::heuristic::variable::PlanningValue;

/// Relative weights of a random union's children.
pub enum UnionWeights<S> {
    Equal,
    Fixed(Vec<f64>),
    /// Evaluated at each step start with the child's index.
    PerStep(fn(&S, usize) -> f64),
}

impl<S> Clone for UnionWeights<S> {
    fn clone(&self) -> Self {
        match self {
            UnionWeights::Equal => UnionWeights::Equal,
            UnionWeights::Fixed(w) => UnionWeights::Fixed(w.clone()),
            UnionWeights::PerStep(f) => UnionWeights::PerStep(*f),
        }
    }
}

impl<S> Debug for UnionWeights<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnionWeights::Equal => f.write_str("Equal"),
            UnionWeights::Fixed(w) => f.debug_tuple("Fixed").field(w).finish(),
            UnionWeights::PerStep(_) => f.write_str("PerStep(..)"),
        }
    }
}

/// Concatenates or randomly interleaves its children.
///
/// Ending mode drains each child in turn. Random mode picks a child per
/// draw with probability proportional to its weight, then asks that child
/// for one move. A child that runs dry is dropped for the rest of the step,
/// and the union ends once every child is dry.
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, SimpleScore, ValueRange};
/// use planforge_solver::heuristic::{
///     ChangeMoveSelector, MoveSelector, PlanningVariable, SelectionOrder, UnionMoveSelector,
///     VariableDefinition,
/// };
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// #[derive(Clone, Debug)]
/// struct Plan { slot: Option<i64>, score: Option<SimpleScore> }
/// impl PlanningSolution for Plan {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<SimpleScore> { self.score }
///     fn set_score(&mut self, score: Option<SimpleScore>) { self.score = score; }
///     fn entity_count(&self, _: usize) -> usize { 1 }
/// }
/// fn get(p: &Plan, _: usize) -> Option<i64> { p.slot }
/// fn set(p: &mut Plan, _: usize, v: Option<i64>) { p.slot = v; }
///
/// let variable = PlanningVariable::new(0, "slot", get, set);
/// let low = VariableDefinition::new("Plan", variable, ValueRange::listed(vec![1, 2, 3]));
/// let high = VariableDefinition::new("Plan", variable, ValueRange::listed(vec![100, 200]));
///
/// let mut union = MoveSelector::from(UnionMoveSelector::new(
///     vec![
///         ChangeMoveSelector::new(&low, SelectionOrder::Original).into(),
///         ChangeMoveSelector::new(&high, SelectionOrder::Original).into(),
///     ],
///     SelectionOrder::Original,
/// ));
/// let plan = Plan { slot: None, score: None };
/// let mut random = ChaCha8Rng::seed_from_u64(0);
/// let mut count = 0;
/// while union.next(&plan, &mut random).is_some() {
///     count += 1;
/// }
/// assert_eq!(count, 5);
/// assert_eq!(union.size(&plan), Some(5));
/// assert!(!union.is_never_ending());
/// ```
pub struct UnionMoveSelector<S, V> {
    children: Vec<MoveSelector<S, V>>,
    random: bool,
    weights: UnionWeights<S>,
    step_weights: Vec<f64>,
    exhausted: Vec<bool>,
    cursor: usize,
}

impl<S: PlanningSolution, V: PlanningValue> UnionMoveSelector<S, V> {
    /// `Inherit` resolves to `Random`.
    pub fn new(children: Vec<MoveSelector<S, V>>, order: SelectionOrder) -> Self {
        let random = order.resolve(SelectionOrder::Inherit).is_random();
        let exhausted = vec![false; children.len()];
        Self {
            children,
            random,
            weights: UnionWeights::Equal,
            step_weights: Vec::new(),
            exhausted,
            cursor: 0,
        }
    }

    pub fn with_weights(mut self, weights: UnionWeights<S>) -> Self {
        self.weights = weights;
        self.step_weights.clear();
        self
    }

    pub fn children(&self) -> &[MoveSelector<S, V>] {
        &self.children
    }

    pub fn is_random(&self) -> bool {
        self.random
    }

    fn resolve_weights(&mut self, solution: &S) {
        let n = self.children.len();
        self.step_weights = match &self.weights {
            UnionWeights::Equal => vec![1.0; n],
            UnionWeights::Fixed(weights) => (0..n)
                .map(|i| weights.get(i).copied().unwrap_or(0.0))
                .collect(),
            UnionWeights::PerStep(weight) => (0..n).map(|i| weight(solution, i)).collect(),
        };
        for w in &mut self.step_weights {
            if !w.is_finite() || *w < 0.0 {
                *w = 0.0;
            }
        }
    }

    pub fn next(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        if self.random {
            self.next_random(solution, random)
        } else {
            self.next_ordered(solution, random)
        }
    }

    fn next_ordered(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        while self.cursor < self.children.len() {
            if let Some(m) = self.children[self.cursor].next(solution, random) {
                return Some(m);
            }
            self.cursor += 1;
        }
        None
    }

    fn next_random(&mut self, solution: &S, random: &mut dyn RngCore) -> Option<CandidateMove<S, V>> {
        if self.step_weights.len() != self.children.len() {
            self.resolve_weights(solution);
        }
        loop {
            let total: f64 = self
                .step_weights
                .iter()
                .zip(&self.exhausted)
                .filter(|(_, dry)| !**dry)
                .map(|(w, _)| *w)
                .sum();
            if total <= 0.0 {
                return None;
            }

            let offset = random.random::<f64>() * total;
            let mut chosen = None;
            let mut cumulative = 0.0;
            for (i, w) in self.step_weights.iter().enumerate() {
                if self.exhausted[i] || *w <= 0.0 {
                    continue;
                }
                chosen = Some(i);
                cumulative += w;
                if offset < cumulative {
                    break;
                }
            }
            let chosen = chosen?;

            match self.children[chosen].next(solution, random) {
                Some(m) => return Some(m),
                None => self.exhausted[chosen] = true,
            }
        }
    }

    pub fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.exhausted.iter_mut().for_each(|dry| *dry = false);
        self.cursor = 0;
    }

    /// Sum of the children's sizes, if all are countable.
    pub fn size(&self, solution: &S) -> Option<usize> {
        self.children.iter().map(|c| c.size(solution)).sum()
    }

    /// A random union is declared never-ending even over ending children.
    pub fn is_never_ending(&self) -> bool {
        self.random || self.children.iter().any(|c| c.is_never_ending())
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, context: &mut LifecycleContext<'_, S>) {
        forward_lifecycle(&mut self.children, event, context);
        if matches!(event, LifecycleEvent::PhaseStarted | LifecycleEvent::StepStarted) {
            self.exhausted.iter_mut().for_each(|dry| *dry = false);
            self.cursor = 0;
            if self.random {
                self.resolve_weights(context.solution);
            }
        }
    }

    pub(crate) fn collect_trackers<'a>(&'a self, out: &mut Vec<&'a LifecycleTracker>) {
        for child in &self.children {
            child.collect_trackers(out);
        }
    }
}

impl<S, V: Clone> Clone for UnionMoveSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            random: self.random,
            weights: self.weights.clone(),
            step_weights: self.step_weights.clone(),
            exhausted: self.exhausted.clone(),
            cursor: self.cursor,
        }
    }
}

impl<S, V: Debug> Debug for UnionMoveSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionMoveSelector")
            .field("children", &self.children)
            .field("random", &self.random)
            .field("weights", &self.weights)
            .finish()
    }
}
