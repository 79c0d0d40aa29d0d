//! Foragers for local search move selection
//!
//! Foragers collect accepted candidates during a step and select the one
//! to apply. They only see arena indices and scores; the phase owns the
//! moves themselves.

use std::fmt::Debug;

use rand::{Rng, RngCore};

use planforge_core::PlanningSolution;

use crate::event::{LifecycleContext, LifecycleEvent};

/// Trait for collecting and selecting moves in local search.
///
/// Foragers are responsible for:
/// - Collecting accepted candidates during evaluation
/// - Deciding when to quit evaluating early
/// - Selecting the winning candidate
pub trait Forager<S: PlanningSolution>: Send + Debug {
    /// Records an accepted candidate by its arena index.
    fn add_accepted(&mut self, index: usize, score: S::Score);

    /// True once enough candidates were collected for this step.
    fn is_quit_early(&self) -> bool;

    /// True if this forager ever quits early on its own.
    fn can_quit_early(&self) -> bool;

    /// Picks the winner among the accepted candidates, if any.
    fn pick(&mut self, random: &mut dyn RngCore) -> Option<(usize, S::Score)>;

    /// Clears collected candidates at each step start.
    fn on_lifecycle(&mut self, event: LifecycleEvent, _context: &LifecycleContext<'_, S>) {
        if event == LifecycleEvent::StepStarted {
            self.clear();
        }
    }

    fn clear(&mut self);
}

/// Takes the first accepted candidate and stops evaluating.
pub struct FirstAcceptedForager<S: PlanningSolution> {
    accepted: Option<(usize, S::Score)>,
}

impl<S: PlanningSolution> FirstAcceptedForager<S> {
    pub fn new() -> Self {
        Self { accepted: None }
    }
}

impl<S: PlanningSolution> Default for FirstAcceptedForager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> Debug for FirstAcceptedForager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirstAcceptedForager")
            .field("accepted", &self.accepted.is_some())
            .finish()
    }
}

impl<S: PlanningSolution> Forager<S> for FirstAcceptedForager<S> {
    fn add_accepted(&mut self, index: usize, score: S::Score) {
        if self.accepted.is_none() {
            self.accepted = Some((index, score));
        }
    }

    fn is_quit_early(&self) -> bool {
        self.accepted.is_some()
    }

    fn can_quit_early(&self) -> bool {
        true
    }

    fn pick(&mut self, _random: &mut dyn RngCore) -> Option<(usize, S::Score)> {
        self.accepted.take()
    }

    fn clear(&mut self) {
        self.accepted = None;
    }
}

/// Picks the best-scoring accepted candidate.
///
/// With an accepted count limit the step stops after that many accepted
/// candidates; without one the whole selector is evaluated. Ties go to the
/// candidate accepted first.
pub struct BestScoreForager<S: PlanningSolution> {
    accepted_count_limit: Option<usize>,
    accepted_count: usize,
    best: Option<(usize, S::Score)>,
}

impl<S: PlanningSolution> BestScoreForager<S> {
    pub fn new(accepted_count_limit: Option<usize>) -> Self {
        Self {
            accepted_count_limit,
            accepted_count: 0,
            best: None,
        }
    }
}

impl<S: PlanningSolution> Debug for BestScoreForager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BestScoreForager")
            .field("accepted_count_limit", &self.accepted_count_limit)
            .field("accepted_count", &self.accepted_count)
            .finish()
    }
}

impl<S: PlanningSolution> Forager<S> for BestScoreForager<S> {
    fn add_accepted(&mut self, index: usize, score: S::Score) {
        self.accepted_count += 1;
        let better = match &self.best {
            None => true,
            Some((_, best)) => score > *best,
        };
        if better {
            self.best = Some((index, score));
        }
    }

    fn is_quit_early(&self) -> bool {
        self.accepted_count_limit
            .is_some_and(|limit| self.accepted_count >= limit)
    }

    fn can_quit_early(&self) -> bool {
        self.accepted_count_limit.is_some()
    }

    fn pick(&mut self, _random: &mut dyn RngCore) -> Option<(usize, S::Score)> {
        self.best.take()
    }

    fn clear(&mut self) {
        self.accepted_count = 0;
        self.best = None;
    }
}

/// Picks uniformly among accepted candidates using the solver's random.
pub struct ProbabilisticForager<S: PlanningSolution> {
    accepted_count_limit: Option<usize>,
    accepted: Vec<(usize, S::Score)>,
}

impl<S: PlanningSolution> ProbabilisticForager<S> {
    pub fn new(accepted_count_limit: Option<usize>) -> Self {
        Self {
            accepted_count_limit,
            accepted: Vec::new(),
        }
    }
}

impl<S: PlanningSolution> Debug for ProbabilisticForager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbabilisticForager")
            .field("accepted_count_limit", &self.accepted_count_limit)
            .field("accepted_count", &self.accepted.len())
            .finish()
    }
}

impl<S: PlanningSolution> Forager<S> for ProbabilisticForager<S> {
    fn add_accepted(&mut self, index: usize, score: S::Score) {
        self.accepted.push((index, score));
    }

    fn is_quit_early(&self) -> bool {
        self.accepted_count_limit
            .is_some_and(|limit| self.accepted.len() >= limit)
    }

    fn can_quit_early(&self) -> bool {
        self.accepted_count_limit.is_some()
    }

    fn pick(&mut self, random: &mut dyn RngCore) -> Option<(usize, S::Score)> {
        if self.accepted.is_empty() {
            return None;
        }
        let pick = random.random_range(0..self.accepted.len());
        let winner = self.accepted.swap_remove(pick);
        self.accepted.clear();
        Some(winner)
    }

    fn clear(&mut self) {
        self.accepted.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use planforge_core::SimpleScore;
    use planforge_test::task::TaskSolution;

    use super::*;

    fn feed(forager: &mut dyn Forager<TaskSolution>, scores: &[i64]) {
        for (i, &s) in scores.iter().enumerate() {
            forager.add_accepted(i, SimpleScore::of(s));
            if forager.is_quit_early() {
                break;
            }
        }
    }

    #[test]
    fn test_first_accepted_quits_after_one() {
        let mut forager = FirstAcceptedForager::<TaskSolution>::new();
        feed(&mut forager, &[-3, 0, -1]);
        assert!(forager.is_quit_early());
        let mut random = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(forager.pick(&mut random), Some((0, SimpleScore::of(-3))));
        assert_eq!(forager.pick(&mut random), None);
    }

    #[test]
    fn test_best_score_without_limit_sees_everything() {
        let mut forager = BestScoreForager::<TaskSolution>::new(None);
        feed(&mut forager, &[-3, 0, -1, 0]);
        assert!(!forager.can_quit_early());
        let mut random = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(forager.pick(&mut random), Some((1, SimpleScore::of(0))));
    }

    #[test]
    fn test_best_score_respects_accepted_count_limit() {
        let mut forager = BestScoreForager::<TaskSolution>::new(Some(2));
        feed(&mut forager, &[-3, -2, 5]);
        let mut random = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(forager.pick(&mut random), Some((1, SimpleScore::of(-2))));
    }

    #[test]
    fn test_probabilistic_picks_an_accepted_candidate() {
        let mut forager = ProbabilisticForager::<TaskSolution>::new(None);
        feed(&mut forager, &[-3, -2, -1]);
        let mut random = ChaCha8Rng::seed_from_u64(9);
        let (index, score) = forager.pick(&mut random).unwrap();
        assert!(index < 3);
        assert_eq!(score, SimpleScore::of(index as i64 - 3));
    }

    #[test]
    fn test_step_start_clears_collected_candidates() {
        let mut forager = BestScoreForager::<TaskSolution>::new(None);
        feed(&mut forager, &[-1]);
        let solution = TaskSolution::empty(1);
        let mut random = ChaCha8Rng::seed_from_u64(0);
        let context = LifecycleContext::new(&solution, &mut random);
        forager.on_lifecycle(LifecycleEvent::StepStarted, &context);
        drop(context);
        assert_eq!(forager.pick(&mut random), None);
    }
}
