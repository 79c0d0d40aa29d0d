//! Simple score director with full recalculation.

use planforge_core::PlanningSolution;

use super::traits::ScoreDirector;

/// A score director that recalculates the full score on every request.
///
/// Correct but slow; meant for tests and for checking other directors.
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, SimpleScore};
/// use planforge_scoring::{ScoreDirector, SimpleScoreDirector};
///
/// #[derive(Clone)]
/// struct Sum { values: Vec<i64> }
///
/// impl PlanningSolution for Sum {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<SimpleScore> { None }
///     fn set_score(&mut self, _: Option<SimpleScore>) {}
///     fn entity_count(&self, _: usize) -> usize { self.values.len() }
/// }
///
/// let mut director = SimpleScoreDirector::new(Sum { values: vec![1, -4] }, |s: &Sum| {
///     SimpleScore::of(s.values.iter().sum())
/// });
/// assert_eq!(director.calculate_score(), SimpleScore::of(-3));
/// ```
#[derive(Clone)]
pub struct SimpleScoreDirector<S: PlanningSolution, C> {
    working_solution: S,
    score_calculator: C,
    cached_score: Option<S::Score>,
    calculation_count: u64,
}

impl<S, C> SimpleScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync,
{
    pub fn new(solution: S, score_calculator: C) -> Self {
        SimpleScoreDirector {
            working_solution: solution,
            score_calculator,
            cached_score: None,
            calculation_count: 0,
        }
    }

    pub fn into_working_solution(self) -> S {
        self.working_solution
    }
}

impl<S, C> ScoreDirector<S> for SimpleScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync,
{
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.cached_score = None;
        &mut self.working_solution
    }

    fn reset_working_solution(&mut self, solution: S) {
        self.working_solution = solution;
        self.cached_score = None;
    }

    fn calculate_score(&mut self) -> S::Score {
        if let Some(score) = self.cached_score {
            return score;
        }
        let score = (self.score_calculator)(&self.working_solution);
        self.working_solution.set_score(Some(score));
        self.cached_score = Some(score);
        self.calculation_count += 1;
        score
    }

    fn calculate_full_score(&self) -> S::Score {
        (self.score_calculator)(&self.working_solution)
    }

    fn before_variable_changed(&mut self, _descriptor_index: usize, _entity_index: usize, _variable_name: &str) {
        self.cached_score = None;
    }

    fn after_variable_changed(&mut self, _descriptor_index: usize, _entity_index: usize, _variable_name: &str) {
        self.cached_score = None;
    }

    fn after_entity_added(&mut self, _descriptor_index: usize, _entity_index: usize) {
        self.cached_score = None;
    }

    fn before_entity_removed(&mut self, _descriptor_index: usize, _entity_index: usize) {
        self.cached_score = None;
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }
}
