//! Core domain traits

use crate::score::Score;

/// The working solution of a planning problem.
///
/// A solution groups its contents into descriptor classes numbered from
/// zero. Planning entities and the problem facts constraints iterate over
/// are both addressed this way, by descriptor index and position.
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, SimpleScore};
///
/// #[derive(Clone)]
/// struct Schedule {
///     shifts: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for Schedule {
///     type Score = SimpleScore;
///
///     fn score(&self) -> Option<SimpleScore> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<SimpleScore>) {
///         self.score = score;
///     }
///
///     fn entity_count(&self, descriptor_index: usize) -> usize {
///         match descriptor_index {
///             0 => self.shifts.len(),
///             _ => 0,
///         }
///     }
/// }
///
/// let schedule = Schedule { shifts: vec![None, Some(2)], score: None };
/// assert_eq!(schedule.entity_count(0), 2);
/// assert!(!schedule.is_pinned(0, 1));
/// ```
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    type Score: Score;

    fn score(&self) -> Option<Self::Score>;

    fn set_score(&mut self, score: Option<Self::Score>);

    /// Number of entities or facts in the descriptor class.
    fn entity_count(&self, descriptor_index: usize) -> usize;

    /// Pinned entities are never changed by moves.
    fn is_pinned(&self, _descriptor_index: usize, _entity_index: usize) -> bool {
        false
    }

    /// Planning variables that still have no value.
    ///
    /// Between two solutions, the one with fewer unassigned variables ranks
    /// higher regardless of score.
    fn uninitialized_count(&self) -> usize {
        0
    }

    fn is_initialized(&self) -> bool {
        self.uninitialized_count() == 0
    }
}
