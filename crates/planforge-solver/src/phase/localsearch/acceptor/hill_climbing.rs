//! Hill climbing acceptor.

use planforge_core::PlanningSolution;

use super::Acceptor;

/// Hill climbing acceptor - accepts moves that do not worsen the score.
///
/// Accepting equal scores lets the search drift across plateaus instead of
/// stopping at the first one.
///
/// # Example
///
/// ```
/// use planforge_solver::phase::localsearch::HillClimbingAcceptor;
///
/// let acceptor = HillClimbingAcceptor::new();
/// ```
#[derive(Debug, Clone, Default)]
pub struct HillClimbingAcceptor;

impl HillClimbingAcceptor {
    /// Creates a new hill climbing acceptor.
    pub fn new() -> Self {
        Self
    }
}

impl<S: PlanningSolution> Acceptor<S> for HillClimbingAcceptor {
    fn is_accepted(&mut self, last_step_score: &S::Score, move_score: &S::Score) -> bool {
        move_score >= last_step_score
    }
}
