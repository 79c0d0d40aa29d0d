//! Incremental score director backed by a constraint network.

use std::fmt;
use std::sync::Arc;

use planforge_core::{EntityRef, PlanningSolution};
use tracing::{debug, trace};

use super::traits::ScoreDirector;
use crate::network::{ConstraintMatchTotal, ConstraintNetwork, NetworkSession};

/// Score director that propagates each reported change through a
/// [`NetworkSession`].
///
/// Variable changes are queued as fact updates and settled on the next
/// [`calculate_score`](ScoreDirector::calculate_score). Resetting the
/// working solution discards the session and rebuilds it from scratch.
#[derive(Clone)]
pub struct NetworkScoreDirector<S: PlanningSolution> {
    working_solution: S,
    session: NetworkSession<S>,
    open_changes: usize,
    calculation_count: u64,
}

impl<S: PlanningSolution> NetworkScoreDirector<S> {
    pub fn new(solution: S, network: Arc<ConstraintNetwork<S>>) -> Self {
        let mut session = NetworkSession::new(network);
        session.insert_all(&solution);
        NetworkScoreDirector {
            working_solution: solution,
            session,
            open_changes: 0,
            calculation_count: 0,
        }
    }

    pub fn network(&self) -> &Arc<ConstraintNetwork<S>> {
        self.session.network()
    }

    /// Score and match count per constraint, after settling.
    pub fn constraint_match_totals(&mut self) -> Vec<ConstraintMatchTotal<S::Score>> {
        self.session.constraint_match_totals(&self.working_solution)
    }

    /// Consumes the director and returns the working solution.
    pub fn into_working_solution(self) -> S {
        self.working_solution
    }
}

impl<S: PlanningSolution> ScoreDirector<S> for NetworkScoreDirector<S> {
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.working_solution
    }

    fn reset_working_solution(&mut self, solution: S) {
        let network = Arc::clone(self.session.network());
        let mut session = NetworkSession::new(network);
        session.insert_all(&solution);
        self.session = session;
        self.working_solution = solution;
        self.open_changes = 0;
        debug!(event = "working_solution_reset");
    }

    fn calculate_score(&mut self) -> S::Score {
        if self.open_changes != 0 {
            debug!(
                event = "unbalanced_variable_change",
                open_changes = self.open_changes
            );
        }
        let score = self.session.score(&self.working_solution);
        self.working_solution.set_score(Some(score));
        self.calculation_count += 1;
        score
    }

    fn calculate_full_score(&self) -> S::Score {
        NetworkSession::full_score(self.session.network(), &self.working_solution)
    }

    fn before_variable_changed(&mut self, descriptor_index: usize, entity_index: usize, variable_name: &str) {
        trace!(event = "before_variable_changed", descriptor_index, entity_index, variable_name);
        self.open_changes += 1;
    }

    fn after_variable_changed(&mut self, descriptor_index: usize, entity_index: usize, _variable_name: &str) {
        self.open_changes = self.open_changes.saturating_sub(1);
        self.session.update(EntityRef::new(descriptor_index, entity_index));
    }

    fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        self.session.insert(EntityRef::new(descriptor_index, entity_index));
    }

    fn before_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.session.retract(EntityRef::new(descriptor_index, entity_index));
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn is_incremental(&self) -> bool {
        true
    }
}

impl<S: PlanningSolution + fmt::Debug> fmt::Debug for NetworkScoreDirector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkScoreDirector")
            .field("working_solution", &self.working_solution)
            .field("settled", &self.session.is_settled())
            .field("calculation_count", &self.calculation_count)
            .finish()
    }
}
